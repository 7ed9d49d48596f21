// Capture collaborators
//
// The capture loader, the memory model and the per-API state schema live
// outside this crate. These traits are the only surface the state tree
// needs from them; both are suspension points.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use statetree_types::{ApiId, CaptureId, MemoryLayout, MemoryPointer, StateValue};

/// Loads typed values out of capture memory
#[async_trait]
pub trait MemoryReader: Send + Sync {
    /// Decode the value `pointer` refers to using `layout`
    async fn load(&self, pointer: &MemoryPointer, layout: &MemoryLayout) -> anyhow::Result<StateValue>;
}

/// The global state of a capture after some command
pub struct GlobalState {
    /// Per-API state objects
    pub apis: HashMap<ApiId, Arc<StateValue>>,
    /// Layout of the traced device
    pub layout: MemoryLayout,
    /// Backing memory for pointer and slice loads
    pub memory: Arc<dyn MemoryReader>,
}

impl GlobalState {
    pub fn new(layout: MemoryLayout, memory: Arc<dyn MemoryReader>) -> Self {
        Self {
            apis: HashMap::new(),
            layout,
            memory,
        }
    }

    pub fn with_api(mut self, api: ApiId, state: StateValue) -> Self {
        self.apis.insert(api, Arc::new(state));
        self
    }

    pub fn api_state(&self, api: ApiId) -> Option<&Arc<StateValue>> {
        self.apis.get(&api)
    }
}

impl std::fmt::Debug for GlobalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalState")
            .field("apis", &self.apis.keys().collect::<Vec<_>>())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Resolves capture coordinates to state
#[async_trait]
pub trait CaptureStore: Send + Sync {
    /// Number of top level commands in the capture
    async fn command_count(&self, capture: CaptureId) -> anyhow::Result<u64>;

    /// API that issued the given command
    async fn command_api(&self, capture: CaptureId, command: u64) -> anyhow::Result<ApiId>;

    /// Global state immediately after the given command
    async fn global_state(&self, capture: CaptureId, after: u64) -> anyhow::Result<Arc<GlobalState>>;
}

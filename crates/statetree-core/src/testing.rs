//! In-memory collaborators
//!
//! A capture store and memory reader backed by plain maps, for tests and for
//! hosts that build snapshots without a capture loader.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use statetree_types::{ApiId, CaptureId, MemoryLayout, MemoryPointer, PoolId, StateValue};

use crate::capture::{CaptureStore, GlobalState, MemoryReader};

/// Memory reader holding pre-decoded values by pool and address
#[derive(Debug, Default)]
pub struct InMemoryMemory {
    values: HashMap<(PoolId, u64), StateValue>,
    loads: AtomicUsize,
}

impl InMemoryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, pool: PoolId, address: u64, value: StateValue) -> Self {
        self.values.insert((pool, address), value);
        self
    }

    /// Number of loads served or attempted
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MemoryReader for InMemoryMemory {
    async fn load(&self, pointer: &MemoryPointer, _layout: &MemoryLayout) -> anyhow::Result<StateValue> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.values
            .get(&(pointer.pool, pointer.address))
            .cloned()
            .ok_or_else(|| anyhow!("No {} at 0x{:x} in pool {}", pointer.element.name(), pointer.address, pointer.pool))
    }
}

/// Capture store for a single capture
pub struct InMemoryCapture {
    capture: CaptureId,
    commands: Vec<ApiId>,
    states: HashMap<u64, Arc<GlobalState>>,
    state_loads: AtomicUsize,
    delay: Option<Duration>,
}

impl InMemoryCapture {
    pub fn new(capture: CaptureId) -> Self {
        Self {
            capture,
            commands: Vec::new(),
            states: HashMap::new(),
            state_loads: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Append a command issued by `api`
    pub fn command(mut self, api: ApiId) -> Self {
        self.commands.push(api);
        self
    }

    /// Record the global state after `command`
    pub fn state_after(mut self, command: u64, state: GlobalState) -> Self {
        self.states.insert(command, Arc::new(state));
        self
    }

    /// Make every global state load take at least `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of global state loads started
    pub fn state_loads(&self) -> usize {
        self.state_loads.load(Ordering::SeqCst)
    }

    fn check_capture(&self, capture: CaptureId) -> anyhow::Result<()> {
        if capture != self.capture {
            return Err(anyhow!("Capture not found: {}", capture));
        }
        Ok(())
    }
}

#[async_trait]
impl CaptureStore for InMemoryCapture {
    async fn command_count(&self, capture: CaptureId) -> anyhow::Result<u64> {
        self.check_capture(capture)?;
        Ok(self.commands.len() as u64)
    }

    async fn command_api(&self, capture: CaptureId, command: u64) -> anyhow::Result<ApiId> {
        self.check_capture(capture)?;
        usize::try_from(command)
            .ok()
            .and_then(|i| self.commands.get(i))
            .copied()
            .ok_or_else(|| anyhow!("Command {} not in {}", command, capture))
    }

    async fn global_state(&self, capture: CaptureId, after: u64) -> anyhow::Result<Arc<GlobalState>> {
        self.check_capture(capture)?;
        self.state_loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.states
            .get(&after)
            .cloned()
            .ok_or_else(|| anyhow!("No state recorded after command {} of {}", after, capture))
    }
}

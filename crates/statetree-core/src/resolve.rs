// Root context construction
//
// A root context binds one capture coordinate and one group limit to the
// API state object the navigator starts from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use statetree_error::{StateTreeError, StateTreeResult};
use statetree_types::{ApiId, CommandCoordinate, ContentId, MemoryLayout, StateValue};

use crate::capture::{CaptureStore, GlobalState, MemoryReader};

/// Content identity of a state tree: where in the capture, and how to group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateTreeKey {
    pub after: CommandCoordinate,
    pub group_limit: u64,
}

impl StateTreeKey {
    pub fn new(after: CommandCoordinate, group_limit: u64) -> Self {
        Self { after, group_limit }
    }

    /// Content id used as the cache key and the client handle
    pub fn id(&self) -> StateTreeResult<ContentId> {
        Ok(ContentId::of(self)?)
    }

    /// Reject coordinates the resolver cannot serve
    pub fn validate(&self) -> StateTreeResult<()> {
        if self.after.has_sub_commands() {
            return Err(StateTreeError::unsupported("sub-command state trees"));
        }
        if self.after.command().is_none() {
            return Err(StateTreeError::unsupported("coordinate without a command index"));
        }
        Ok(())
    }
}

/// Immutable starting point for navigation
#[derive(Debug)]
pub struct RootContext {
    state: Arc<GlobalState>,
    api_state: Arc<StateValue>,
    after: CommandCoordinate,
    api: ApiId,
    group_limit: u64,
}

impl RootContext {
    /// Build the root context for `key` from the capture store
    pub async fn resolve(store: &dyn CaptureStore, key: &StateTreeKey) -> StateTreeResult<Self> {
        key.validate()?;
        let capture = key.after.capture;
        let command = key
            .after
            .command()
            .ok_or_else(|| StateTreeError::unsupported("coordinate without a command index"))?;

        let count = store.command_count(capture).await?;
        if command >= count {
            return Err(StateTreeError::CommandOutOfRange { index: command, count });
        }

        let state = store.global_state(capture, command).await?;
        let api = store.command_api(capture, command).await?;
        let api_state = state
            .api_state(api)
            .cloned()
            .ok_or(StateTreeError::ApiStateMissing { api })?;

        debug!(after = %key.after, %api, group_limit = key.group_limit, "resolved state tree root");
        Ok(Self {
            state,
            api_state,
            after: key.after.clone(),
            api,
            group_limit: key.group_limit,
        })
    }

    /// The API state object at the root of the tree
    pub fn api_state(&self) -> &StateValue {
        &self.api_state
    }

    pub fn after(&self) -> &CommandCoordinate {
        &self.after
    }

    pub fn api(&self) -> ApiId {
        self.api
    }

    pub fn group_limit(&self) -> u64 {
        self.group_limit
    }

    pub fn layout(&self) -> &MemoryLayout {
        &self.state.layout
    }

    pub fn memory(&self) -> &dyn MemoryReader {
        self.state.memory.as_ref()
    }
}

// State tree service
//
// Entry point for clients: issue a handle for a (coordinate, group limit)
// pair, then resolve node paths under that handle. Root contexts are built
// on the first node query and shared through the resolution cache.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info_span, Instrument};

use statetree_error::{StateTreeError, StateTreeResult};
use statetree_types::{CommandCoordinate, ContentId, NodeDescription, NodePath};

use crate::cache::ResolutionCache;
use crate::capture::CaptureStore;
use crate::config::StateTreeConfig;
use crate::navigator::Navigator;
use crate::preview::PreviewGenerator;
use crate::resolve::{RootContext, StateTreeKey};

/// Handle to a registered state tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateTreeHandle {
    pub id: ContentId,
}

impl StateTreeHandle {
    /// Path of the tree's root node
    pub fn root(&self) -> NodePath {
        NodePath::root(self.id)
    }
}

/// Resolves state trees and their nodes against a capture store
pub struct StateTreeService {
    store: Arc<dyn CaptureStore>,
    config: StateTreeConfig,
    /// Every key issued as a handle. Handles stay resolvable for the life of
    /// the service, so entries are never removed.
    keys: RwLock<HashMap<ContentId, StateTreeKey>>,
    roots: ResolutionCache<RootContext>,
}

impl StateTreeService {
    pub fn new(store: Arc<dyn CaptureStore>) -> Self {
        Self::with_config(store, StateTreeConfig::default())
    }

    pub fn with_config(store: Arc<dyn CaptureStore>, config: StateTreeConfig) -> Self {
        Self {
            store,
            config,
            keys: RwLock::new(HashMap::new()),
            roots: ResolutionCache::new(),
        }
    }

    pub fn config(&self) -> &StateTreeConfig {
        &self.config
    }

    /// Register the state tree for the state after `after`, grouped by `group_limit`.
    ///
    /// Identical requests return the same handle.
    pub fn state_tree(&self, after: CommandCoordinate, group_limit: u64) -> StateTreeResult<StateTreeHandle> {
        let key = StateTreeKey::new(after, group_limit);
        key.validate()?;
        let id = key.id()?;
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        keys.entry(id).or_insert(key);
        Ok(StateTreeHandle { id })
    }

    /// The root context for a handle, constructing it on first use
    pub async fn root_context(&self, id: ContentId) -> StateTreeResult<Arc<RootContext>> {
        let key = {
            let keys = self.keys.read().unwrap_or_else(PoisonError::into_inner);
            keys.get(&id).cloned().ok_or(StateTreeError::UnknownTree(id))?
        };
        let store = Arc::clone(&self.store);
        self.roots
            .get_or_try_init(id, || {
                async move { RootContext::resolve(store.as_ref(), &key).await }
                    .instrument(info_span!("resolve_state_tree", tree = %id))
            })
            .await
    }

    /// Resolve a node path to its description
    pub async fn state_tree_node(&self, path: &NodePath) -> StateTreeResult<NodeDescription> {
        let root = self.root_context(path.tree).await?;
        let navigator = Navigator::new(&root)
            .with_previews(PreviewGenerator::new(self.config.preview))
            .with_max_indirection_depth(self.config.navigation.max_indirection_depth);
        let node = navigator.resolve(path).await?;
        debug!(path = %path, name = %node.name, num_children = node.num_children, "resolved state tree node");
        Ok(node)
    }

    /// Number of root contexts constructed so far
    pub fn cached_roots(&self) -> usize {
        self.roots.len()
    }
}

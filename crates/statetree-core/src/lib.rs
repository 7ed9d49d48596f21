// State tree resolution
//
// Turns a capture coordinate into a navigable tree of state. A client asks
// for a state tree handle, then resolves node paths under it; each node
// reports its child count, display name, canonical value path, a bounded
// preview and an optional constant set tag.

pub mod cache;
pub mod capture;
pub mod config;
pub mod grouping;
pub mod logging;
pub mod navigator;
pub mod preview;
pub mod resolve;
pub mod service;
pub mod testing;

pub use cache::ResolutionCache;
pub use capture::{CaptureStore, GlobalState, MemoryReader};
pub use config::{LoggingConfig, NavigationConfig, StateTreeConfig};
pub use navigator::{Navigator, DEFAULT_MAX_INDIRECTION_DEPTH};
pub use preview::{Preview, PreviewGenerator, PreviewLimits};
pub use resolve::{RootContext, StateTreeKey};
pub use service::{StateTreeHandle, StateTreeService};

pub use statetree_error::{StateTreeError, StateTreeResult};
pub use statetree_types as types;

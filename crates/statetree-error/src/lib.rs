// State tree error handling
// Central location for the resolution error taxonomy and its reporting form

use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;

use statetree_types::{ApiId, ContentId, NodePath, StructuralKind};

// Re-export common error handling tools for convenience
pub use anyhow;

mod message;
mod traits;

pub use message::ErrorMessage;
pub use traits::TreeError;

/// Error codes reported alongside messages
pub mod codes {
    use crate::ErrorCode;

    // Navigation errors start with 1000
    pub const INDEX_OUT_OF_BOUNDS: ErrorCode = ErrorCode(1001);
    pub const NON_INDEXABLE: ErrorCode = ErrorCode(1002);
    pub const INDIRECTION_LIMIT: ErrorCode = ErrorCode(1003);

    // Resolution errors start with 2000
    pub const UNSUPPORTED: ErrorCode = ErrorCode(2001);
    pub const UNKNOWN_TREE: ErrorCode = ErrorCode(2002);
    pub const API_STATE_MISSING: ErrorCode = ErrorCode(2003);
    pub const COMMAND_OUT_OF_RANGE: ErrorCode = ErrorCode(2004);
    pub const KEY_ENCODING: ErrorCode = ErrorCode(2005);

    // Everything else
    pub const CONFIG: ErrorCode = ErrorCode(3001);
    pub const UPSTREAM: ErrorCode = ErrorCode(4001);
}

/// Numeric error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ErrorCode(pub u32);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Errors produced while resolving state trees and their nodes
#[derive(Error, Debug)]
pub enum StateTreeError {
    /// An index step was past the end of the node's children
    #[error("Index {index} out of bounds {} at {at}", bounds_text(.num_children))]
    IndexOutOfBounds {
        index: u64,
        num_children: u64,
        /// Navigation path up to and including the failing index
        at: NodePath,
    },

    /// An index step was applied to a value with no children
    #[error("Cannot index {type_name} ({kind})")]
    NonIndexable {
        kind: StructuralKind,
        type_name: String,
    },

    /// An indirection chain was longer than the configured cap
    #[error("Indirection chain exceeded {depth} levels")]
    IndirectionLimit { depth: usize },

    /// A permanently unimplemented request shape
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A node query named a state tree this service never issued
    #[error("Unknown state tree: {0}")]
    UnknownTree(ContentId),

    /// The global state has no entry for the API that issued the command
    #[error("No state for {api}")]
    ApiStateMissing { api: ApiId },

    /// The command index is past the end of the capture
    #[error("Command {index} out of range, capture has {count} commands")]
    CommandOutOfRange { index: u64, count: u64 },

    /// A state tree key could not be encoded for hashing
    #[error("Key encoding error: {0}")]
    KeyEncoding(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by the capture store or memory reader
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

fn bounds_text(num_children: &u64) -> String {
    match num_children.checked_sub(1) {
        Some(last) => format!("[0, {}]", last),
        None => "(node has no children)".to_string(),
    }
}

impl StateTreeError {
    /// Create an out of bounds error for the step at `at`
    pub fn index_out_of_bounds(index: u64, num_children: u64, at: NodePath) -> Self {
        StateTreeError::IndexOutOfBounds {
            index,
            num_children,
            at,
        }
    }

    /// Create an unsupported error
    pub fn unsupported(what: impl Into<String>) -> Self {
        StateTreeError::Unsupported(what.into())
    }

    /// The valid index range for an out of bounds error
    ///
    /// `None` for other errors and for nodes without children.
    pub fn valid_range(&self) -> Option<RangeInclusive<u64>> {
        match self {
            StateTreeError::IndexOutOfBounds { num_children, .. } => {
                num_children.checked_sub(1).map(|last| 0..=last)
            }
            _ => None,
        }
    }
}

/// Convenient Result type for state tree operations
pub type StateTreeResult<T> = Result<T, StateTreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ContentId {
        ContentId::from_bytes(b"tree")
    }

    #[test]
    fn test_out_of_bounds_reports_range_and_path() {
        let at = NodePath::new(tree(), vec![0, 5]);
        let err = StateTreeError::index_out_of_bounds(5, 3, at.clone());
        assert_eq!(err.valid_range(), Some(0..=2));
        let text = err.to_string();
        assert!(text.starts_with("Index 5 out of bounds [0, 2] at "), "{}", text);
        assert!(text.ends_with("/0.5"), "{}", text);
    }

    #[test]
    fn test_out_of_bounds_on_leaf() {
        let err = StateTreeError::index_out_of_bounds(0, 0, NodePath::new(tree(), vec![0]));
        assert_eq!(err.valid_range(), None);
        assert!(err.to_string().contains("no children"));
    }

    #[test]
    fn test_upstream_is_transparent() {
        let err: StateTreeError = anyhow::anyhow!("memory pool 3 not found").into();
        assert_eq!(err.to_string(), "memory pool 3 not found");
    }

    #[test]
    fn test_non_indexable_message() {
        let err = StateTreeError::NonIndexable {
            kind: StructuralKind::Scalar,
            type_name: "uint".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot index uint (scalar)");
        assert_eq!(err.valid_range(), None);
    }
}

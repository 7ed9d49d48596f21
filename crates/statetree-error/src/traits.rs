// Error reporting traits

use crate::{codes, ErrorCode, StateTreeError};

/// Base trait for errors reported to state tree clients
pub trait TreeError: std::error::Error + Send + Sync + 'static {
    /// Numeric code for this error
    fn code(&self) -> ErrorCode;

    /// Stable string code for this error
    fn error_code(&self) -> &'static str;

    /// Structured fields for the client (optional)
    fn details(&self) -> Option<serde_json::Value> {
        None
    }

    /// Indicates if retrying the same request might succeed (optional)
    fn is_transient(&self) -> bool {
        false
    }
}

impl TreeError for StateTreeError {
    fn code(&self) -> ErrorCode {
        match self {
            StateTreeError::IndexOutOfBounds { .. } => codes::INDEX_OUT_OF_BOUNDS,
            StateTreeError::NonIndexable { .. } => codes::NON_INDEXABLE,
            StateTreeError::IndirectionLimit { .. } => codes::INDIRECTION_LIMIT,
            StateTreeError::Unsupported(_) => codes::UNSUPPORTED,
            StateTreeError::UnknownTree(_) => codes::UNKNOWN_TREE,
            StateTreeError::ApiStateMissing { .. } => codes::API_STATE_MISSING,
            StateTreeError::CommandOutOfRange { .. } => codes::COMMAND_OUT_OF_RANGE,
            StateTreeError::KeyEncoding(_) => codes::KEY_ENCODING,
            StateTreeError::Config(_) => codes::CONFIG,
            StateTreeError::Upstream(_) => codes::UPSTREAM,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StateTreeError::IndexOutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
            StateTreeError::NonIndexable { .. } => "NON_INDEXABLE",
            StateTreeError::IndirectionLimit { .. } => "INDIRECTION_LIMIT",
            StateTreeError::Unsupported(_) => "UNSUPPORTED",
            StateTreeError::UnknownTree(_) => "UNKNOWN_TREE",
            StateTreeError::ApiStateMissing { .. } => "API_STATE_MISSING",
            StateTreeError::CommandOutOfRange { .. } => "COMMAND_OUT_OF_RANGE",
            StateTreeError::KeyEncoding(_) => "KEY_ENCODING",
            StateTreeError::Config(_) => "CONFIG",
            StateTreeError::Upstream(_) => "UPSTREAM",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            StateTreeError::IndexOutOfBounds {
                index,
                num_children,
                at,
            } => Some(serde_json::json!({
                "index": index,
                "first": 0,
                "last": num_children.checked_sub(1),
                "at": at,
            })),
            StateTreeError::NonIndexable { kind, type_name } => Some(serde_json::json!({
                "kind": kind,
                "type": type_name,
            })),
            StateTreeError::CommandOutOfRange { index, count } => Some(serde_json::json!({
                "index": index,
                "count": count,
            })),
            _ => None,
        }
    }
}

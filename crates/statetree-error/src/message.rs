use serde::{Deserialize, Serialize};

use crate::{ErrorCode, TreeError};

/// Standard error message format for serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorMessage {
    pub fn from_error<E: TreeError + ?Sized>(err: &E) -> Self {
        Self {
            code: err.code(),
            kind: err.error_code().to_string(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{codes, StateTreeError};
    use statetree_types::{ContentId, NodePath};

    #[test]
    fn test_out_of_bounds_message_carries_details() {
        let at = NodePath::new(ContentId::from_bytes(b"t"), vec![1, 5]);
        let err = StateTreeError::index_out_of_bounds(5, 3, at);
        let msg = ErrorMessage::from_error(&err);

        assert_eq!(msg.code, codes::INDEX_OUT_OF_BOUNDS);
        assert_eq!(msg.kind, "INDEX_OUT_OF_BOUNDS");
        let details = msg.details.unwrap();
        assert_eq!(details["index"], 5);
        assert_eq!(details["last"], 2);
        assert_eq!(details["at"]["indices"], serde_json::json!([1, 5]));
    }

    #[test]
    fn test_unsupported_has_no_details() {
        let msg = ErrorMessage::from_error(&StateTreeError::unsupported("sub-commands"));
        assert_eq!(msg.code, codes::UNSUPPORTED);
        assert_eq!(msg.message, "Unsupported: sub-commands");
        assert!(msg.details.is_none());
        assert!(!serde_json::to_string(&msg).unwrap().contains("details"));
    }
}

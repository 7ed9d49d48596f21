// Value previews
//
// Builds the bounded representation shown next to a state tree node.
// Memory descriptors are shown as descriptors; raw bytes are never inlined.

use serde::{Deserialize, Serialize};

use statetree_types::{Scalar, StateValue};

/// Ellipsis appended to truncated strings
pub const ELLIPSIS: char = '…';

/// Bounds applied to previews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewLimits {
    /// Longest sequence shown in full
    pub max_sequence_len: usize,
    /// Longest string, in characters, shown in full
    pub max_string_chars: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            max_sequence_len: 4,
            max_string_chars: 64,
        }
    }
}

/// A preview and whether it is the complete value
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub value: Option<StateValue>,
    pub is_value: bool,
}

impl Preview {
    fn complete(value: StateValue) -> Self {
        Self {
            value: Some(value),
            is_value: true,
        }
    }

    fn truncated(value: StateValue) -> Self {
        Self {
            value: Some(value),
            is_value: false,
        }
    }

    fn none() -> Self {
        Self {
            value: None,
            is_value: false,
        }
    }
}

/// Produces previews within a fixed set of limits
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewGenerator {
    limits: PreviewLimits,
}

impl PreviewGenerator {
    pub fn new(limits: PreviewLimits) -> Self {
        Self { limits }
    }

    /// Preview of a single value
    pub fn preview(&self, value: &StateValue) -> Preview {
        let mut value = value;
        while let StateValue::Nilable(Some(inner)) = value {
            value = inner.as_ref();
        }
        match value {
            StateValue::Pointer(_) | StateValue::Slice(_) => Preview::complete(value.clone()),
            StateValue::Scalar(Scalar::String(s)) => self.preview_string(s),
            StateValue::Scalar(_) => Preview::complete(value.clone()),
            StateValue::Sequence(items) => self.preview_elements(items),
            StateValue::Nilable(_) => Preview::complete(StateValue::nil()),
            StateValue::Record(_) | StateValue::Map(_) => Preview::none(),
        }
    }

    /// Preview of a run of sequence elements
    pub fn preview_elements(&self, items: &[StateValue]) -> Preview {
        let max = self.limits.max_sequence_len;
        if items.len() > max {
            Preview::truncated(StateValue::Sequence(items[..max].to_vec()))
        } else {
            Preview::complete(StateValue::Sequence(items.to_vec()))
        }
    }

    fn preview_string(&self, s: &str) -> Preview {
        let max = self.limits.max_string_chars;
        if s.chars().count() > max {
            let mut truncated: String = s.chars().take(max.saturating_sub(1)).collect();
            truncated.push(ELLIPSIS);
            Preview::truncated(StateValue::string(truncated))
        } else {
            Preview::complete(StateValue::string(s))
        }
    }
}

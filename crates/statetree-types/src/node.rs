use serde::{Deserialize, Serialize};

use crate::path::{ConstantSetRef, ValuePath};
use crate::value::StateValue;

/// Description of one resolved state tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Number of children reachable by one more index
    pub num_children: u64,
    /// Display name: field name, element index, map key or subgroup range
    pub name: String,
    /// Canonical path for fetching the full value
    pub value_path: ValuePath,
    /// Bounded preview of the value, if it has one
    pub preview: Option<StateValue>,
    /// True when `preview` is the complete value
    pub preview_is_value: bool,
    /// Enumeration the value indexes into, if tagged
    pub constants: Option<ConstantSetRef>,
}

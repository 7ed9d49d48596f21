// Paths
//
// Two kinds of path appear in the state tree: the navigation path
// (`NodePath`), a list of child indices that may pass through synthetic
// subgroups, and the canonical value path (`ValuePath`), which records the
// real field names, element indices and map keys traversed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{ApiId, CaptureId, ContentId};
use crate::value::Scalar;

/// A point in a capture: the state immediately after a command
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandCoordinate {
    pub capture: CaptureId,
    /// Command index followed by any sub-command indices
    pub indices: Vec<u64>,
}

impl CommandCoordinate {
    pub fn new(capture: CaptureId, command: u64) -> Self {
        Self {
            capture,
            indices: vec![command],
        }
    }

    /// Coordinate of a sub-command nested under this one
    pub fn sub_command(mut self, index: u64) -> Self {
        self.indices.push(index);
        self
    }

    /// The top level command index
    pub fn command(&self) -> Option<u64> {
        self.indices.first().copied()
    }

    pub fn has_sub_commands(&self) -> bool {
        self.indices.len() > 1
    }
}

impl fmt::Display for CommandCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.commands[", self.capture)?;
        for (i, idx) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", idx)?;
        }
        write!(f, "]")
    }
}

/// Reference to a named enumeration in an API's constant tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstantSetRef {
    pub api: ApiId,
    pub index: u32,
}

/// One step of a canonical value path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueStep {
    Field(String),
    ArrayIndex(u64),
    MapKey(Scalar),
}

/// Canonical path to a value: the state after a command plus the steps taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePath {
    pub after: CommandCoordinate,
    pub steps: Vec<ValueStep>,
}

impl ValuePath {
    /// The global state after the given command
    pub fn state(after: CommandCoordinate) -> Self {
        Self {
            after,
            steps: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.steps.push(ValueStep::Field(name.into()));
        self
    }

    pub fn array_index(mut self, index: u64) -> Self {
        self.steps.push(ValueStep::ArrayIndex(index));
        self
    }

    pub fn map_key(mut self, key: Scalar) -> Self {
        self.steps.push(ValueStep::MapKey(key));
        self
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.state", self.after)?;
        for step in &self.steps {
            match step {
                ValueStep::Field(name) => write!(f, ".{}", name)?,
                ValueStep::ArrayIndex(i) => write!(f, "[{}]", i)?,
                ValueStep::MapKey(Scalar::String(s)) => write!(f, "[{:?}]", s)?,
                ValueStep::MapKey(k) => write!(f, "[{}]", k)?,
            }
        }
        Ok(())
    }
}

/// Navigation path: a state tree handle plus child indices from its root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath {
    pub tree: ContentId,
    pub indices: Vec<u64>,
}

impl NodePath {
    pub fn root(tree: ContentId) -> Self {
        Self {
            tree,
            indices: Vec::new(),
        }
    }

    pub fn new(tree: ContentId, indices: Vec<u64>) -> Self {
        Self { tree, indices }
    }

    pub fn child(&self, index: u64) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self {
            tree: self.tree,
            indices,
        }
    }

    /// The path made of the first `len` indices
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            tree: self.tree,
            indices: self.indices[..len.min(self.indices.len())].to_vec(),
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/", self.tree)?;
        for (i, idx) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", idx)?;
        }
        Ok(())
    }
}

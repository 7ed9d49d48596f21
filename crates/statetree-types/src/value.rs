// Snapshot value graph
//
// A captured state is a tree of `StateValue`s owned by the snapshot. Each
// value reports its `StructuralKind`, which is all the navigator needs to
// decide how an index step applies to it.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memory::{MemoryPointer, MemorySlice};

/// Error type for building values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A record was given a different number of values than its schema has fields
    #[error("Record {record} expects {expected} fields, found {found}")]
    FieldCountMismatch {
        record: String,
        expected: usize,
        found: usize,
    },
}

/// Structural classification of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructuralKind {
    Record,
    Sequence,
    Map,
    MemoryPointer,
    MemorySlice,
    Scalar,
    Nilable,
}

impl fmt::Display for StructuralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralKind::Record => write!(f, "record"),
            StructuralKind::Sequence => write!(f, "sequence"),
            StructuralKind::Map => write!(f, "map"),
            StructuralKind::MemoryPointer => write!(f, "memory pointer"),
            StructuralKind::MemorySlice => write!(f, "memory slice"),
            StructuralKind::Scalar => write!(f, "scalar"),
            StructuralKind::Nilable => write!(f, "nilable"),
        }
    }
}

/// A leaf value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
}

impl Scalar {
    fn rank(&self) -> u8 {
        match self {
            Scalar::Bool(_) => 0,
            Scalar::Int(_) | Scalar::Uint(_) => 1,
            Scalar::Float(_) => 2,
            Scalar::String(_) => 3,
        }
    }

    /// Total order used to sort map keys.
    ///
    /// Integers compare numerically regardless of signedness, floats use
    /// IEEE total ordering, strings compare bytewise. Keys of different
    /// types order by type.
    pub fn total_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Uint(a), Scalar::Uint(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Uint(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (Scalar::Uint(a), Scalar::Int(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            (Scalar::String(a), Scalar::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Uint(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::String(v) => write!(f, "{}", v),
        }
    }
}

/// Per-field metadata supplied with a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Hidden fields are internal bookkeeping and never exposed as children
    pub visible: bool,
    /// Constant set the field's integer value indexes into; 0 means none
    pub constant_set: u32,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            constant_set: 0,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_constant_set(mut self, constant_set: u32) -> Self {
        self.constant_set = constant_set;
        self
    }
}

/// Field table of a record type, shared by every record of that type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            fields,
        })
    }

    /// Number of fields exposed to callers
    pub fn visible_count(&self) -> usize {
        self.fields.iter().filter(|f| f.visible).count()
    }

    /// Position in `fields` of the `idx`-th visible field
    pub fn visible_position(&self, idx: usize) -> Option<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.visible)
            .nth(idx)
            .map(|(i, _)| i)
    }
}

/// A struct-like value: a schema plus one value per schema field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct Record {
    schema: Arc<RecordSchema>,
    values: Vec<StateValue>,
}

/// Unchecked wire form of a record
#[derive(Deserialize)]
struct RawRecord {
    schema: Arc<RecordSchema>,
    values: Vec<StateValue>,
}

impl TryFrom<RawRecord> for Record {
    type Error = ValueError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        Record::new(raw.schema, raw.values)
    }
}

impl Record {
    pub fn new(schema: Arc<RecordSchema>, values: Vec<StateValue>) -> Result<Self, ValueError> {
        if schema.fields.len() != values.len() {
            return Err(ValueError::FieldCountMismatch {
                record: schema.name.clone(),
                expected: schema.fields.len(),
                found: values.len(),
            });
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn visible_count(&self) -> usize {
        self.schema.visible_count()
    }

    /// The `idx`-th visible field and its value
    pub fn visible_field(&self, idx: usize) -> Option<(&FieldDescriptor, &StateValue)> {
        let pos = self.schema.visible_position(idx)?;
        Some((self.schema.fields.get(pos)?, self.values.get(pos)?))
    }

    /// Value of the field with the given name, visible or not
    pub fn get(&self, name: &str) -> Option<&StateValue> {
        self.schema
            .fields
            .iter()
            .position(|f| f.name == name)
            .and_then(|pos| self.values.get(pos))
    }
}

/// A node in the snapshot graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateValue {
    Record(Record),
    Sequence(Vec<StateValue>),
    /// Map entries in capture order, which is unspecified
    Map(Vec<(Scalar, StateValue)>),
    Pointer(MemoryPointer),
    Slice(MemorySlice),
    Scalar(Scalar),
    /// Pointer- or interface-like indirection that may be empty
    Nilable(Option<Box<StateValue>>),
}

impl StateValue {
    pub fn kind(&self) -> StructuralKind {
        match self {
            StateValue::Record(_) => StructuralKind::Record,
            StateValue::Sequence(_) => StructuralKind::Sequence,
            StateValue::Map(_) => StructuralKind::Map,
            StateValue::Pointer(_) => StructuralKind::MemoryPointer,
            StateValue::Slice(_) => StructuralKind::MemorySlice,
            StateValue::Scalar(_) => StructuralKind::Scalar,
            StateValue::Nilable(_) => StructuralKind::Nilable,
        }
    }

    /// Human readable type description, used in error reports
    pub fn type_name(&self) -> String {
        match self {
            StateValue::Record(r) => r.schema().name.clone(),
            StateValue::Sequence(items) => format!("[{}]", items.len()),
            StateValue::Map(entries) => format!("map[{}]", entries.len()),
            StateValue::Pointer(p) => format!("{}*", p.element.name()),
            StateValue::Slice(s) => format!("{}[{}]", s.element.name(), s.count),
            StateValue::Scalar(Scalar::Bool(_)) => "bool".to_string(),
            StateValue::Scalar(Scalar::Int(_)) => "int".to_string(),
            StateValue::Scalar(Scalar::Uint(_)) => "uint".to_string(),
            StateValue::Scalar(Scalar::Float(_)) => "float".to_string(),
            StateValue::Scalar(Scalar::String(_)) => "string".to_string(),
            StateValue::Nilable(None) => "nil".to_string(),
            StateValue::Nilable(Some(inner)) => format!("*{}", inner.type_name()),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, StateValue::Nilable(None))
    }

    pub fn bool(v: bool) -> Self {
        StateValue::Scalar(Scalar::Bool(v))
    }

    pub fn int(v: i64) -> Self {
        StateValue::Scalar(Scalar::Int(v))
    }

    pub fn uint(v: u64) -> Self {
        StateValue::Scalar(Scalar::Uint(v))
    }

    pub fn float(v: f64) -> Self {
        StateValue::Scalar(Scalar::Float(v))
    }

    pub fn string(v: impl Into<String>) -> Self {
        StateValue::Scalar(Scalar::String(v.into()))
    }

    pub fn nil() -> Self {
        StateValue::Nilable(None)
    }

    /// Wrap a value in one level of indirection
    pub fn indirect(inner: StateValue) -> Self {
        StateValue::Nilable(Some(Box::new(inner)))
    }
}

// Core types for the state tree
//
// This crate holds the read-only snapshot value graph that the navigator
// walks, the memory descriptors it dereferences, and the path and node
// description types exchanged with callers.

pub mod id;
pub mod memory;
pub mod node;
pub mod path;
pub mod value;

pub use id::{ApiId, CaptureId, ContentId, ContentIdError};
pub use memory::{ElementType, Endianness, MemoryLayout, MemoryPointer, MemorySlice, PoolId, APPLICATION_POOL};
pub use node::NodeDescription;
pub use path::{CommandCoordinate, ConstantSetRef, NodePath, ValuePath, ValueStep};
pub use value::{FieldDescriptor, Record, RecordSchema, Scalar, StateValue, StructuralKind, ValueError};

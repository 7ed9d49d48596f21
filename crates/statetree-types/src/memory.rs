// Memory descriptors
//
// Opaque pointers and slices into the capture's application memory. The
// navigator never reads bytes itself: it computes element addresses with
// the layout below and hands pointers to the memory reader.

use serde::{Deserialize, Serialize};

/// Identifier of a memory pool in the capture
pub type PoolId = u32;

/// The pool holding application memory
pub const APPLICATION_POOL: PoolId = 0;

/// Byte order of the traced device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endianness {
    Little,
    Big,
}

/// Layout rules of the traced device, used for address arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryLayout {
    /// Width of a pointer in bytes
    pub pointer_size: u32,
    /// Byte order
    pub endianness: Endianness,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self {
            pointer_size: 8,
            endianness: Endianness::Little,
        }
    }
}

impl MemoryLayout {
    /// Size in bytes of one element of the given type
    pub fn size_of(&self, element: &ElementType) -> u64 {
        match element {
            ElementType::Bool | ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 | ElementType::F32 => 4,
            ElementType::U64 | ElementType::I64 | ElementType::F64 => 8,
            ElementType::Pointer => u64::from(self.pointer_size),
            ElementType::Struct { size, .. } => *size,
        }
    }
}

/// Type of the elements a pointer or slice refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Pointer,
    /// A record type with a fixed encoded size
    Struct { name: String, size: u64 },
}

impl ElementType {
    /// Display name of the type
    pub fn name(&self) -> &str {
        match self {
            ElementType::Bool => "bool",
            ElementType::U8 => "u8",
            ElementType::I8 => "i8",
            ElementType::U16 => "u16",
            ElementType::I16 => "i16",
            ElementType::U32 => "u32",
            ElementType::I32 => "i32",
            ElementType::U64 => "u64",
            ElementType::I64 => "i64",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::Pointer => "void*",
            ElementType::Struct { name, .. } => name,
        }
    }
}

/// A typed pointer into capture memory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryPointer {
    pub address: u64,
    pub pool: PoolId,
    pub element: ElementType,
}

impl MemoryPointer {
    pub fn new(address: u64, pool: PoolId, element: ElementType) -> Self {
        Self { address, pool, element }
    }
}

/// A typed, counted range of capture memory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemorySlice {
    /// Address of the original, un-narrowed allocation
    pub root: u64,
    /// Address of the first element of this slice
    pub base: u64,
    /// Number of elements
    pub count: u64,
    pub pool: PoolId,
    pub element: ElementType,
}

impl MemorySlice {
    pub fn new(base: u64, count: u64, pool: PoolId, element: ElementType) -> Self {
        Self {
            root: base,
            base,
            count,
            pool,
            element,
        }
    }

    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Pointer to the element at `index`
    pub fn index(&self, index: u64, layout: &MemoryLayout) -> MemoryPointer {
        let stride = layout.size_of(&self.element);
        MemoryPointer {
            address: self.base.wrapping_add(index.wrapping_mul(stride)),
            pool: self.pool,
            element: self.element.clone(),
        }
    }

    /// The sub-slice covering elements `[start, end)`
    ///
    /// Bounds are clamped to this slice's count.
    pub fn narrow(&self, start: u64, end: u64, layout: &MemoryLayout) -> MemorySlice {
        let end = end.min(self.count);
        let start = start.min(end);
        let stride = layout.size_of(&self.element);
        MemorySlice {
            root: self.root,
            base: self.base.wrapping_add(start.wrapping_mul(stride)),
            count: end - start,
            pool: self.pool,
            element: self.element.clone(),
        }
    }
}

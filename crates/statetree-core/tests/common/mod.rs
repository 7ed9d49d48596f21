// Shared capture fixture for state tree integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use statetree_core::testing::{InMemoryCapture, InMemoryMemory};
use statetree_core::types::{
    ApiId, CaptureId, CommandCoordinate, ContentId, ElementType, FieldDescriptor, MemoryLayout, MemoryPointer,
    MemorySlice, Record, RecordSchema, Scalar, StateValue, APPLICATION_POOL,
};
use statetree_core::GlobalState;

pub const GLES: ApiId = ApiId(1);
pub const VULKAN: ApiId = ApiId(2);

pub const SMALL_SLICE_BASE: u64 = 0x1000;
pub const BIG_SLICE_BASE: u64 = 0x2000;

// Visible field positions of the API state record
pub const CONTEXTS: u64 = 0;
pub const BUFFERS: u64 = 1;
pub const LABEL: u64 = 2;
pub const MODE: u64 = 3;
pub const MODES: u64 = 4;
pub const DATA: u64 = 5;
pub const BIG: u64 = 6;
pub const PTR: u64 = 7;
pub const CURRENT: u64 = 8;
pub const EMPTY: u64 = 9;
pub const SMALL: u64 = 10;
pub const PROGRAMS: u64 = 11;
pub const LOG: u64 = 12;
pub const VISIBLE_FIELDS: u64 = 13;

pub const MODE_CONSTANTS: u32 = 7;
pub const MODES_CONSTANTS: u32 = 9;
pub const PROGRAMS_CONSTANTS: u32 = 11;

pub fn capture_id() -> CaptureId {
    CaptureId(ContentId::from_bytes(b"trace.gfxtrace"))
}

/// State after the given command of the fixture capture
pub fn after(command: u64) -> CommandCoordinate {
    CommandCoordinate::new(capture_id(), command)
}

pub fn label() -> String {
    "abcdefghij".repeat(7)
}

fn context(id: u64, name: &str) -> StateValue {
    let schema = RecordSchema::new(
        "Context",
        vec![FieldDescriptor::new("Id"), FieldDescriptor::new("Name")],
    );
    StateValue::Record(Record::new(schema, vec![StateValue::uint(id), StateValue::string(name)]).unwrap())
}

fn api_state() -> StateValue {
    let schema = RecordSchema::new(
        "State",
        vec![
            FieldDescriptor::new("Contexts"),
            FieldDescriptor::new("lock").hidden(),
            FieldDescriptor::new("Buffers"),
            FieldDescriptor::new("Label"),
            FieldDescriptor::new("Mode").with_constant_set(MODE_CONSTANTS),
            FieldDescriptor::new("Modes").with_constant_set(MODES_CONSTANTS),
            FieldDescriptor::new("Data"),
            FieldDescriptor::new("Big"),
            FieldDescriptor::new("Ptr"),
            FieldDescriptor::new("Current"),
            FieldDescriptor::new("Empty"),
            FieldDescriptor::new("Small"),
            FieldDescriptor::new("Programs").with_constant_set(PROGRAMS_CONSTANTS),
            FieldDescriptor::new("Log"),
        ],
    );
    let values = vec![
        // Capture order is deliberately unsorted
        StateValue::Map(vec![
            (Scalar::Uint(3), context(3, "third")),
            (Scalar::Uint(1), context(1, "first")),
            (Scalar::Uint(2), StateValue::indirect(context(2, "second"))),
        ]),
        StateValue::uint(0xdead),
        StateValue::Sequence((0..55).map(StateValue::uint).collect()),
        StateValue::string(label()),
        StateValue::uint(2),
        StateValue::Sequence(vec![StateValue::uint(0), StateValue::uint(1), StateValue::uint(4)]),
        StateValue::Slice(MemorySlice::new(SMALL_SLICE_BASE, 3, APPLICATION_POOL, ElementType::U32)),
        StateValue::Slice(MemorySlice::new(BIG_SLICE_BASE, 1000, APPLICATION_POOL, ElementType::U32)),
        StateValue::Pointer(MemoryPointer::new(0x3000, APPLICATION_POOL, ElementType::Pointer)),
        StateValue::indirect(StateValue::indirect(context(1, "first"))),
        StateValue::nil(),
        StateValue::Sequence((1..=4).map(StateValue::int).collect()),
        StateValue::Sequence(vec![context(4, "blit"), context(5, "present")]),
        StateValue::Sequence((0..1000).map(StateValue::uint).collect()),
    ];
    StateValue::Record(Record::new(schema, values).unwrap())
}

pub fn memory() -> InMemoryMemory {
    let mut memory = InMemoryMemory::new()
        .with_value(APPLICATION_POOL, SMALL_SLICE_BASE, StateValue::uint(10))
        .with_value(APPLICATION_POOL, SMALL_SLICE_BASE + 4, StateValue::indirect(StateValue::uint(20)))
        .with_value(APPLICATION_POOL, SMALL_SLICE_BASE + 8, StateValue::uint(30));
    for i in [57u64, 573, 999] {
        memory = memory.with_value(APPLICATION_POOL, BIG_SLICE_BASE + i * 4, StateValue::uint(i));
    }
    memory
}

/// A three command capture: two GLES commands then one Vulkan command.
///
/// State is recorded after commands 0 and 2 only; the state after command 2
/// has no Vulkan entry.
pub fn capture_with_delay(delay: Option<Duration>) -> (Arc<InMemoryCapture>, Arc<InMemoryMemory>) {
    let memory = Arc::new(memory());
    let state = GlobalState::new(MemoryLayout::default(), memory.clone()).with_api(GLES, api_state());
    let later = GlobalState::new(MemoryLayout::default(), memory.clone()).with_api(GLES, api_state());
    let mut capture = InMemoryCapture::new(capture_id())
        .command(GLES)
        .command(GLES)
        .command(VULKAN)
        .state_after(0, state)
        .state_after(2, later);
    if let Some(delay) = delay {
        capture = capture.with_delay(delay);
    }
    (Arc::new(capture), memory)
}

pub fn capture() -> (Arc<InMemoryCapture>, Arc<InMemoryMemory>) {
    capture_with_delay(None)
}

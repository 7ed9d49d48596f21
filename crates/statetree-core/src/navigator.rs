// State tree navigation
//
// Resolves a navigation path against a root context one index at a time.
// Collections larger than the group limit are exposed as synthetic
// subgroups; `offset` carries the absolute position of the current subgroup
// so element names and value paths use real indices.

use std::borrow::Cow;
use std::ops::Range;

use tracing::{debug, trace};

use statetree_error::{StateTreeError, StateTreeResult};
use statetree_types::{
    ConstantSetRef, MemoryPointer, NodeDescription, NodePath, Scalar, StateValue, StructuralKind, ValuePath,
};

use crate::grouping::{needs_subgrouping, subgroup_count, subgroup_range};
use crate::preview::PreviewGenerator;
use crate::resolve::RootContext;

/// Default cap on chained indirections
pub const DEFAULT_MAX_INDIRECTION_DEPTH: usize = 64;

/// The value a walk is positioned at
struct Cursor<'a> {
    value: Cow<'a, StateValue>,
    /// Element range of a sequence narrowed by subgroup steps
    window: Option<Range<usize>>,
}

impl<'a> Cursor<'a> {
    fn new(value: Cow<'a, StateValue>) -> Self {
        Self { value, window: None }
    }

    /// Elements of the current sequence, narrowed to the window
    fn elements(&self) -> Option<&[StateValue]> {
        match self.value.as_ref() {
            StateValue::Sequence(items) => match &self.window {
                Some(window) => items.get(window.clone()),
                None => Some(items.as_slice()),
            },
            _ => None,
        }
    }

    fn window_start(&self) -> usize {
        self.window.as_ref().map_or(0, |w| w.start)
    }

    fn num_children(&self, group_limit: u64) -> u64 {
        match self.value.as_ref() {
            StateValue::Pointer(_) => 0,
            StateValue::Slice(slice) => subgroup_count(group_limit, slice.count),
            StateValue::Record(record) => record.visible_count() as u64,
            StateValue::Sequence(_) => {
                let len = self.elements().map_or(0, <[StateValue]>::len);
                subgroup_count(group_limit, len as u64)
            }
            StateValue::Map(entries) => entries.len() as u64,
            StateValue::Scalar(_) | StateValue::Nilable(_) => 0,
        }
    }
}

/// Which child of the current value a step selects
#[derive(Debug, Clone, Copy)]
enum Selector {
    VisibleField(usize),
    Element(usize),
    MapValue(usize),
}

impl Selector {
    fn select<'v>(self, value: &'v StateValue) -> Option<&'v StateValue> {
        match (self, value) {
            (Selector::VisibleField(idx), StateValue::Record(record)) => {
                record.visible_field(idx).map(|(_, v)| v)
            }
            (Selector::Element(pos), StateValue::Sequence(items)) => items.get(pos),
            (Selector::MapValue(pos), StateValue::Map(entries)) => entries.get(pos).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Outcome of dispatching one index on the current value
enum Step {
    /// Dereference one memory element
    Load(MemoryPointer),
    /// Replace the current value
    Replace(StateValue),
    /// Narrow the current sequence
    Window(Range<usize>),
    /// Descend into a child of the current value
    Select(Selector),
}

/// Positions of map entries sorted by key
fn sorted_entry_order(entries: &[(Scalar, StateValue)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| entries[a].0.total_cmp(&entries[b].0));
    order
}

fn subgroup_name(offset: u64, start: u64, end: u64) -> String {
    format!("[{} - {}]", offset + start, offset + end - 1)
}

/// Take a child out of a borrowed or owned value
fn project<'a>(value: Cow<'a, StateValue>, selector: Selector) -> Option<Cow<'a, StateValue>> {
    match value {
        Cow::Borrowed(v) => selector.select(v).map(Cow::Borrowed),
        Cow::Owned(v) => selector.select(&v).cloned().map(Cow::Owned),
    }
}

/// Walks navigation paths against a single root context
pub struct Navigator<'a> {
    root: &'a RootContext,
    previews: PreviewGenerator,
    max_indirection_depth: usize,
}

impl<'a> Navigator<'a> {
    pub fn new(root: &'a RootContext) -> Self {
        Self {
            root,
            previews: PreviewGenerator::default(),
            max_indirection_depth: DEFAULT_MAX_INDIRECTION_DEPTH,
        }
    }

    pub fn with_previews(mut self, previews: PreviewGenerator) -> Self {
        self.previews = previews;
        self
    }

    pub fn with_max_indirection_depth(mut self, depth: usize) -> Self {
        self.max_indirection_depth = depth;
        self
    }

    /// Follow non-empty indirections until a concrete or nil value is reached
    fn unwrap_indirection(&self, value: Cow<'a, StateValue>) -> StateTreeResult<Cow<'a, StateValue>> {
        let mut value = value;
        let mut depth = 0;
        loop {
            value = match value {
                Cow::Borrowed(StateValue::Nilable(Some(inner))) => Cow::Borrowed(inner.as_ref()),
                Cow::Owned(StateValue::Nilable(Some(inner))) => Cow::Owned(*inner),
                concrete => return Ok(concrete),
            };
            depth += 1;
            if depth > self.max_indirection_depth {
                return Err(StateTreeError::IndirectionLimit {
                    depth: self.max_indirection_depth,
                });
            }
        }
    }

    /// Resolve `path` to a node description
    pub async fn resolve(&self, path: &NodePath) -> StateTreeResult<NodeDescription> {
        let group_limit = self.root.group_limit();
        let layout = self.root.layout();

        let mut name = "root".to_string();
        let mut value_path = ValuePath::state(self.root.after().clone());
        let mut constants: Option<ConstantSetRef> = None;
        let mut cursor = Cursor::new(self.unwrap_indirection(Cow::Borrowed(self.root.api_state()))?);
        let mut num_children = cursor.num_children(group_limit);
        let mut offset = 0u64;

        for (i, &idx) in path.indices.iter().enumerate() {
            if idx >= num_children {
                let kind = cursor.value.kind();
                debug!(index = idx, num_children, %kind, "state tree step failed");
                return Err(match kind {
                    StructuralKind::Scalar | StructuralKind::MemoryPointer | StructuralKind::Nilable => {
                        StateTreeError::NonIndexable {
                            kind,
                            type_name: cursor.value.type_name(),
                        }
                    }
                    _ => StateTreeError::index_out_of_bounds(idx, num_children, path.prefix(i + 1)),
                });
            }

            let step = match cursor.value.as_ref() {
                StateValue::Slice(slice) => {
                    let size = slice.count;
                    if needs_subgrouping(group_limit, size) {
                        let (s, e) = subgroup_range(group_limit, size, idx);
                        name = subgroup_name(offset, s, e);
                        offset += s;
                        Step::Replace(StateValue::Slice(slice.narrow(s, e, layout)))
                    } else {
                        let absolute = offset + idx;
                        name = absolute.to_string();
                        value_path = value_path.array_index(absolute);
                        offset = 0;
                        Step::Load(slice.index(idx, layout))
                    }
                }
                StateValue::Record(record) => {
                    let (field, _) = record
                        .visible_field(idx as usize)
                        .ok_or_else(|| StateTreeError::index_out_of_bounds(idx, num_children, path.prefix(i + 1)))?;
                    constants = (field.constant_set > 0).then(|| ConstantSetRef {
                        api: self.root.api(),
                        index: field.constant_set,
                    });
                    name = field.name.clone();
                    value_path = value_path.field(field.name.as_str());
                    Step::Select(Selector::VisibleField(idx as usize))
                }
                StateValue::Sequence(_) => {
                    let size = cursor.elements().map_or(0, <[StateValue]>::len) as u64;
                    let start = cursor.window_start();
                    if needs_subgrouping(group_limit, size) {
                        let (s, e) = subgroup_range(group_limit, size, idx);
                        name = subgroup_name(offset, s, e);
                        offset += s;
                        Step::Window(start + s as usize..start + e as usize)
                    } else {
                        let absolute = offset + idx;
                        name = absolute.to_string();
                        value_path = value_path.array_index(absolute);
                        offset = 0;
                        Step::Select(Selector::Element(start + idx as usize))
                    }
                }
                StateValue::Map(entries) => {
                    let pos = sorted_entry_order(entries)[idx as usize];
                    let key = &entries[pos].0;
                    constants = None;
                    name = key.to_string();
                    value_path = value_path.map_key(key.clone());
                    Step::Select(Selector::MapValue(pos))
                }
                other => {
                    return Err(StateTreeError::NonIndexable {
                        kind: other.kind(),
                        type_name: other.type_name(),
                    })
                }
            };

            cursor = match step {
                Step::Load(pointer) => {
                    trace!(address = pointer.address, pool = pointer.pool, "loading memory element");
                    let element = self.root.memory().load(&pointer, layout).await?;
                    Cursor::new(self.unwrap_indirection(Cow::Owned(element))?)
                }
                Step::Replace(value) => Cursor::new(Cow::Owned(value)),
                Step::Window(window) => Cursor {
                    value: cursor.value,
                    window: Some(window),
                },
                Step::Select(selector) => {
                    let child = project(cursor.value, selector)
                        .ok_or_else(|| StateTreeError::index_out_of_bounds(idx, num_children, path.prefix(i + 1)))?;
                    Cursor::new(self.unwrap_indirection(child)?)
                }
            };
            // Enumerations tag scalars and collections of them, never records or maps
            if matches!(cursor.value.kind(), StructuralKind::Record | StructuralKind::Map) {
                constants = None;
            }
            num_children = cursor.num_children(group_limit);
            trace!(step = i, index = idx, name = %name, num_children, "state tree step");
        }

        let preview = match cursor.elements() {
            Some(elements) => self.previews.preview_elements(elements),
            None => self.previews.preview(cursor.value.as_ref()),
        };

        Ok(NodeDescription {
            num_children,
            name,
            value_path,
            preview: preview.value,
            preview_is_value: preview.is_value,
            constants,
        })
    }
}

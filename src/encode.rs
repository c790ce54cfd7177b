//! Generic encoder: walk any [`Configurable`] value into a [`PathNode`] tree.
//!
//! Two modes share the walk (see [`EncodeMode`]):
//!
//! - **Schema** documents what *could* be configured. Unset optionals are
//!   descended through their default instance, a mapping yields one
//!   `<NAME>` entry, a sequence of records one `<N>` entry.
//! - **Data** exports what *is* configured. Unset optionals and empty
//!   sequences are left out; real keys and indexes are used.
//!
//! A [`RawValue`] has no declared structure, so schema mode lists it as a
//! single entry and data mode exports whatever it holds.
//!
//! Ignored fields come out as `disabled` nodes so flatteners can skip them.
//! Flattened fields hand their children to the enclosing record.
//! Field descriptions are attached to the node of the field they describe.

use crate::flatten::{Flat, Flattener};
use crate::node::PathNode;
use crate::raw::RawValue;
use crate::path::{MAP_NAME_PLACEHOLDER, SEQUENCE_INDEX_PLACEHOLDER, SEQUENCE_SEPARATOR, index_name};
use crate::shape::{Configurable, FieldMeta, ShapeKind, ShapeRef, accepts_leaf};
use crate::types::EncodeMode;

/// Encode `value` into a tree whose root node is named `root`.
pub fn encode_to_node(root: &str, value: &dyn Configurable, mode: EncodeMode) -> PathNode {
    Encoder { mode }
        .node(root.to_string(), value, None, Role::Root)
        .unwrap_or_else(|| PathNode::new(root))
}

/// The schema listing of `value`, in environment-variable form
/// (`ROOT_SERVER_FTP_HOST`), sorted by name.
pub fn encode(root: &str, value: &dyn Configurable) -> Vec<Flat> {
    Flattener::env().flatten(&encode_to_node(root, value, EncodeMode::Schema))
}

/// Where a value sits relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Root,
    /// A record field, reached directly.
    Field,
    /// The value inside an `Option`.
    Inner,
    /// A sequence element.
    Element,
    /// A mapping value (a real entry or the placeholder).
    Entry,
}

struct Encoder {
    mode: EncodeMode,
}

impl Encoder {
    fn schema(&self) -> bool {
        self.mode == EncodeMode::Schema
    }

    /// `None` means the value has nothing to contribute in this mode.
    fn node(&self, name: String, value: &dyn Configurable, meta: Option<&FieldMeta>, role: Role) -> Option<PathNode> {
        match value.shape() {
            ShapeRef::Scalar(scalar) => Some(PathNode::leaf(name, scalar.render())),

            ShapeRef::Optional(optional) => {
                let allow_empty = meta.is_some_and(FieldMeta::allows_empty);
                let (mut node, set) = match optional.get() {
                    Some(inner) => (self.node(name, inner, meta, Role::Inner)?, true),
                    None if self.schema() => {
                        let placeholder = optional.placeholder();
                        (self.node(name, placeholder.as_ref(), meta, Role::Inner)?, false)
                    }
                    None => return None,
                };
                if self.schema() && allow_empty && matches!(inner_kind(value), ShapeKind::Record | ShapeKind::Mapping) {
                    node.value = Some(set.to_string());
                }
                Some(node)
            }

            ShapeRef::Sequence(sequence) => {
                let scalar_elements = accepts_leaf(sequence.placeholder().as_ref());
                if !self.schema() && sequence.is_empty() {
                    return None;
                }
                if scalar_elements && self.schema() {
                    let joined: Vec<String> = (0..sequence.len())
                        .filter_map(|i| sequence.element(i))
                        .map(|element| render_leaf(element).unwrap_or_default())
                        .collect();
                    return Some(PathNode::leaf(name, joined.join(SEQUENCE_SEPARATOR.to_string().as_str())));
                }

                let mut node = PathNode::new(name);
                if self.schema() {
                    let name = SEQUENCE_INDEX_PLACEHOLDER.to_string();
                    let representative = match sequence.element(0) {
                        Some(first) => self.node(name, first, None, Role::Element),
                        None => {
                            let placeholder = sequence.placeholder();
                            self.node(name, placeholder.as_ref(), None, Role::Element)
                        }
                    };
                    node.children.extend(representative);
                } else {
                    for i in 0..sequence.len() {
                        if let Some(element) = sequence.element(i) {
                            node.children.extend(self.node(index_name(i), element, None, Role::Element));
                        }
                    }
                }
                Some(node)
            }

            ShapeRef::Mapping(mapping) => {
                let mut node = PathNode::new(name);
                if self.schema() {
                    let placeholder = mapping.placeholder();
                    node.children.extend(self.node(
                        MAP_NAME_PLACEHOLDER.to_string(),
                        placeholder.as_ref(),
                        None,
                        Role::Entry,
                    ));
                } else {
                    let mut keys = mapping.keys();
                    keys.sort();
                    for key in keys {
                        if let Some(entry) = mapping.value(&key) {
                            node.children.extend(self.node(key, entry, None, Role::Entry));
                        }
                    }
                }
                Some(node)
            }

            ShapeRef::Raw(raw) if self.schema() => {
                Some(PathNode::leaf(name, raw.as_str().unwrap_or_default()))
            }
            ShapeRef::Raw(raw) => raw_node(name, raw),

            ShapeRef::Record(record) => {
                let mut node = PathNode::new(name);
                if self.schema() && matches!(role, Role::Field | Role::Entry) {
                    node.value = Some(String::new());
                }
                for (i, field_meta) in record.fields().iter().enumerate() {
                    let field_name = field_meta.config_name().into_owned();
                    if field_meta.is_ignored() {
                        node.children.push(PathNode {
                            disabled: true,
                            ..PathNode::new(field_name)
                        });
                        continue;
                    }
                    let Some(field) = record.field(i) else {
                        continue;
                    };
                    if field_meta.is_flattened() {
                        if let Some(inner) = self.node(field_name, field, None, Role::Inner) {
                            node.children.extend(inner.children);
                        }
                        continue;
                    }
                    if let Some(mut child) = self.node(field_name, field, Some(field_meta), Role::Field) {
                        child.description = field_meta.description().map(str::to_string);
                        node.children.push(child);
                    }
                }
                Some(node)
            }
        }
    }
}

fn raw_node(name: String, raw: &RawValue) -> Option<PathNode> {
    match raw {
        RawValue::Null => None,
        RawValue::Leaf(value) => Some(PathNode::leaf(name, value.as_str())),
        RawValue::Map(map) => Some(
            PathNode::new(name).with_children(
                map.iter()
                    .filter_map(|(key, value)| raw_node(key.clone(), value))
                    .collect(),
            ),
        ),
        RawValue::List(items) => Some(
            PathNode::new(name).with_children(
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| raw_node(index_name(i), item))
                    .collect(),
            ),
        ),
    }
}

/// Render a value that fits in a single leaf.
fn render_leaf(value: &dyn Configurable) -> Option<String> {
    match value.shape() {
        ShapeRef::Scalar(scalar) => Some(scalar.render()),
        ShapeRef::Raw(raw) => raw.as_str().map(str::to_string),
        ShapeRef::Optional(optional) => optional.get().and_then(render_leaf),
        _ => None,
    }
}

/// Shape kind of `value`, looking through optionals.
pub(crate) fn inner_kind(value: &dyn Configurable) -> ShapeKind {
    match value.shape() {
        ShapeRef::Optional(optional) => match optional.get() {
            Some(inner) => inner_kind(inner),
            None => inner_kind(optional.placeholder().as_ref()),
        },
        shape => shape.kind(),
    }
}

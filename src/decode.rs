//! Generic decoder: populate any [`Configurable`] value from a [`PathNode`]
//! tree.
//!
//! The decoder walks the target's shape and the tree in lock-step:
//!
//! | Target shape | Node with children | Leaf value |
//! |--------------|--------------------|------------|
//! | scalar | error (unless the node also has a value) | parsed |
//! | optional | allocate, recurse | allocate if the inner shape takes a leaf, or with `allow_empty` |
//! | sequence | `[N]` children replace the content | split on `,` |
//! | mapping | one entry per child | `""` is a no-op, anything else an error |
//! | record | fields matched case-insensitively | `""` is a no-op, anything else an error |
//! | raw | `[N]` children make a list, others a map | kept as a string |
//!
//! Children win over a value on the same node for every container shape.
//! Source data with no matching field is dropped. Decoding stops at the first
//! error; whatever was written before it stays written.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::TreefigError;
use crate::node::PathNode;
use crate::path::{MAX_SEQUENCE_LEN, SEQUENCE_SEPARATOR, eq_fold, field_names, index_name};
use crate::raw::RawValue;
use crate::shape::{
    Configurable, MappingValue, OptionalValue, RecordValue, ScalarValue, SequenceValue, ShapeKind,
    ShapeMut, accepts_leaf, parse_bool,
};
use crate::tree::build_label_tree;

/// Populate `target` from `node`. The node's own name is the root segment.
///
/// An empty root node leaves the target untouched.
pub fn decode(node: &PathNode, target: &mut dyn Configurable) -> Result<(), TreefigError> {
    if node.is_empty() {
        return Ok(());
    }
    Decoder::new(&node.name).value(node, target, false)
}

/// Populate `target` from dotted labels (`root.server.ftp.host = ...`).
///
/// Produces the same result as [`decode`] over the equivalent `/` pairs.
pub fn decode_labels<I, K, V>(labels: I, root: &str, target: &mut dyn Configurable) -> Result<(), TreefigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let tree = build_label_tree(labels, root)?;
    decode(&tree, target)
}

struct Decoder {
    path: Vec<String>,
}

impl Decoder {
    fn new(root: &str) -> Self {
        Self {
            path: vec![root.to_string()],
        }
    }

    fn path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !segment.starts_with('[') {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }

    fn decode_error(&self, value: Option<&str>, reason: impl Into<String>) -> TreefigError {
        TreefigError::Decode {
            path: self.path(),
            value: value.map(str::to_string),
            reason: reason.into(),
        }
    }

    fn unsupported(&self, reason: impl Into<String>) -> TreefigError {
        TreefigError::UnsupportedShape {
            path: self.path(),
            reason: reason.into(),
        }
    }

    fn descend(&mut self, node: &PathNode, target: &mut dyn Configurable, allow_empty: bool) -> Result<(), TreefigError> {
        self.path.push(node.name.clone());
        self.value(node, target, allow_empty)?;
        self.path.pop();
        Ok(())
    }

    fn value(&mut self, node: &PathNode, target: &mut dyn Configurable, allow_empty: bool) -> Result<(), TreefigError> {
        match target.shape_mut() {
            ShapeMut::Scalar(scalar) => self.scalar(node, scalar),
            ShapeMut::Optional(optional) => self.optional(node, optional, allow_empty),
            ShapeMut::Sequence(sequence) => self.sequence(node, sequence),
            ShapeMut::Mapping(mapping) => self.mapping(node, mapping),
            ShapeMut::Record(record) => self.record(node, record),
            ShapeMut::Raw(raw) => self.raw(node, raw),
        }
    }

    /// Length a sequence must grow to so that `max` is a valid index.
    fn sequence_len(&mut self, max: usize) -> Result<usize, TreefigError> {
        if let Some(len) = max.checked_add(1).filter(|len| *len <= MAX_SEQUENCE_LEN) {
            return Ok(len);
        }
        self.path.push(index_name(max));
        let err = self.decode_error(
            None,
            format!("index {max} exceeds the maximum sequence length of {MAX_SEQUENCE_LEN}"),
        );
        self.path.pop();
        Err(err)
    }

    fn scalar(&mut self, node: &PathNode, scalar: &mut dyn ScalarValue) -> Result<(), TreefigError> {
        match &node.value {
            Some(raw) => scalar
                .set_str(raw)
                .map_err(|reason| self.decode_error(Some(raw.as_str()), reason)),
            None if node.children.is_empty() => Ok(()),
            None => Err(self.decode_error(None, "expected a value, found nested keys")),
        }
    }

    fn optional(
        &mut self,
        node: &PathNode,
        optional: &mut dyn OptionalValue,
        allow_empty: bool,
    ) -> Result<(), TreefigError> {
        let Some(raw) = node.value.as_deref().filter(|_| node.children.is_empty()) else {
            return self.value(node, optional.get_or_allocate(), allow_empty);
        };

        let takes_leaf = {
            let placeholder = optional.placeholder();
            accepts_leaf(placeholder.as_ref()) || placeholder.shape().kind() == ShapeKind::Sequence
        };
        if takes_leaf {
            return self.value(node, optional.get_or_allocate(), allow_empty);
        }

        if allow_empty {
            if raw.is_empty() {
                optional.get_or_allocate();
                return Ok(());
            }
            return match parse_bool(raw) {
                Ok(true) => {
                    optional.get_or_allocate();
                    Ok(())
                }
                Ok(false) => {
                    optional.clear();
                    Ok(())
                }
                Err(_) => Err(self.decode_error(Some(raw), "expected an empty value or a boolean")),
            };
        }

        if raw.is_empty() {
            trace!(path = %self.path(), "empty value for an optional section, leaving it unset");
            return Ok(());
        }
        Err(self.decode_error(Some(raw), "cannot assign a value to a nested section"))
    }

    fn sequence(&mut self, node: &PathNode, sequence: &mut dyn SequenceValue) -> Result<(), TreefigError> {
        let indexed: Vec<(usize, &PathNode)> = node
            .children
            .iter()
            .filter_map(|child| child.index().map(|i| (i, child)))
            .collect();

        if let Some(max) = indexed.iter().map(|(i, _)| *i).max() {
            for child in node.children.iter().filter(|c| c.index().is_none()) {
                trace!(path = %self.path(), key = %child.name, "dropping named key inside a sequence");
            }
            let len = self.sequence_len(max)?;
            sequence.clear();
            sequence.resize(len);
            for (index, child) in indexed {
                let element = sequence
                    .element_mut(index)
                    .ok_or_else(|| self.unsupported(format!("sequence did not grow to index {index}")))?;
                self.descend(child, element, false)?;
            }
            return Ok(());
        }

        let Some(raw) = &node.value else {
            if node.children.is_empty() {
                return Ok(());
            }
            return Err(self.decode_error(None, "expected indexed entries or a comma-separated value"));
        };

        sequence.clear();
        if raw.is_empty() {
            return Ok(());
        }
        if !accepts_leaf(sequence.placeholder().as_ref()) {
            return Err(self.unsupported("only sequences of scalars can be given as a comma-separated value"));
        }

        let parts: Vec<&str> = raw.split(SEQUENCE_SEPARATOR).collect();
        sequence.resize(parts.len());
        for (index, part) in parts.into_iter().enumerate() {
            let element = sequence
                .element_mut(index)
                .ok_or_else(|| self.unsupported(format!("sequence did not grow to index {index}")))?;
            self.descend(&PathNode::leaf(index_name(index), part), element, false)?;
        }
        Ok(())
    }

    fn mapping(&mut self, node: &PathNode, mapping: &mut dyn MappingValue) -> Result<(), TreefigError> {
        if node.children.is_empty() {
            return self.empty_container(node, "map");
        }
        for child in &node.children {
            let key = match child.index() {
                Some(index) => index.to_string(),
                None => child.name.clone(),
            };
            self.descend(child, mapping.entry(&key), false)?;
        }
        Ok(())
    }

    fn record(&mut self, node: &PathNode, record: &mut dyn RecordValue) -> Result<(), TreefigError> {
        if node.children.is_empty() {
            return self.empty_container(node, "section");
        }

        let mut consumed = vec![false; node.children.len()];
        self.record_fields(node, record, &mut consumed)?;

        for (child, used) in node.children.iter().zip(consumed) {
            if !used {
                trace!(path = %self.path(), key = %child.name, "no field matches key, dropping it");
            }
        }
        Ok(())
    }

    /// Decode the children of `node` that name a field of `record`, marking
    /// them in `consumed`. Flattened fields read from the same node.
    fn record_fields(
        &mut self,
        node: &PathNode,
        record: &mut dyn RecordValue,
        consumed: &mut [bool],
    ) -> Result<(), TreefigError> {
        for (field_index, meta) in record.fields().iter().enumerate() {
            if meta.is_ignored() {
                continue;
            }
            let name = meta.config_name();
            let Some(field) = record.field_mut(field_index) else {
                return Err(self.unsupported(format!("record has no field #{field_index} ('{name}')")));
            };

            if meta.is_flattened() {
                self.flattened(node, field, &name, consumed)?;
                continue;
            }

            let Some(child_index) = node
                .children
                .iter()
                .position(|c| c.index().is_none() && eq_fold(&c.name, &name))
            else {
                continue;
            };
            consumed[child_index] = true;
            self.descend(&node.children[child_index], field, meta.allows_empty())?;
        }
        Ok(())
    }

    fn flattened(
        &mut self,
        node: &PathNode,
        field: &mut dyn Configurable,
        name: &str,
        consumed: &mut [bool],
    ) -> Result<(), TreefigError> {
        match field.shape_mut() {
            ShapeMut::Record(inner) => self.record_fields(node, inner, consumed),
            ShapeMut::Optional(optional) => {
                let names = field_names(optional.placeholder().as_ref());
                let touched = node
                    .children
                    .iter()
                    .any(|c| c.index().is_none() && names.iter().any(|n| eq_fold(&c.name, n)));
                if !touched {
                    return Ok(());
                }
                self.flattened(node, optional.get_or_allocate(), name, consumed)
            }
            _ => Err(self.unsupported(format!("only records can be flattened, '{name}' is not one"))),
        }
    }

    /// Index children make a list, named children a map (merged into an
    /// existing one), a plain value a leaf.
    fn raw(&mut self, node: &PathNode, raw: &mut RawValue) -> Result<(), TreefigError> {
        let indexed: Vec<(usize, &PathNode)> = node
            .children
            .iter()
            .filter_map(|child| child.index().map(|i| (i, child)))
            .collect();

        if let Some(max) = indexed.iter().map(|(i, _)| *i).max() {
            for child in node.children.iter().filter(|c| c.index().is_none()) {
                trace!(path = %self.path(), key = %child.name, "dropping named key inside a list");
            }
            let mut items = vec![RawValue::Null; self.sequence_len(max)?];
            for (index, child) in indexed {
                self.path.push(child.name.clone());
                self.raw(child, &mut items[index])?;
                self.path.pop();
            }
            *raw = RawValue::List(items);
            return Ok(());
        }

        if !node.children.is_empty() {
            if !matches!(raw, RawValue::Map(_)) {
                *raw = RawValue::Map(BTreeMap::new());
            }
            if let RawValue::Map(map) = raw {
                for child in &node.children {
                    self.path.push(child.name.clone());
                    self.raw(child, map.entry(child.name.clone()).or_default())?;
                    self.path.pop();
                }
            }
            return Ok(());
        }

        if let Some(value) = &node.value {
            *raw = RawValue::Leaf(value.clone());
        }
        Ok(())
    }

    /// A record or mapping reached by a node without children.
    fn empty_container(&self, node: &PathNode, what: &str) -> Result<(), TreefigError> {
        match node.value.as_deref() {
            Some(raw) if !raw.is_empty() => {
                Err(self.decode_error(Some(raw), format!("cannot assign a value to a {what}")))
            }
            _ => Ok(()),
        }
    }
}

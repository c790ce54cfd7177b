//! The intermediate tree every source is turned into before decoding, and
//! every value is turned into before flattening.

use std::cmp::Ordering;

use serde::Serialize;

use crate::path::{eq_fold, index_of};

/// One node of a path tree.
///
/// `name` is a single segment with its first-seen casing, or `[N]` for a
/// sequence index. A node may carry both a value and children when a path
/// terminates and continues at the same place; consumers decide which wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PathNode>,
    /// Excluded from flattening, together with its subtree.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PathNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<PathNode>) -> Self {
        self.children = children;
        self
    }

    /// The sequence index this node stands for, if it is an index node.
    pub fn index(&self) -> Option<usize> {
        index_of(&self.name)
    }

    /// Has a value and nothing below it.
    pub fn is_leaf(&self) -> bool {
        self.value.is_some() && self.children.is_empty()
    }

    /// Case-insensitive lookup among the direct children.
    pub fn child(&self, name: &str) -> Option<&PathNode> {
        self.children.iter().find(|c| eq_fold(&c.name, name))
    }

    /// Find a child by name (case-insensitively), appending a new one if
    /// there is none. An existing child keeps its original casing.
    pub fn child_or_insert(&mut self, name: &str) -> &mut PathNode {
        let pos = match self.children.iter().position(|c| eq_fold(&c.name, name)) {
            Some(pos) => pos,
            None => {
                self.children.push(PathNode::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[pos]
    }

    /// Sort every level: names ascending case-insensitively, index nodes last
    /// in numeric order.
    pub fn sort(&mut self) {
        self.children.sort_by(compare_siblings);
        for child in &mut self.children {
            child.sort();
        }
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(PathNode::len).sum::<usize>()
    }

    /// A node with no value and no children.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }
}

fn compare_siblings(a: &PathNode, b: &PathNode) -> Ordering {
    match (a.index(), b.index()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sort_puts_indexes_last_and_numeric() {
        let mut node = PathNode::new("root").with_children(vec![
            PathNode::new("[10]"),
            PathNode::new("beta"),
            PathNode::new("[2]"),
            PathNode::new("Alpha"),
        ]);
        node.sort();
        let names: Vec<_> = node.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "[2]", "[10]"]);
    }

    #[test]
    fn sort_is_recursive() {
        let mut node = PathNode::new("root").with_children(vec![
            PathNode::new("a").with_children(vec![PathNode::leaf("z", "1"), PathNode::leaf("y", "2")]),
        ]);
        node.sort();
        assert_eq!(node.children[0].children[0].name, "y");
    }

    #[test]
    fn child_or_insert_keeps_first_casing() {
        let mut node = PathNode::new("root");
        node.child_or_insert("Foo").value = Some("1".into());
        node.child_or_insert("foo").value = Some("2".into());
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].name, "Foo");
        assert_eq!(node.child("FOO").and_then(|c| c.value.as_deref()), Some("2"));
    }

    #[test]
    fn index_and_leaf_helpers() {
        assert_eq!(PathNode::new("[3]").index(), Some(3));
        assert_eq!(PathNode::new("three").index(), None);
        assert!(PathNode::leaf("a", "").is_leaf());
        assert!(!PathNode::new("a").is_leaf());
        assert!(PathNode::new("a").is_empty());
    }

    #[test]
    fn serializes_without_empty_fields() {
        let node = PathNode::new("root").with_children(vec![PathNode::leaf("host", "localhost")]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "root",
                "children": [{ "name": "host", "value": "localhost" }]
            })
        );
    }
}

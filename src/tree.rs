//! Path tree builder: groups flat `path = value` pairs sharing one root into
//! an ordered [`PathNode`] tree.
//!
//! ```text
//! app/server/ftp/host = test.example.net        app
//! app/server/ftp/sources/0 = /           →       └─ server
//!                                                   └─ ftp
//!                                                      ├─ host = test.example.net
//!                                                      └─ sources
//!                                                         └─ [0] = /
//! ```
//!
//! Rules:
//!
//! - The first segment must be the root. Other roots are dropped; the root
//!   spelled with different casing is an error.
//! - Bare integers and `name[N]` suffixes become `[N]` index nodes, so
//!   `app/foo/0/aaa` and `app.foo[0].aaa` build the same tree.
//! - Sibling names merge case-insensitively (first casing wins), the last
//!   value assigned to a path wins.
//! - Children are sorted by name, index nodes last in numeric order.

use tracing::trace;

use crate::error::TreefigError;
use crate::node::PathNode;
use crate::path::{eq_fold, split_segment};

/// Builds [`PathNode`] trees from flat pairs.
///
/// ```ignore
/// let tree = TreeBuilder::new("app")
///     .filters(["app/server"])
///     .build([("app/server/ftp/host", "localhost")])?;
/// ```
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root: String,
    delimiter: char,
    filters: Vec<String>,
}

impl TreeBuilder {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            delimiter: '/',
            filters: Vec::new(),
        }
    }

    /// Segment delimiter (default `/`).
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Restrict which subtrees are admitted. Each filter is a path starting
    /// at the root, matched segment by segment, case-insensitively.
    pub fn filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.filters = filters.into_iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn build<I, K, V>(&self, pairs: I) -> Result<PathNode, TreefigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let filters = self.parse_filters()?;
        let mut root = PathNode::new(&self.root);

        for (path, value) in pairs {
            let path = path.as_ref();
            let Some(segments) = self.segments(path)? else {
                trace!(path, root = %self.root, "dropping pair outside of root");
                continue;
            };
            if !filters.is_empty() && !filters.iter().any(|f| matches_filter(&segments, f)) {
                trace!(path, "dropping pair rejected by filters");
                continue;
            }

            let mut node = &mut root;
            for segment in &segments {
                node = node.child_or_insert(segment);
            }
            node.value = Some(value.as_ref().to_string());
        }

        root.sort();
        Ok(root)
    }

    /// Split `path` into normalized segments below the root.
    ///
    /// `Ok(None)` means the path belongs to another root.
    fn segments(&self, path: &str) -> Result<Option<Vec<String>>, TreefigError> {
        let mut raw = path.split(self.delimiter);
        let first = raw.next().unwrap_or_default();
        if !eq_fold(first, &self.root) {
            return Ok(None);
        }
        if first != self.root {
            return Err(TreefigError::tree(
                path,
                format!("root '{first}' differs in case from '{}'", self.root),
            ));
        }

        let mut segments = Vec::new();
        for segment in raw {
            segments.extend(split_segment(segment).map_err(|reason| TreefigError::tree(path, reason))?);
        }
        if segments.is_empty() {
            return Err(TreefigError::tree(path, "a value cannot be assigned to the root"));
        }
        Ok(Some(segments))
    }

    fn parse_filters(&self) -> Result<Vec<Vec<String>>, TreefigError> {
        let mut parsed = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            let mut raw = filter.split(self.delimiter);
            let first = raw.next().unwrap_or_default();
            if !eq_fold(first, &self.root) {
                trace!(filter = %filter, root = %self.root, "filter does not start at root, it matches nothing");
                continue;
            }
            let mut segments = Vec::new();
            for segment in raw.filter(|s| !s.is_empty()) {
                segments.extend(split_segment(segment).map_err(|reason| TreefigError::tree(filter, reason))?);
            }
            parsed.push(segments);
        }
        if parsed.is_empty() && !self.filters.is_empty() {
            // Every filter points elsewhere: admit nothing.
            parsed.push(vec![String::new()]);
        }
        Ok(parsed)
    }
}

fn matches_filter(segments: &[String], filter: &[String]) -> bool {
    filter.len() <= segments.len() && filter.iter().zip(segments).all(|(f, s)| eq_fold(f, s))
}

/// Build a tree from `/`-delimited pairs.
pub fn build_tree<I, K, V>(pairs: I, root: &str, filters: &[&str]) -> Result<PathNode, TreefigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    TreeBuilder::new(root).filters(filters).build(pairs)
}

/// Build a tree from dotted labels (`root.foo[0].bar`).
pub fn build_label_tree<I, K, V>(labels: I, root: &str) -> Result<PathNode, TreefigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    TreeBuilder::new(root).delimiter('.').build(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(name: &str, value: &str) -> PathNode {
        PathNode::leaf(name, value)
    }

    fn branch(name: &str, children: Vec<PathNode>) -> PathNode {
        PathNode::new(name).with_children(children)
    }

    #[test]
    fn builds_levels() {
        let tree = build_tree(
            [
                ("app/foo/aaa", "bar"),
                ("app/foo/bbb", "bur"),
                ("app/fii", "bir"),
                ("app/fuu/ccc/ddd", "bor"),
            ],
            "app",
            &[],
        )
        .unwrap();

        let expected = branch(
            "app",
            vec![
                leaf("fii", "bir"),
                branch("foo", vec![leaf("aaa", "bar"), leaf("bbb", "bur")]),
                branch("fuu", vec![branch("ccc", vec![leaf("ddd", "bor")])]),
            ],
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn merges_case_insensitively_first_casing_wins() {
        let tree = build_tree(
            [("app/foo/aaa", "bar"), ("app/Foo/bbb", "bur")],
            "app",
            &[],
        )
        .unwrap();

        assert_eq!(
            tree,
            branch(
                "app",
                vec![branch("foo", vec![leaf("aaa", "bar"), leaf("bbb", "bur")])]
            )
        );
    }

    #[test]
    fn bare_integers_become_index_nodes() {
        let tree = build_tree(
            [
                ("app/foo/1/aaa", "bar1"),
                ("app/foo/0/aaa", "bar0"),
                ("app/foo/0/bbb", "bur0"),
            ],
            "app",
            &[],
        )
        .unwrap();

        assert_eq!(
            tree,
            branch(
                "app",
                vec![branch(
                    "foo",
                    vec![
                        branch("[0]", vec![leaf("aaa", "bar0"), leaf("bbb", "bur0")]),
                        branch("[1]", vec![leaf("aaa", "bar1")]),
                    ]
                )]
            )
        );
    }

    #[test]
    fn slash_and_label_forms_build_the_same_tree() {
        let slash = build_tree(
            [("app/foo/0/aaa", "bar"), ("app/foo/1/aaa", "baz")],
            "app",
            &[],
        )
        .unwrap();
        let labels = build_label_tree(
            [("app.foo[0].aaa", "bar"), ("app.foo[1].aaa", "baz")],
            "app",
        )
        .unwrap();
        assert_eq!(slash, labels);
    }

    #[test]
    fn index_nodes_sort_after_names_numerically() {
        let tree = build_tree(
            [("r/m/10", "x"), ("r/m/b", "y"), ("r/m/2", "z"), ("r/m/A", "w")],
            "r",
            &[],
        )
        .unwrap();
        let names: Vec<_> = tree.children[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "b", "[2]", "[10]"]);
    }

    #[test]
    fn ordering_is_independent_of_input_order() {
        let pairs = [("r/b/x", "1"), ("r/a", "2"), ("r/B/y", "3"), ("r/c/0", "4")];
        let mut reversed = pairs;
        reversed.reverse();
        let a = build_tree(pairs, "r", &[]).unwrap();
        let b = build_tree(reversed, "r", &[]).unwrap();
        let names = |t: &PathNode| -> Vec<String> { t.children.iter().map(|c| c.name.to_lowercase()).collect() };
        assert_eq!(names(&a), names(&b));
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn filters_admit_matching_subtrees() {
        let tree = build_tree(
            [
                ("app/foo/aaa", "bar"),
                ("app/Foo/bbb", "bur"),
                ("app/fii", "bir"),
                ("app/foobar", "no"),
            ],
            "app",
            &["app/Foo"],
        )
        .unwrap();

        assert_eq!(
            tree,
            branch(
                "app",
                vec![branch("foo", vec![leaf("aaa", "bar"), leaf("bbb", "bur")])]
            )
        );
    }

    #[test]
    fn unmatched_filters_yield_bare_root() {
        let tree = build_tree([("app/foo", "bar")], "app", &["app/nope"]).unwrap();
        assert_eq!(tree, PathNode::new("app"));

        let tree = build_tree([("app/foo", "bar")], "app", &["other/foo"]).unwrap();
        assert_eq!(tree, PathNode::new("app"));
    }

    #[test]
    fn other_roots_are_dropped() {
        let tree = build_tree([("other/foo", "x"), ("app/foo", "y")], "app", &[]).unwrap();
        assert_eq!(tree, branch("app", vec![leaf("foo", "y")]));
    }

    #[test]
    fn empty_input_is_bare_root() {
        let pairs: [(&str, &str); 0] = [];
        assert_eq!(build_tree(pairs, "app", &[]).unwrap(), PathNode::new("app"));
    }

    #[test]
    fn value_on_root_is_an_error() {
        let err = build_tree([("app", "bar"), ("app/foo", "x")], "app", &[]).unwrap_err();
        assert!(matches!(err, TreefigError::TreeBuild { .. }));
        assert_eq!(err.path(), Some("app"));
    }

    #[test]
    fn root_with_other_casing_is_an_error() {
        let err = build_tree([("app/foo", "x"), ("App/bar", "y")], "app", &[]).unwrap_err();
        assert_eq!(err.path(), Some("App/bar"));
    }

    #[test]
    fn malformed_segments_are_errors() {
        for path in ["app/foo//bar", "app/foo[0", "app/foo]", "app/foo[x]", "app/"] {
            let err = build_tree([(path, "v")], "app", &[]).unwrap_err();
            assert_eq!(err.path(), Some(path), "for {path}");
        }
    }

    #[test]
    fn last_value_wins() {
        let tree = build_tree([("r/a", "1"), ("r/A", "2")], "r", &[]).unwrap();
        assert_eq!(tree, branch("r", vec![leaf("a", "2")]));
    }

    #[test]
    fn node_can_be_leaf_and_branch() {
        let tree = build_tree([("r/a/b", "x"), ("r/a/b/c", "y")], "r", &[]).unwrap();
        let b = &tree.children[0].children[0];
        assert_eq!(b.value.as_deref(), Some("x"));
        assert_eq!(b.children, vec![leaf("c", "y")]);
    }

    #[test]
    fn custom_delimiter() {
        let tree = TreeBuilder::new("treefig")
            .delimiter('_')
            .build([("treefig_server_ftp_host", "localhost")])
            .unwrap();
        assert_eq!(
            tree,
            branch(
                "treefig",
                vec![branch("server", vec![branch("ftp", vec![leaf("host", "localhost")])])]
            )
        );
    }
}

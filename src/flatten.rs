//! Flatten a [`PathNode`] tree into named entries.
//!
//! The same encoded tree can be spelled several ways; a [`Flattener`]
//! decides how:
//!
//! | Preset | Example | Used by |
//! |--------|---------|---------|
//! | [`env`](Flattener::env) | `TREEFIG_SERVER_FTP_SOURCES_0` | env listings |
//! | [`labels`](Flattener::labels) | `treefig.server.ftp.sources[0]` | [`to_labels`] |
//! | [`flags`](Flattener::flags) | `server.ftp.sources[0]` | flag listings |
//! | [`kv`](Flattener::kv) | `treefig/server/ftp/sources/0` | KV export |

use std::collections::BTreeMap;

use serde::Serialize;

use crate::node::PathNode;
use crate::path::SEQUENCE_INDEX_PLACEHOLDER;
use crate::types::IndexStyle;

/// One row of a listing: a fully-qualified name, its default and the
/// description of the field it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flat {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattener {
    include_root: bool,
    delimiter: String,
    uppercase: bool,
    index_style: IndexStyle,
}

impl Flattener {
    /// `ROOT_SEG_0_SEG`
    pub fn env() -> Self {
        Self {
            include_root: true,
            delimiter: "_".into(),
            uppercase: true,
            index_style: IndexStyle::Bare,
        }
    }

    /// `root.seg[0].seg`
    pub fn labels() -> Self {
        Self {
            include_root: true,
            delimiter: ".".into(),
            uppercase: false,
            index_style: IndexStyle::Suffix,
        }
    }

    /// `seg[0].seg`, the root left out.
    pub fn flags() -> Self {
        Self {
            include_root: false,
            ..Self::labels()
        }
    }

    /// `root/seg/0/seg`
    pub fn kv() -> Self {
        Self {
            include_root: true,
            delimiter: "/".into(),
            uppercase: false,
            index_style: IndexStyle::Bare,
        }
    }

    pub fn include_root(mut self, include: bool) -> Self {
        self.include_root = include;
        self
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    pub fn uppercase(mut self, uppercase: bool) -> Self {
        self.uppercase = uppercase;
        self
    }

    pub fn index_style(mut self, style: IndexStyle) -> Self {
        self.index_style = style;
        self
    }

    /// Every enabled node below the root that carries a value, sorted
    /// case-insensitively by name.
    pub fn flatten(&self, root: &PathNode) -> Vec<Flat> {
        let mut out = Vec::new();
        self.walk(root, &self.root_name(root), &mut |name: &str, node: &PathNode| {
            if let Some(value) = &node.value {
                out.push(Flat {
                    name: name.to_string(),
                    description: node.description.clone(),
                    default: value.clone(),
                });
            }
        });
        out.sort_by_cached_key(|flat| flat.name.to_lowercase());
        out
    }

    /// `(name, value)` for every enabled leaf below the root, in tree order.
    pub fn leaves(&self, root: &PathNode) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.walk(root, &self.root_name(root), &mut |name: &str, node: &PathNode| {
            if let (Some(value), true) = (&node.value, node.children.is_empty()) {
                out.push((name.to_string(), value.clone()));
            }
        });
        out
    }

    fn root_name(&self, root: &PathNode) -> String {
        if self.include_root {
            self.segment(&root.name)
        } else {
            String::new()
        }
    }

    fn walk(&self, node: &PathNode, prefix: &str, visit: &mut dyn FnMut(&str, &PathNode)) {
        for child in node.children.iter().filter(|c| !c.disabled) {
            let name = self.join(prefix, child);
            visit(&name, child);
            self.walk(child, &name, visit);
        }
    }

    fn join(&self, prefix: &str, child: &PathNode) -> String {
        match (child.index(), self.index_style) {
            (Some(_), IndexStyle::Suffix) => format!("{prefix}{}", child.name),
            (Some(index), IndexStyle::Bare) if prefix.is_empty() => index.to_string(),
            (Some(index), IndexStyle::Bare) => format!("{prefix}{}{index}", self.delimiter),
            (None, IndexStyle::Suffix) if child.name == SEQUENCE_INDEX_PLACEHOLDER => {
                format!("{prefix}[{}]", child.name)
            }
            (None, _) if prefix.is_empty() => self.segment(&child.name),
            (None, _) => format!("{prefix}{}{}", self.delimiter, self.segment(&child.name)),
        }
    }

    fn segment(&self, name: &str) -> String {
        if self.uppercase {
            name.to_uppercase()
        } else {
            name.to_string()
        }
    }
}

/// Leaf values of `node` keyed by their dotted label (`root.foo[0].bar`).
pub fn to_labels(node: &PathNode) -> BTreeMap<String, String> {
    Flattener::labels().leaves(node).into_iter().collect()
}

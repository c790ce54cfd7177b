//! Untyped configuration values.
//!
//! A [`RawValue`] field takes whatever subtree a source puts under it:
//! plain values become [`Leaf`](RawValue::Leaf)s, named children a
//! [`Map`](RawValue::Map), `[N]` children a [`List`](RawValue::List).
//!
//! ```ignore
//! #[derive(Default)]
//! struct Plugin {
//!     name: String,
//!     settings: BTreeMap<String, RawValue>,
//! }
//!
//! treefig::record!(Plugin { name, settings });
//! ```
//!
//! Given `plugin.settings.retry.max=3` and `plugin.settings.hosts[0].name=a`,
//! `settings` holds `{"retry": {"max": "3"}, "hosts": [{"name": "a"}]}`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::shape::{Configurable, ShapeMut, ShapeRef};

/// A subtree whose structure comes from the data, not from a Rust type.
///
/// Leaves stay strings; nothing is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Nothing was written here, such as a skipped index in a list.
    #[default]
    Null,
    Leaf(String),
    Map(BTreeMap<String, RawValue>),
    List(Vec<RawValue>),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Leaf(s) => Some(s),
            _ => None,
        }
    }

    /// The entry for `key` when this is a map.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        match self {
            RawValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// The element at `index` when this is a list.
    pub fn at(&self, index: usize) -> Option<&RawValue> {
        match self {
            RawValue::List(items) => items.get(index),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Leaf(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Leaf(value)
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(items: Vec<RawValue>) -> Self {
        RawValue::List(items)
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawValue {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        RawValue::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Configurable for RawValue {
    fn shape(&self) -> ShapeRef<'_> {
        ShapeRef::Raw(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Raw(self)
    }
}

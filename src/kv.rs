//! Key/value store listings as a configuration source.
//!
//! Stores such as Consul, etcd or ZooKeeper hand back `(key, value)` pairs
//! with `/`-delimited keys. The client side is up to the caller; this module
//! only turns a fetched listing into a value and back.
//!
//! ```text
//! app/server/ftp/host = ftp.example.com
//! app/server/ftp/sources/0 = /src1
//! app/server/ftp/sources/1 = /src2
//! ```

use tracing::debug;

use crate::decode;
use crate::encode::encode_to_node;
use crate::error::TreefigError;
use crate::flatten::Flattener;
use crate::shape::Configurable;
use crate::tree::build_tree;
use crate::types::EncodeMode;

/// Decode a listing rooted at `root` into `target`.
///
/// `filters` (`root/seg/...`) restrict which subtrees are read. Returns
/// whether anything under the root was admitted.
pub fn decode<I, K, V>(
    pairs: I,
    root: &str,
    filters: &[&str],
    target: &mut dyn Configurable,
) -> Result<bool, TreefigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let tree = build_tree(pairs, root, filters)?;
    if tree.children.is_empty() {
        return Ok(false);
    }
    debug!(root, nodes = tree.len(), "decoding key/value listing");
    decode::decode(&tree, target)?;
    Ok(true)
}

/// Export what `value` actually holds as `/`-delimited pairs under `root`,
/// ready to be written to a store.
pub fn encode(root: &str, value: &dyn Configurable) -> Vec<(String, String)> {
    Flattener::kv().leaves(&encode_to_node(root, value, EncodeMode::Data))
}

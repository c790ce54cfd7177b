//! Command-line flags as a configuration source.
//!
//! Flags use the dotted label form, without the root:
//!
//! ```text
//! --server.ftp.host=ftp.example.com
//! --server.ftp.sources=/src1,/src2
//! --server.ftp.sources[0]=/src1
//! --server.ftp.disableEPSV          (same as =true)
//! ```
//!
//! A single leading dash works too. `--` ends flag parsing; everything after
//! it is left alone. Anything else that is not a flag is an error.

use tracing::debug;

use crate::DEFAULT_ROOT_NAME;
use crate::decode::decode_labels;
use crate::encode::encode_to_node;
use crate::error::TreefigError;
use crate::flatten::{Flat, Flattener};
use crate::shape::Configurable;
use crate::types::EncodeMode;

/// Split `args` into `(name, value)` pairs.
pub fn parse<I, S>(args: I) -> Result<Vec<(String, String)>, TreefigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pairs = Vec::new();
    for arg in args {
        let arg = arg.as_ref();
        if arg == "--" {
            break;
        }
        let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
            return Err(TreefigError::InvalidFlag(arg.to_string()));
        };
        let (name, value) = flag.split_once('=').unwrap_or((flag, "true"));
        if name.is_empty() || name.starts_with('-') {
            return Err(TreefigError::InvalidFlag(arg.to_string()));
        }
        pairs.push((name.to_string(), value.to_string()));
    }
    Ok(pairs)
}

/// Decode flag arguments into `target`.
///
/// Returns whether at least one flag was given.
pub fn decode<I, S>(args: I, target: &mut dyn Configurable) -> Result<bool, TreefigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pairs = parse(args)?;
    decode_pairs(pairs, target)
}

/// Decode already-split `(name, value)` pairs, names in flag form.
pub fn decode_pairs(pairs: Vec<(String, String)>, target: &mut dyn Configurable) -> Result<bool, TreefigError> {
    if pairs.is_empty() {
        return Ok(false);
    }
    debug!(count = pairs.len(), "decoding flags");
    let labels = pairs
        .into_iter()
        .map(|(name, value)| (format!("{DEFAULT_ROOT_NAME}.{name}"), value));
    decode_labels(labels, DEFAULT_ROOT_NAME, target)?;
    Ok(true)
}

/// The flags `value` would read, with their defaults and descriptions.
pub fn encode(value: &dyn Configurable) -> Vec<Flat> {
    Flattener::flags().flatten(&encode_to_node(DEFAULT_ROOT_NAME, value, EncodeMode::Schema))
}

//! Environment variables as a configuration source.
//!
//! With prefix `TREEFIG_`, variables map through single underscores:
//!
//! | Env var | Config path |
//! |---------|-------------|
//! | `TREEFIG_LOGLEVEL` | `logLevel` |
//! | `TREEFIG_SERVER_FTP_HOST` | `server.ftp.host` |
//! | `TREEFIG_SERVER_FTP_SOURCES_0` | `server.ftp.sources[0]` |
//! | `TREEFIG_SERVER_FTP_SOURCES` | `server.ftp.sources` (comma-separated) |
//!
//! Segments are lower-cased before decoding; field matching is
//! case-insensitive, so camelCase field names still match. Map keys arrive
//! lower-cased.
//!
//! Every function takes the variables as an iterator so tests can pass
//! synthetic data. [`process_vars`] reads the real environment.

use std::ffi::OsString;

use tracing::{debug, trace};

use crate::DEFAULT_ROOT_NAME;
use crate::decode;
use crate::error::TreefigError;
use crate::flatten::Flat;
use crate::path::{root_prefixes, starts_with_fold};
use crate::shape::Configurable;
use crate::tree::TreeBuilder;

/// Decode every variable relevant to `target` into it.
///
/// Returns whether at least one variable matched.
pub fn decode<I>(vars: I, prefix: &str, target: &mut dyn Configurable) -> Result<bool, TreefigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let matched = find_prefixed_vars(vars, prefix, target);
    if matched.is_empty() {
        return Ok(false);
    }
    debug!(prefix, count = matched.len(), "decoding environment variables");

    let pairs = matched.into_iter().map(|(name, value)| {
        let rest = name.get(prefix.len()..).unwrap_or_default();
        (format!("{DEFAULT_ROOT_NAME}_{}", rest.to_lowercase()), value)
    });
    let tree = TreeBuilder::new(DEFAULT_ROOT_NAME).delimiter('_').build(pairs)?;
    decode::decode(&tree, target)?;
    Ok(true)
}

/// The variables `value` would read, with their defaults and descriptions.
///
/// Names are upper-cased and joined with `_` after `prefix`; mappings show a
/// `<NAME>` placeholder.
pub fn encode(prefix: &str, value: &dyn Configurable) -> Vec<Flat> {
    crate::encode::encode(prefix.trim_end_matches('_'), value)
}

/// The process environment, skipping variables whose name or value is not
/// valid UTF-8.
pub fn process_vars() -> impl Iterator<Item = (String, String)> {
    utf8_vars(std::env::vars_os())
}

fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter().filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
        (Ok(name), Ok(value)) => Some((name, value)),
        (Ok(name), Err(_)) => {
            trace!(%name, "skipping environment variable with a non UTF-8 value");
            None
        }
        (Err(name), _) => {
            trace!(name = %name.to_string_lossy(), "skipping environment variable with a non UTF-8 name");
            None
        }
    })
}

/// The variables whose name starts (case-insensitively) with one of the
/// root prefixes of `value`.
pub fn find_prefixed_vars<I>(vars: I, prefix: &str, value: &dyn Configurable) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let prefixes = root_prefixes(value, prefix);
    vars.into_iter()
        .filter(|(name, _)| prefixes.iter().any(|p| starts_with_fold(name, p)))
        .collect()
}

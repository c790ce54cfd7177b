//! Transcode flat path/value pairs to and from typed configuration values.
//!
//! Environment variables, command-line flags, key/value store listings and
//! config files all describe the same thing: a set of paths, each with a
//! string value. Treefig turns any of them into an intermediate
//! [`PathNode`] tree, then decodes that tree into any value that implements
//! [`Configurable`]. The reverse direction encodes a value into a tree and
//! flattens it back into names, which is how reference listings of
//! environment variables and flags are produced.
//!
//! ```ignore
//! #[derive(Default)]
//! struct Config {
//!     log_level: String,
//!     server: Server,
//! }
//!
//! treefig::record!(Config {
//!     log_level => "Log verbosity",
//!     server,
//! });
//!
//! let config: Config = Treefig::builder()
//!     .app_name("myapp")
//!     .load()?;
//! ```
//!
//! That call looks for `./myapp.toml` (or `.json`, `.yaml`, `.yml`) and the
//! platform config directory, then layers `MYAPP_*` environment variables
//! and flags on top.
//!
//! # Shapes
//!
//! A configuration is described by six shapes, exposed through
//! [`Configurable::shape`]:
//!
//! | Shape | Rust types | Written as |
//! |-------|-----------|------------|
//! | scalar | numbers, `bool`, `String`, `Duration`, [`scalar!`] types | a single value |
//! | optional | `Option<T>` | allocated when anything below it is set |
//! | sequence | `Vec<T>` | `[N]` children, or `a,b,c` for scalar elements |
//! | mapping | `BTreeMap<String, T>`, `HashMap<String, T>` | one child per key |
//! | record | structs registered with [`record!`] | one child per field |
//! | raw | [`RawValue`] | any subtree, kept as strings |
//!
//! Field names default to lowerCamelCase of the Rust identifier and are
//! matched case-insensitively.
//!
//! # Sources
//!
//! | Source | Module | Example |
//! |--------|--------|---------|
//! | environment | [`env`] | `MYAPP_SERVER_FTP_HOST=localhost` |
//! | flags | [`flag`] | `--server.ftp.host=localhost` |
//! | key/value store | [`kv`] | `myapp/server/ftp/host = localhost` |
//! | config file | [`file`] | `[server.ftp]` / `host = "localhost"` (TOML, YAML, JSON) |
//!
//! Each source is also available as a [`Loader`], and [`TreefigBuilder`]
//! runs them in order: file, environment, flags, extra loaders, then
//! explicit [`set`](TreefigBuilder::set) overrides. Every layer is sparse;
//! paths a source does not mention keep their current value.
//!
//! # Logging
//!
//! Treefig emits [`tracing`] events: `debug` when a source is read, `trace`
//! when input is dropped because nothing in the target matches it. No
//! subscriber is installed.
//!
//! # Clap adapter
//!
//! With the `clap` feature (on by default), [`ConfigArgs`] adds
//! `--config-file`, repeatable `--set key=value` and `show|env|flags`
//! subcommands to a clap CLI.

pub mod error;
pub mod types;

pub mod decode;
pub mod encode;
pub mod env;
pub mod file;
pub mod flag;
pub mod flatten;
pub mod kv;
pub mod node;
pub mod path;
pub mod raw;
pub mod shape;
pub mod tree;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod listing;
mod loader;

#[cfg(test)]
mod fixtures;

/// Root segment used when a source has no root of its own (flags, files).
pub const DEFAULT_ROOT_NAME: &str = "treefig";

/// Environment variable prefix used when no app name or prefix is given.
pub const DEFAULT_ENV_PREFIX: &str = "TREEFIG_";

pub use builder::{LoadReport, Treefig, TreefigBuilder};
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
pub use error::TreefigError;
pub use file::{Finder, Format};
pub use flatten::{Flat, Flattener};
pub use listing::{ConfigResult, Listing};
pub use loader::{EnvLoader, FileLoader, FlagLoader, KvLoader, Loader};
pub use node::PathNode;
pub use path::{MAP_NAME_PLACEHOLDER, MAX_SEQUENCE_LEN, SEQUENCE_INDEX_PLACEHOLDER, SEQUENCE_SEPARATOR};
pub use raw::RawValue;
pub use shape::{
    Configurable, FieldMeta, MappingValue, OptionalValue, RecordValue, ScalarValue, SequenceValue,
    ShapeKind, ShapeMut, ShapeRef,
};
pub use tree::TreeBuilder;
pub use types::{ConfigAction, EncodeMode, IndexStyle};

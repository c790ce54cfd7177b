//! Config files as a configuration source.
//!
//! A file is parsed into a [`PathNode`] tree rooted at
//! [`DEFAULT_ROOT_NAME`](crate::DEFAULT_ROOT_NAME) and decoded like any other
//! source. Tables become sections, arrays become `[N]` children, and every
//! scalar is rendered back to a string for the field to parse:
//!
//! ```toml
//! logLevel = "info"
//! [server.ftp]            # an empty table still allocates the section
//! sources = ["/src1", "/src2"]
//! ```
//!
//! TOML, YAML (`.yaml`, `.yml`) and JSON are supported. A `null` in YAML or
//! JSON is treated as an absent key.
//!
//! # Discovery
//!
//! [`Finder`] locates the file to read. An explicit path always wins; when it
//! does not exist, nothing is found. Otherwise every base path is tried with
//! every extension, in order, and the first existing file is used. Base paths
//! may contain `$VAR`, `${VAR}` and a leading `~`, expanded only when looking
//! for the file.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::DEFAULT_ROOT_NAME;
use crate::decode;
use crate::error::TreefigError;
use crate::node::PathNode;
use crate::path::index_name;
use crate::shape::Configurable;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, TreefigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Ok(Format::Toml),
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(TreefigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Parse `content` into a tree rooted at `root`.
///
/// `origin` only names the content in parse errors.
pub fn parse(content: &str, format: Format, root: &str, origin: &Path) -> Result<PathNode, TreefigError> {
    let mut node = match format {
        Format::Toml => {
            let table: toml::Table = toml::from_str(content).map_err(|source| TreefigError::TomlParse {
                path: origin.to_path_buf(),
                source,
            })?;
            toml_node(root.to_string(), &toml::Value::Table(table))
        }
        Format::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|source| TreefigError::YamlParse {
                    path: origin.to_path_buf(),
                    source,
                })?;
            yaml_node(root.to_string(), &value).unwrap_or_else(|| PathNode::new(root))
        }
        Format::Json => {
            let value: serde_json::Value =
                serde_json::from_str(content).map_err(|source| TreefigError::JsonParse {
                    path: origin.to_path_buf(),
                    source,
                })?;
            json_node(root.to_string(), &value).unwrap_or_else(|| PathNode::new(root))
        }
    };
    node.sort();
    Ok(node)
}

/// Decode in-memory `content` into `target`.
pub fn decode_content(content: &str, format: Format, target: &mut dyn Configurable) -> Result<(), TreefigError> {
    let tree = parse(content, format, DEFAULT_ROOT_NAME, Path::new("<content>"))?;
    decode::decode(&tree, target)
}

/// Read and decode the file at `path` into `target`. The format comes from
/// the extension.
pub fn decode_file(path: &Path, target: &mut dyn Configurable) -> Result<(), TreefigError> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| TreefigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), ?format, "decoding config file");
    let tree = parse(&content, format, DEFAULT_ROOT_NAME, path)?;
    decode::decode(&tree, target)
}

fn toml_node(name: String, value: &toml::Value) -> PathNode {
    use toml::Value;

    match value {
        Value::Table(table) => PathNode::new(name).with_children(
            table
                .iter()
                .map(|(key, value)| toml_node(key.clone(), value))
                .collect(),
        ),
        Value::Array(items) if items.is_empty() => PathNode::leaf(name, ""),
        Value::Array(items) => PathNode::new(name).with_children(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| toml_node(index_name(i), item))
                .collect(),
        ),
        Value::String(s) => PathNode::leaf(name, s.as_str()),
        Value::Integer(i) => PathNode::leaf(name, i.to_string()),
        Value::Float(f) => PathNode::leaf(name, f.to_string()),
        Value::Boolean(b) => PathNode::leaf(name, b.to_string()),
        Value::Datetime(d) => PathNode::leaf(name, d.to_string()),
    }
}

fn json_node(name: String, value: &serde_json::Value) -> Option<PathNode> {
    use serde_json::Value;

    let node = match value {
        Value::Null => return None,
        Value::Object(map) => PathNode::new(name).with_children(
            map.iter()
                .filter_map(|(key, value)| json_node(key.clone(), value))
                .collect(),
        ),
        Value::Array(items) if items.is_empty() => PathNode::leaf(name, ""),
        Value::Array(items) => PathNode::new(name).with_children(
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| json_node(index_name(i), item))
                .collect(),
        ),
        Value::String(s) => PathNode::leaf(name, s.as_str()),
        Value::Number(n) => PathNode::leaf(name, n.to_string()),
        Value::Bool(b) => PathNode::leaf(name, b.to_string()),
    };
    Some(node)
}

fn yaml_node(name: String, value: &serde_yaml::Value) -> Option<PathNode> {
    use serde_yaml::Value;

    let node = match value {
        Value::Null => return None,
        Value::Mapping(map) => PathNode::new(name).with_children(
            map.iter()
                .filter_map(|(key, value)| match yaml_key(key) {
                    Some(key) => yaml_node(key, value),
                    None => {
                        trace!(?key, "skipping YAML key that is not a scalar");
                        None
                    }
                })
                .collect(),
        ),
        Value::Sequence(items) if items.is_empty() => PathNode::leaf(name, ""),
        Value::Sequence(items) => PathNode::new(name).with_children(
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| yaml_node(index_name(i), item))
                .collect(),
        ),
        Value::String(s) => PathNode::leaf(name, s.as_str()),
        Value::Number(n) => PathNode::leaf(name, n.to_string()),
        Value::Bool(b) => PathNode::leaf(name, b.to_string()),
        Value::Tagged(tagged) => return yaml_node(name, &tagged.value),
    };
    Some(node)
}

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Locates the config file to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finder {
    file: Option<PathBuf>,
    base_paths: Vec<String>,
    extensions: Vec<String>,
}

impl Default for Finder {
    fn default() -> Self {
        Self {
            file: None,
            base_paths: Vec::new(),
            extensions: vec!["toml".into(), "json".into(), "yaml".into(), "yml".into()],
        }
    }
}

impl Finder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An explicit file. When set, base paths are not searched.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Replace the base paths: file stems without extension, such as
    /// `/etc/myapp/config` or `$HOME/.config/myapp`.
    pub fn base_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.base_paths.push(path.into());
        self
    }

    /// Replace the extensions tried for each base path, in order.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Add `{platform config dir}/{file_stem}` as a base path, e.g.
    /// `~/.config/myapp/config` on Linux. Does nothing when the platform
    /// has no config directory.
    pub fn platform(mut self, app_name: &str, file_stem: &str) -> Self {
        if let Some(proj) = directories::ProjectDirs::from("", "", app_name) {
            let stem = proj.config_dir().join(file_stem);
            self.base_paths.push(stem.to_string_lossy().into_owned());
        }
        self
    }

    /// Every path that would be checked, in order, before expansion.
    pub fn candidates(&self) -> Vec<String> {
        if let Some(file) = &self.file {
            return vec![file.to_string_lossy().into_owned()];
        }
        self.base_paths
            .iter()
            .flat_map(|base| self.extensions.iter().map(move |ext| format!("{base}.{ext}")))
            .collect()
    }

    /// The first candidate that exists as a file.
    ///
    /// Missing files are skipped; other I/O errors are returned.
    pub fn find(&self) -> Result<Option<PathBuf>, TreefigError> {
        for candidate in self.candidates() {
            let path = expand_path(&candidate);
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {
                    debug!(path = %path.display(), "found config file");
                    return Ok(Some(path));
                }
                Ok(_) => trace!(path = %path.display(), "not a file, skipping"),
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                    ) =>
                {
                    trace!(path = %path.display(), "no config file here");
                }
                Err(source) => return Err(TreefigError::IoError { path, source }),
            }
        }
        Ok(None)
    }
}

/// Expand `$VAR`, `${VAR}` and a leading `~` using the process environment
/// and the user's home directory. Unknown variables expand to nothing.
pub fn expand_path(raw: &str) -> PathBuf {
    let home = directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    expand_with(raw, |name| std::env::var(name).ok(), home.as_deref())
}

fn expand_with(raw: &str, lookup: impl Fn(&str) -> Option<String>, home: Option<&Path>) -> PathBuf {
    let raw = match (raw.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{rest}", home.display())
        }
        _ => raw.to_string(),
    };

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw.as_str();
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (name, consumed) = match after.strip_prefix('{') {
            Some(braced) => match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            },
            None => {
                let len = after
                    .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                    .unwrap_or(after.len());
                (&after[..len], len)
            }
        };
        if name.is_empty() {
            out.push('$');
            rest = after;
            continue;
        }
        if let Some(value) = lookup(name) {
            out.push_str(&value);
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);
    PathBuf::from(out)
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreefigError {
    #[error("Cannot build tree from '{path}': {reason}")]
    TreeBuild { path: String, reason: String },

    #[error("Failed to decode '{path}'{}: {reason}", value_suffix(.value))]
    Decode {
        path: String,
        value: Option<String>,
        reason: String,
    },

    #[error("Unsupported shape at '{path}': {reason}")]
    UnsupportedShape { path: String, reason: String },

    #[error("Invalid flag '{0}': expected --name=value or --name")]
    InvalidFlag(String),

    #[error("Unsupported config file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Failed to parse {}: {source}", path.display())]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn value_suffix(value: &Option<String>) -> String {
    match value {
        Some(v) => format!(" from '{v}'"),
        None => String::new(),
    }
}

impl TreefigError {
    pub(crate) fn tree(path: impl Into<String>, reason: impl Into<String>) -> Self {
        TreefigError::TreeBuild {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The fully-qualified path the error refers to, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            TreefigError::TreeBuild { path, .. }
            | TreefigError::Decode { path, .. }
            | TreefigError::UnsupportedShape { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_carries_path_and_value() {
        let err = TreefigError::Decode {
            path: "treefig.server.ftp.port".into(),
            value: Some("abc".into()),
            reason: "invalid digit found in string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("treefig.server.ftp.port"));
        assert!(msg.contains("'abc'"));
        assert_eq!(err.path(), Some("treefig.server.ftp.port"));
    }

    #[test]
    fn decode_error_without_value_formats() {
        let err = TreefigError::Decode {
            path: "treefig.host".into(),
            value: None,
            reason: "expected a value, found children".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to decode 'treefig.host': expected a value, found children"
        );
    }

    #[test]
    fn tree_build_formats() {
        let err = TreefigError::tree("app/foo//bar", "empty segment");
        assert!(err.to_string().contains("app/foo//bar"));
        assert!(err.to_string().contains("empty segment"));
    }

    #[test]
    fn invalid_flag_has_no_path() {
        let err = TreefigError::InvalidFlag("positional".into());
        assert!(err.path().is_none());
        assert!(err.to_string().contains("positional"));
    }
}

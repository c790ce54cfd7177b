//! Printable results of config operations.

use std::fmt;

use serde::Serialize;

use crate::flatten::Flat;

/// A reference listing of the names a configuration reads, each with its
/// default and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    #[serde(skip)]
    name_prefix: &'static str,
    pub entries: Vec<Flat>,
}

impl Listing {
    /// Environment variables, rendered as `NAME=default`.
    pub fn env(entries: Vec<Flat>) -> Self {
        Self {
            name_prefix: "",
            entries,
        }
    }

    /// Flags, rendered as `--name=default`.
    pub fn flags(entries: Vec<Flat>) -> Self {
        Self {
            name_prefix: "--",
            entries,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            if let Some(description) = &entry.description {
                for line in description.lines() {
                    writeln!(f, "# {line}")?;
                }
            }
            writeln!(f, "{}{}={}", self.name_prefix, entry.name, entry.default)?;
        }
        Ok(())
    }
}

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigResult {
    /// Environment variables the configuration reads.
    Env(Listing),
    /// Flags the configuration reads.
    Flags(Listing),
    /// The loaded configuration as `(name, value)` pairs.
    Values(Vec<(String, String)>),
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Env(listing) | ConfigResult::Flags(listing) => write!(f, "{listing}"),
            ConfigResult::Values(values) => {
                for (name, value) in values {
                    writeln!(f, "{name} = {value}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries() -> Vec<Flat> {
        vec![
            Flat {
                name: "TREEFIG_HOST".into(),
                description: Some("Server host".into()),
                default: "localhost".into(),
            },
            Flat {
                name: "TREEFIG_PORT".into(),
                description: None,
                default: "21".into(),
            },
        ]
    }

    #[test]
    fn env_listing_renders_comments() {
        assert_eq!(
            Listing::env(entries()).to_string(),
            "# Server host\nTREEFIG_HOST=localhost\nTREEFIG_PORT=21\n"
        );
    }

    #[test]
    fn flags_listing_prefixes_names() {
        let listing = Listing::flags(vec![Flat {
            name: "server.ftp.host".into(),
            description: None,
            default: String::new(),
        }]);
        assert_eq!(ConfigResult::Flags(listing).to_string(), "--server.ftp.host=\n");
    }

    #[test]
    fn values_display() {
        let result = ConfigResult::Values(vec![
            ("logLevel".into(), "info".into()),
            ("server.ftp.port".into(), "21".into()),
        ]);
        assert_eq!(result.to_string(), "logLevel = info\nserver.ftp.port = 21\n");
    }

    #[test]
    fn listing_serializes_entries() {
        let json = Listing::env(entries()).to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["name"], "TREEFIG_HOST");
        assert_eq!(parsed[0]["description"], "Server host");
        assert!(parsed[1].get("description").is_none());
    }
}

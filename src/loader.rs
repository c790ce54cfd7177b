//! Sources that can each populate a configuration value.
//!
//! A [`Loader`] reads one source and writes whatever it finds into the
//! target, leaving everything else alone. Running several loaders in a row
//! layers them: later loaders win for the paths they set.

use std::path::PathBuf;

use tracing::debug;

use crate::DEFAULT_ENV_PREFIX;
use crate::error::TreefigError;
use crate::file::{self, Finder};
use crate::shape::Configurable;
use crate::{env, flag, kv};

/// One configuration source.
pub trait Loader {
    /// Short name used in logs and load reports.
    fn name(&self) -> &str;

    /// Populate `target` from this source.
    ///
    /// Returns whether the source was present at all: a config file was
    /// found, a variable matched, a flag was given.
    fn load(&self, target: &mut dyn Configurable) -> Result<bool, TreefigError>;
}

/// Reads the first config file a [`Finder`] locates.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    finder: Finder,
}

impl FileLoader {
    pub fn new(finder: Finder) -> Self {
        Self { finder }
    }

    /// The file that would be read, if any.
    pub fn path(&self) -> Result<Option<PathBuf>, TreefigError> {
        self.finder.find()
    }
}

impl Loader for FileLoader {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self, target: &mut dyn Configurable) -> Result<bool, TreefigError> {
        let Some(path) = self.finder.find()? else {
            debug!("no config file found");
            return Ok(false);
        };
        file::decode_file(&path, target)?;
        Ok(true)
    }
}

/// Reads prefixed environment variables.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: String,
    vars: Option<Vec<(String, String)>>,
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

impl EnvLoader {
    /// Read the process environment with `prefix` (e.g. `MYAPP_`).
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            vars: None,
        }
    }

    /// Read these variables instead of the process environment.
    pub fn vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Loader for EnvLoader {
    fn name(&self) -> &str {
        "env"
    }

    fn load(&self, target: &mut dyn Configurable) -> Result<bool, TreefigError> {
        match &self.vars {
            Some(vars) => env::decode(vars.iter().cloned(), &self.prefix, target),
            None => env::decode(env::process_vars(), &self.prefix, target),
        }
    }
}

/// Reads `--name=value` flags.
#[derive(Debug, Clone, Default)]
pub struct FlagLoader {
    pairs: Vec<(String, String)>,
}

impl FlagLoader {
    /// Tokenize `args` (program name already removed).
    pub fn new<I, S>(args: I) -> Result<Self, TreefigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            pairs: flag::parse(args)?,
        })
    }

    /// Already-split `(name, value)` pairs in flag form, such as
    /// `("server.ftp.host", "localhost")`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Loader for FlagLoader {
    fn name(&self) -> &str {
        "flags"
    }

    fn load(&self, target: &mut dyn Configurable) -> Result<bool, TreefigError> {
        flag::decode_pairs(self.pairs.clone(), target)
    }
}

/// Reads a key/value store listing fetched by the caller.
#[derive(Debug, Clone)]
pub struct KvLoader {
    root: String,
    pairs: Vec<(String, String)>,
    filters: Vec<String>,
}

impl KvLoader {
    pub fn new<I, K, V>(root: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            root: root.to_string(),
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            filters: Vec::new(),
        }
    }

    /// Only read the subtrees under these `root/seg/...` paths.
    pub fn filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }
}

impl Loader for KvLoader {
    fn name(&self) -> &str {
        "kv"
    }

    fn load(&self, target: &mut dyn Configurable) -> Result<bool, TreefigError> {
        let filters: Vec<&str> = self.filters.iter().map(String::as_str).collect();
        kv::decode(self.pairs.iter().cloned(), &self.root, &filters, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Config, Server, ServerFtp};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn ftp_server() -> Config {
        Config {
            server: Server {
                ftp: Some(ServerFtp {
                    host: "test.rebex.net".into(),
                    port: 21,
                    timeout: Duration::from_secs(5),
                    sources: vec!["/".into()],
                    ..ServerFtp::default()
                }),
            },
            ..Config::default()
        }
    }

    #[test]
    fn env_loader_without_vars_finds_nothing() {
        let loader = EnvLoader::default().vars(Vec::<(String, String)>::new());
        let mut config = Config::default();
        assert!(!loader.load(&mut config).unwrap());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn env_loader_ftp_server() {
        let loader = EnvLoader::default().vars([
            ("TREEFIG_SERVER_FTP_HOST", "test.rebex.net"),
            ("TREEFIG_SERVER_FTP_SOURCES", "/"),
        ]);
        let mut config = Config::default();
        assert!(loader.load(&mut config).unwrap());
        assert_eq!(config, ftp_server());
    }

    #[test]
    fn file_loader_without_file() {
        let dir = TempDir::new().unwrap();
        let loader = FileLoader::new(Finder::new().base_path(dir.path().join("missing").to_string_lossy()));
        let mut config = Config::default();
        assert!(!loader.load(&mut config).unwrap());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_loader_ftp_server() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "[server.ftp]\nhost = \"test.rebex.net\"\nsources = [\"/\"]\n").unwrap();

        let loader = FileLoader::new(Finder::new().file(&path));
        assert_eq!(loader.path().unwrap(), Some(path));
        let mut config = Config::default();
        assert!(loader.load(&mut config).unwrap());
        assert_eq!(config, ftp_server());
    }

    #[test]
    fn file_loader_reports_bad_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, "{ not json").unwrap();

        let loader = FileLoader::new(Finder::new().file(&path));
        let mut config = Config::default();
        assert!(matches!(
            loader.load(&mut config).unwrap_err(),
            TreefigError::JsonParse { .. }
        ));
    }

    #[test]
    fn flag_loader_ftp_server() {
        let loader = FlagLoader::new(["--server.ftp.host=test.rebex.net", "--server.ftp.sources=/"]).unwrap();
        let mut config = Config::default();
        assert!(loader.load(&mut config).unwrap());
        assert_eq!(config, ftp_server());
    }

    #[test]
    fn flag_loader_rejects_positionals() {
        assert!(FlagLoader::new(["serve"]).is_err());
    }

    #[test]
    fn kv_loader_ftp_server() {
        let loader = KvLoader::new(
            "app",
            [
                ("app/server/ftp/host", "test.rebex.net"),
                ("app/server/ftp/sources/0", "/"),
                ("app/logLevel", "debug"),
            ],
        )
        .filters(["app/server"]);
        let mut config = Config::default();
        assert!(loader.load(&mut config).unwrap());
        assert_eq!(config, ftp_server());
    }

    #[test]
    fn loaders_layer_in_order() {
        let loaders: Vec<Box<dyn Loader>> = vec![
            Box::new(EnvLoader::default().vars([("TREEFIG_SERVER_FTP_HOST", "from-env"), ("TREEFIG_LOGLEVEL", "info")])),
            Box::new(FlagLoader::from_pairs([("server.ftp.host", "from-flag")])),
        ];
        let mut config = Config::default();
        for loader in &loaders {
            loader.load(&mut config).unwrap();
        }
        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.ftp.unwrap().host, "from-flag");
    }
}

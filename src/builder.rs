use std::path::PathBuf;

use tracing::debug;

use crate::DEFAULT_ENV_PREFIX;
use crate::encode::encode_to_node;
use crate::error::TreefigError;
use crate::file::Finder;
use crate::flatten::Flattener;
use crate::listing::{ConfigResult, Listing};
use crate::loader::{EnvLoader, FileLoader, FlagLoader, Loader};
use crate::shape::Configurable;
use crate::types::{ConfigAction, EncodeMode};
use crate::{env, flag};

/// Entry point for building a treefig configuration.
pub struct Treefig;

impl Treefig {
    pub fn builder() -> TreefigBuilder {
        TreefigBuilder::new()
    }
}

/// Which sources a load actually found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// The config file that was read.
    pub file: Option<PathBuf>,
    /// Names of the loaders that found something, in the order they ran.
    pub found: Vec<String>,
}

impl LoadReport {
    pub fn found(&self, loader: &str) -> bool {
        self.found.iter().any(|name| name == loader)
    }
}

/// Builder for loading a configuration from layered sources.
///
/// Sources run in this order, each overriding the paths it sets:
///
/// 1. the config file located by a [`Finder`]
/// 2. environment variables
/// 3. flags
/// 4. extra loaders, in the order they were added
/// 5. [`set`](Self::set) overrides
pub struct TreefigBuilder {
    app_name: Option<String>,
    file_name: Option<String>,
    config_file: Option<PathBuf>,
    base_paths: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
    env_prefix: Option<String>,
    env_enabled: bool,
    env_vars: Option<Vec<(String, String)>>,
    args: Vec<String>,
    overrides: Vec<(String, String)>,
    loaders: Vec<Box<dyn Loader>>,
}

impl TreefigBuilder {
    fn new() -> Self {
        Self {
            app_name: None,
            file_name: None,
            config_file: None,
            base_paths: None,
            extensions: None,
            env_prefix: None,
            env_enabled: true,
            env_vars: None,
            args: Vec::new(),
            overrides: Vec::new(),
            loaders: Vec::new(),
        }
    }

    /// Set the application name. This derives defaults:
    /// - file stem → `app_name`
    /// - base paths → `./{app_name}` and the platform config directory
    /// - env prefix → `{APP_NAME}_`
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the config file stem (default: the app name).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Read exactly this file. Base paths are not searched; a missing file
    /// means no file source.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Replace the default base paths. Entries are stems without an
    /// extension and may use `$VAR` and `~`.
    pub fn base_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the extensions tried for each base path (default: `toml`, `json`,
    /// `yaml`, `yml`).
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Override the environment variable prefix.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Read these variables instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Flag arguments (`--name=value`), program name excluded.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Override a single path, in flag form (`server.ftp.host`). Applied last.
    pub fn set(mut self, name: &str, value: &str) -> Self {
        self.overrides.push((name.to_string(), value.to_string()));
        self
    }

    /// Run an extra loader after flags and before overrides.
    pub fn loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }

    fn effective_file_name(&self) -> Option<&str> {
        self.file_name.as_deref().or(self.app_name.as_deref())
    }

    fn effective_env_prefix(&self) -> Option<String> {
        if !self.env_enabled {
            return None;
        }
        if let Some(prefix) = &self.env_prefix {
            return Some(prefix.clone());
        }
        match &self.app_name {
            Some(app) => Some(format!("{}_", app.to_uppercase())),
            None => Some(DEFAULT_ENV_PREFIX.to_string()),
        }
    }

    fn effective_finder(&self) -> Finder {
        let mut finder = Finder::new();
        if let Some(extensions) = &self.extensions {
            finder = finder.extensions(extensions.iter().cloned());
        }
        if let Some(path) = &self.config_file {
            return finder.file(path.clone());
        }
        if let Some(paths) = &self.base_paths {
            return finder.base_paths(paths.iter().cloned());
        }
        if let Some(stem) = self.effective_file_name() {
            finder = finder.base_path(format!("./{stem}"));
            if let Some(app) = &self.app_name {
                finder = finder.platform(app, stem);
            }
        }
        finder
    }

    fn env_loader(&self) -> Option<EnvLoader> {
        let loader = EnvLoader::new(&self.effective_env_prefix()?);
        Some(match &self.env_vars {
            Some(vars) => loader.vars(vars.iter().cloned()),
            None => loader,
        })
    }

    /// Load the configuration into a default instance of `C`.
    pub fn load<C: Configurable + Default>(self) -> Result<C, TreefigError> {
        let mut config = C::default();
        self.load_into(&mut config)?;
        Ok(config)
    }

    /// Load every source into `target`, in order.
    pub fn load_into(self, target: &mut dyn Configurable) -> Result<LoadReport, TreefigError> {
        let file = FileLoader::new(self.effective_finder());
        let mut report = LoadReport {
            file: file.path()?,
            found: Vec::new(),
        };

        let mut loaders: Vec<Box<dyn Loader>> = vec![Box::new(file)];
        if let Some(env) = self.env_loader() {
            loaders.push(Box::new(env));
        }
        loaders.push(Box::new(FlagLoader::new(&self.args)?));
        loaders.extend(self.loaders);
        loaders.push(Box::new(FlagLoader::from_pairs(self.overrides)));

        for loader in &loaders {
            let found = loader.load(target)?;
            debug!(loader = loader.name(), found, "ran config loader");
            if found {
                report.found.push(loader.name().to_string());
            }
        }
        Ok(report)
    }

    /// Handle a [`ConfigAction`] and print the result to stdout.
    pub fn handle_and_print<C: Configurable + Default>(self, action: &ConfigAction) -> Result<(), TreefigError> {
        let result = self.handle::<C>(action)?;
        print!("{result}");
        Ok(())
    }

    /// Handle a [`ConfigAction`] (show / env / flags).
    pub fn handle<C: Configurable + Default>(self, action: &ConfigAction) -> Result<ConfigResult, TreefigError> {
        match action {
            ConfigAction::Show => {
                let root = self.app_name.clone().unwrap_or_else(|| crate::DEFAULT_ROOT_NAME.to_string());
                let config = self.load::<C>()?;
                let tree = encode_to_node(&root, &config, EncodeMode::Data);
                Ok(ConfigResult::Values(Flattener::flags().leaves(&tree)))
            }
            ConfigAction::Env => {
                let prefix = self
                    .effective_env_prefix()
                    .unwrap_or_else(|| DEFAULT_ENV_PREFIX.to_string());
                Ok(ConfigResult::Env(Listing::env(env::encode(&prefix, &C::default()))))
            }
            ConfigAction::Flags => Ok(ConfigResult::Flags(Listing::flags(flag::encode(&C::default())))),
        }
    }
}

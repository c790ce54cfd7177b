//! Clap adapter for treefig.
//!
//! Compiled only with the `clap` Cargo feature (on by default). Embed
//! [`ConfigArgs`] into a clap `#[derive(Parser)]` struct to get a
//! `--config-file` option, repeatable `--set key=value` overrides and
//! `show|env|flags` subcommands.
//!
//! The bridge to the core is [`ConfigArgs::apply`], which threads the options
//! into a [`TreefigBuilder`], and [`ConfigArgs::into_action`], which yields a
//! framework-agnostic [`ConfigAction`] for
//! [`TreefigBuilder::handle`](crate::TreefigBuilder::handle).

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::builder::TreefigBuilder;
use crate::types::ConfigAction;

/// Clap-derived args for configuration handling.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     config: ConfigArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Read this config file instead of searching for one.
    #[arg(long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Override a config value (e.g. --set server.ftp.host=localhost). Repeatable.
    #[arg(long = "set", global = true, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show the loaded configuration.
    Show,
    /// List the environment variables the configuration reads.
    Env,
    /// List the flags the configuration reads.
    Flags,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

impl ConfigArgs {
    /// Apply `--config-file` and `--set` to `builder`.
    pub fn apply(&self, mut builder: TreefigBuilder) -> TreefigBuilder {
        if let Some(path) = &self.config_file {
            builder = builder.config_file(path.clone());
        }
        for (key, value) in &self.set {
            builder = builder.set(key, value);
        }
        builder
    }

    /// Convert the subcommand into a [`ConfigAction`]. No subcommand means
    /// `show`.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            None | Some(ConfigSubcommand::Show) => ConfigAction::Show,
            Some(ConfigSubcommand::Env) => ConfigAction::Env,
            Some(ConfigSubcommand::Flags) => ConfigAction::Flags,
        }
    }
}

//! CLI command definitions and dispatch.

pub mod config;
pub mod plugins;
pub mod resource;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use startup_core::config::AppConfig;
use startup_core::error::AppError;
use startup_plugin::registry::PluginRegistry;

/// Startup project tooling
#[derive(Debug, Parser)]
#[command(name = "startup", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and per-environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Environment overlay to load (`{config_dir}/{env}.toml`)
    #[arg(short, long, env = "STARTUP_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the server
    Serve(serve::ServeArgs),
    /// Resolve asset URLs and hashes
    Resource(resource::ResourceArgs),
    /// Inspect compiled-in and installed plugins
    Plugins(plugins::PluginsArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, self).await,
            Commands::Resource(args) => resource::execute(args, self).await,
            Commands::Plugins(args) => plugins::execute(args, self).await,
            Commands::Config(args) => config::execute(args, self).await,
        }
    }

    /// Loads configuration for the selected environment.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config_dir, &self.env, |key| std::env::var(key).ok())
    }
}

/// Registry of the plugins compiled into this binary, with config applied.
pub fn plugin_registry(config: &AppConfig) -> Result<PluginRegistry, AppError> {
    let mut registry = PluginRegistry::new();
    registry.register(plugin_status::plugin())?;
    registry.apply_config(&config.plugins);
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_path() {
        let cli = Cli::try_parse_from([
            "startup", "--format", "json", "resource", "path", "bundle", "main", "--absolute",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Resource(args) => match args.command {
                resource::ResourceCommand::Path {
                    kind,
                    app,
                    absolute,
                } => {
                    assert_eq!(kind, "bundle");
                    assert_eq!(app, "main");
                    assert!(absolute);
                }
                other => panic!("unexpected command: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_hash_defaults_to_bundle() {
        let cli = Cli::try_parse_from(["startup", "resource", "hash", "main"]).unwrap();
        match cli.command {
            Commands::Resource(args) => match args.command {
                resource::ResourceCommand::Hash { kind, .. } => assert_eq!(kind, "bundle"),
                other => panic!("unexpected command: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_registry_contains_status_plugin() {
        let registry = plugin_registry(&AppConfig::default()).unwrap();
        assert!(registry.contains(plugin_status::PLUGIN_NAME));
    }
}

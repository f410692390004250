//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use startup_core::error::AppError;

use super::Cli;
use crate::output::{self, Status};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate configuration files and environment
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = cli.load_config()?;
            output::print_json(&config)?;
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(config) => {
                output::status(
                    Status::Ok,
                    &format!(
                        "Configuration '{}' ({}) is valid",
                        cli.config_dir.display(),
                        cli.env
                    ),
                );
                output::print_kv("Server", config.server.bind_address());
                output::print_kv("Mode", config.resources.mode.as_str());
                output::print_kv("Manifest", config.resources.manifest_path().display());
                output::print_kv("Channel", config.channel.server_enabled);
                output::print_kv("Plugins", config.plugins.entries.len());
            }
            Err(e) => {
                output::status(Status::Fail, &format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            tokio::fs::write(out_path, default_config).await?;

            output::status(Status::Ok, &format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}

//! Plugin inspection commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use startup_core::error::AppError;
use startup_plugin::discovery;

use super::{Cli, plugin_registry};
use crate::output::{self, Status};

/// Arguments for plugin commands
#[derive(Debug, Args)]
pub struct PluginsArgs {
    /// Plugins subcommand
    #[command(subcommand)]
    pub command: PluginsCommand,
}

/// Plugins subcommands
#[derive(Debug, Subcommand)]
pub enum PluginsCommand {
    /// List plugins compiled into this binary
    List,
    /// Scan a package manifest and its dependencies for plugin exports
    Discover {
        /// Package manifest (defaults to `plugins.manifest` under the project path)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: bool,
    #[tabled(rename = "Client")]
    client: bool,
    #[tabled(rename = "Server")]
    server: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct DiscoveredRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Compiled In")]
    compiled: bool,
}

/// Execute plugin commands
pub async fn execute(args: &PluginsArgs, cli: &Cli) -> Result<(), AppError> {
    let config = cli.load_config()?;
    let registry = plugin_registry(&config)?;

    match &args.command {
        PluginsCommand::List => {
            let rows: Vec<PluginRow> = registry
                .list()
                .into_iter()
                .map(|info| PluginRow {
                    name: info.name,
                    enabled: info.enabled,
                    client: info.client,
                    server: info.server,
                })
                .collect();
            output::print_rows(&rows, cli.format)?;
        }
        PluginsCommand::Discover { manifest } => {
            let manifest = manifest
                .clone()
                .unwrap_or_else(|| config.plugin_manifest_path());
            let rows: Vec<DiscoveredRow> = discovery::discover(&manifest)
                .await?
                .into_iter()
                .map(|found| DiscoveredRow {
                    compiled: registry.contains(&found.package),
                    package: found.package,
                    entry: found.entry,
                })
                .collect();

            if rows.iter().any(|row| !row.compiled) {
                output::status(
                    Status::Warn,
                    "Some plugin packages are not compiled into this binary",
                );
            }
            output::print_rows(&rows, cli.format)?;
        }
    }

    Ok(())
}

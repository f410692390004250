//! Asset resolution commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use startup_core::error::AppError;
use startup_resource::{ResourceLocator, ResourceOptions};

use super::Cli;
use crate::output::{self, Status};

/// Arguments for resource commands
#[derive(Debug, Args)]
pub struct ResourceArgs {
    /// Resource subcommand
    #[command(subcommand)]
    pub command: ResourceCommand,
}

/// Resource subcommands
#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// Print the URL of an app's bundle or style
    Path {
        /// Resource type (`bundle` or `style`)
        kind: String,
        /// App name
        app: String,
        /// Prefix production bundles with the reference URL
        #[arg(long)]
        absolute: bool,
    },
    /// Print the content hash of an app's bundle
    Hash {
        /// App name
        app: String,
        /// Hash type
        #[arg(long = "type", default_value = "bundle")]
        kind: String,
    },
}

/// One resolved resource.
#[derive(Debug, Serialize, Tabled)]
struct ResourceRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Execute resource commands
pub async fn execute(args: &ResourceArgs, cli: &Cli) -> Result<(), AppError> {
    let config = cli.load_config()?;
    let mode = config.resources.mode.as_str().to_string();
    let locator = ResourceLocator::new(config.resources);

    let row = match &args.command {
        ResourceCommand::Path {
            kind,
            app,
            absolute,
        } => {
            let options = ResourceOptions {
                absolute: *absolute,
            };
            let path = locator.resource_path(kind, app, &options).await?;
            ResourceRow {
                kind: kind.clone(),
                app: app.clone(),
                mode,
                value: path,
            }
        }
        ResourceCommand::Hash { app, kind } => {
            let hash = locator.hash(app, kind, &ResourceOptions::default()).await?;
            if hash.is_none() {
                output::status(Status::Warn, "Hashes are only computed in production mode");
            }
            ResourceRow {
                kind: kind.clone(),
                app: app.clone(),
                mode,
                value: hash.unwrap_or_else(|| "-".to_string()),
            }
        }
    };

    output::print_rows(&[row], cli.format)
}

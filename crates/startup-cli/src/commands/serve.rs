//! Server start command.

use std::sync::Arc;

use clap::Args;

use startup_core::error::AppError;

use super::{Cli, plugin_registry};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the bind port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, cli: &Cli) -> Result<(), AppError> {
    let mut config = cli.load_config()?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let registry = plugin_registry(&config)?;
    startup_server::run_server(Arc::new(config), &registry).await
}

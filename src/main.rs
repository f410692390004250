//! Startup server entry point.
//!
//! Loads configuration, registers the plugins compiled into this binary, and
//! starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use startup_core::config::AppConfig;
use startup_core::config::logging::{LogFormat, LoggingConfig};
use startup_core::error::AppError;
use startup_plugin::registry::PluginRegistry;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("STARTUP_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    match config.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Compact => {
            fmt().compact().with_env_filter(filter).init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Registers plugins and runs the server until shutdown
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = config.resources.mode.as_str(),
        "Starting Startup"
    );

    let mut registry = PluginRegistry::new();
    registry.register(plugin_status::plugin())?;
    registry.apply_config(&config.plugins);

    startup_server::run_server(Arc::new(config), &registry).await
}

//! Application configuration schemas.
//!
//! The root [`AppConfig`] is built with the `config` crate from optional
//! TOML files, `STARTUP__`-prefixed environment variables and the well-known
//! build variables (`PROJECT_PATH`, `NODE_ENV`, `PORT`, ...). Once loaded it
//! is passed explicitly to every component.

pub mod channel;
pub mod logging;
pub mod plugin;
pub mod resources;
pub mod server;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use self::channel::ChannelConfig;
use self::logging::LoggingConfig;
use self::plugin::PluginsConfig;
use self::resources::{BuildMode, ResourceConfig};
use self::server::ServerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Asset resolution settings.
    #[serde(default)]
    pub resources: ResourceConfig,
    /// Real-time channel client settings.
    #[serde(default)]
    pub channel: ChannelConfig,
    /// Plugin system settings.
    #[serde(default)]
    pub plugins: PluginsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Plain environment variables mapped onto configuration keys.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PROJECT_PATH", "resources.project_path"),
    ("BUILD_CLIENT_PATH", "resources.build_client_path"),
    ("DEVSERVER_URL", "resources.devserver_url"),
    ("DEV_PORT", "resources.dev_port"),
    ("BUILD_REFERENCE_URL", "resources.reference_url"),
    ("PORT", "server.port"),
];

impl AppConfig {
    /// Load configuration from `config/` and the process environment.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(Path::new("config"), env, |key| std::env::var(key).ok())
    }

    /// Load configuration from `dir`, resolving plain variables through `lookup`.
    ///
    /// Sources, lowest precedence first: `{dir}/default.toml`, `{dir}/{env}.toml`,
    /// `STARTUP__*` variables, then the variables in [`ENV_OVERRIDES`] and `NODE_ENV`.
    pub fn load_from<F>(dir: &Path, env: &str, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_file = dir.join("default");
        let env_file = dir.join(env);

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(&default_file.to_string_lossy()).required(false))
            .add_source(config::File::with_name(&env_file.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix("STARTUP")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, lookup(var))?;
        }

        let mode = lookup("NODE_ENV").map(|v| BuildMode::from_node_env(&v).as_str());
        builder = builder.set_override_option("resources.mode", mode)?;

        let config = builder
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Package manifest scanned for plugin exports, relative to the project.
    pub fn plugin_manifest_path(&self) -> PathBuf {
        Path::new(&self.resources.project_path).join(&self.plugins.manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_sources() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load_from(dir.path(), "test", lookup_from(&[])).expect("load");

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.resources.build_client_path, "/build/client/");
        assert_eq!(config.resources.mode, BuildMode::Development);
        assert!(config.channel.server_enabled);
        assert!(!config.plugins.isolate_failures);
    }

    #[test]
    fn test_env_variables_override_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 4000\n[resources]\ndev_port = 4010\n",
        )
        .expect("write");

        let config = AppConfig::load_from(
            dir.path(),
            "test",
            lookup_from(&[
                ("PORT", "5000"),
                ("NODE_ENV", "production"),
                ("PROJECT_PATH", "/srv/app"),
                ("BUILD_REFERENCE_URL", "https://cdn.example.com"),
            ]),
        )
        .expect("load");

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.resources.dev_port, 4010);
        assert_eq!(config.resources.mode, BuildMode::Production);
        assert_eq!(config.resources.project_path, "/srv/app");
        assert_eq!(
            config.resources.reference_url.as_deref(),
            Some("https://cdn.example.com")
        );
    }

    #[test]
    fn test_env_overlay_and_plugin_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("default.toml"),
            "[plugins.entries.status]\nenabled = true\n",
        )
        .expect("write");
        std::fs::write(
            dir.path().join("staging.toml"),
            "[plugins]\nisolate_failures = true\n[plugins.entries.status]\nenabled = false\n[plugins.entries.status.server]\npath = \"/ping\"\n",
        )
        .expect("write");

        let config = AppConfig::load_from(dir.path(), "staging", lookup_from(&[])).expect("load");

        assert!(config.plugins.isolate_failures);
        let status = config.plugins.entries.get("status").expect("status entry");
        assert_eq!(status.enabled, Some(false));
        assert_eq!(status.server["path"], "/ping");
    }
}

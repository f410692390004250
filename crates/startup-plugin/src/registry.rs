//! Plugin registry. Stores plugin definitions in registration order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use startup_core::config::plugin::{PluginSettings, PluginsConfig};
use startup_core::error::{AppError, ErrorKind};
use startup_core::result::AppResult;

use crate::exports::PluginBuilder;
use crate::hooks::set::{ClientHookSet, ServerHookSet};

/// Builds a plugin's client hook table from its options.
pub type ClientFactory = Arc<dyn Fn(&serde_json::Value) -> AppResult<ClientHookSet> + Send + Sync>;
/// Builds a plugin's server hook table from its options.
pub type ServerFactory = Arc<dyn Fn(&serde_json::Value) -> AppResult<ServerHookSet> + Send + Sync>;

/// A registered plugin. Immutable once registered.
#[derive(Clone)]
pub struct PluginDefinition {
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) client_factory: Option<ClientFactory>,
    pub(crate) server_factory: Option<ServerFactory>,
}

impl PluginDefinition {
    /// Starts building a plugin definition.
    pub fn builder(name: impl Into<String>) -> PluginBuilder {
        PluginBuilder::new(name)
    }

    /// Unique plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the plugin enables itself.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the plugin has client hooks.
    pub fn has_client(&self) -> bool {
        self.client_factory.is_some()
    }

    /// Whether the plugin has server hooks.
    pub fn has_server(&self) -> bool {
        self.server_factory.is_some()
    }
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("client", &self.has_client())
            .field("server", &self.has_server())
            .finish()
    }
}

/// Summary of a registered plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Unique plugin name.
    pub name: String,
    /// Effective enabled flag after configuration overrides.
    pub enabled: bool,
    /// Whether the plugin has client hooks.
    pub client: bool,
    /// Whether the plugin has server hooks.
    pub server: bool,
}

/// An enabled plugin with its hook tables built from configured options.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    /// Plugin name.
    pub name: String,
    /// Server hook table.
    pub server: ServerHookSet,
    /// Client hook table.
    pub client: ClientHookSet,
}

/// Registry of all plugins known to the process.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginDefinition>,
    settings: BTreeMap<String, PluginSettings>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin. Names are unique.
    pub fn register(&mut self, plugin: PluginDefinition) -> AppResult<()> {
        if self.contains(&plugin.name) {
            return Err(AppError::conflict(format!(
                "Plugin '{}' is already registered",
                plugin.name
            )));
        }

        info!(
            plugin = %plugin.name,
            enabled = plugin.enabled,
            client = plugin.has_client(),
            server = plugin.has_server(),
            "Registering plugin"
        );

        self.plugins.push(plugin);
        Ok(())
    }

    /// Applies enabled overrides and factory options from configuration.
    pub fn apply_config(&mut self, config: &PluginsConfig) {
        for name in config.entries.keys() {
            if !self.contains(name) {
                warn!(plugin = %name, "Configuration names a plugin that is not registered");
            }
        }
        self.settings = config.entries.clone();
    }

    /// Gets a plugin by name.
    pub fn get(&self, name: &str) -> Option<&PluginDefinition> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Checks whether a plugin is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Effective enabled flag: configuration override, else the plugin's own flag.
    pub fn is_enabled(&self, name: &str) -> bool {
        let Some(plugin) = self.get(name) else {
            return false;
        };
        self.settings
            .get(name)
            .and_then(|s| s.enabled)
            .unwrap_or(plugin.enabled)
    }

    /// Lists plugins in registration order.
    pub fn list(&self) -> Vec<PluginInfo> {
        self.plugins
            .iter()
            .map(|p| PluginInfo {
                name: p.name.clone(),
                enabled: self.is_enabled(&p.name),
                client: p.has_client(),
                server: p.has_server(),
            })
            .collect()
    }

    /// Returns plugin count.
    pub fn count(&self) -> usize {
        self.plugins.len()
    }

    /// Builds the hook tables of every enabled plugin, in registration order.
    ///
    /// Disabled plugins are skipped entirely, factories included.
    pub fn instantiate(&self) -> AppResult<Vec<LoadedPlugin>> {
        let mut loaded = Vec::new();
        let null = serde_json::Value::Null;

        for plugin in &self.plugins {
            if !self.is_enabled(&plugin.name) {
                info!(plugin = %plugin.name, "Plugin disabled, skipping");
                continue;
            }

            let settings = self.settings.get(&plugin.name);
            let server_options = settings.map(|s| &s.server).unwrap_or(&null);
            let client_options = settings.map(|s| &s.client).unwrap_or(&null);

            let server = match &plugin.server_factory {
                Some(factory) => factory(server_options)
                    .map_err(|e| factory_error(&plugin.name, "server", e))?,
                None => ServerHookSet::new(),
            };
            let client = match &plugin.client_factory {
                Some(factory) => factory(client_options)
                    .map_err(|e| factory_error(&plugin.name, "client", e))?,
                None => ClientHookSet::new(),
            };

            info!(
                plugin = %plugin.name,
                server_hooks = ?server.points(),
                "Plugin loaded"
            );

            loaded.push(LoadedPlugin {
                name: plugin.name.clone(),
                server,
                client,
            });
        }

        Ok(loaded)
    }
}

fn factory_error(plugin: &str, side: &str, err: AppError) -> AppError {
    err.wrap(
        ErrorKind::Plugin,
        format_args!("Plugin '{plugin}' {side} factory failed"),
    )
}

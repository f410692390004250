//! Plugin system configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Log failing hooks and keep going instead of aborting.
    #[serde(default)]
    pub isolate_failures: bool,
    /// Package manifest scanned for plugin exports.
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Per-plugin settings keyed by plugin name.
    #[serde(default)]
    pub entries: BTreeMap<String, PluginSettings>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            isolate_failures: false,
            manifest: default_manifest(),
            entries: BTreeMap::new(),
        }
    }
}

/// Settings for one plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Overrides the plugin's own `enabled` flag when set.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Options passed to the client factory.
    #[serde(default)]
    pub client: serde_json::Value,
    /// Options passed to the server factory.
    #[serde(default)]
    pub server: serde_json::Value,
}

fn default_manifest() -> String {
    "package.json".to_string()
}

//! Real-time channel client configuration.

use serde::{Deserialize, Serialize};

/// Settings read by the client bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Base URL configured for the whole app. An explicit bootstrap option wins over it.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Whether the client connects to the server at all.
    #[serde(default = "default_true")]
    pub server_enabled: bool,
    /// Default for the HTTP transport fallback.
    #[serde(default)]
    pub force_http_fallback: bool,
    /// Origin the web build is served from.
    #[serde(default)]
    pub web_origin: Option<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            server_enabled: true,
            force_http_fallback: false,
            web_origin: None,
        }
    }
}

fn default_true() -> bool {
    true
}

//! HTTP server configuration.

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port. Overridden by `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
    /// App rendered at `/` by the HTML shell.
    #[serde(default = "default_app")]
    pub default_app: String,
    /// Idle time after which a session cookie is forgotten.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
    /// Upper bound on sessions held in memory; least recently used go first.
    #[serde(default = "default_session_capacity")]
    pub session_capacity: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_grace_seconds: default_shutdown_grace(),
            default_app: default_app(),
            session_ttl_seconds: default_session_ttl(),
            session_capacity: default_session_capacity(),
        }
    }
}

impl ServerConfig {
    /// Returns the `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_grace() -> u64 {
    10
}

fn default_app() -> String {
    "main".to_string()
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

fn default_session_capacity() -> u64 {
    100_000
}

//! Client-side hook context.

use serde::{Deserialize, Serialize};

/// Path of the real-time channel endpoint on the server.
pub const CHANNEL_PATH: &str = "/channel";

/// Resolved connection settings for the real-time sync client.
///
/// Written once by the client bootstrap and read by the connection layer
/// and by client `init`/`connected` hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOptions {
    /// Server origin, without a trailing slash.
    pub base_url: String,
    /// Use the HTTP transport instead of a WebSocket.
    pub force_http_fallback: bool,
}

impl ChannelOptions {
    /// Creates options, normalizing the base URL.
    pub fn new(base_url: &str, force_http_fallback: bool) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            force_http_fallback,
        }
    }

    /// WebSocket URL of the channel endpoint.
    pub fn websocket_url(&self) -> String {
        let origin = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{origin}{CHANNEL_PATH}")
    }

    /// HTTP URL of the channel endpoint, used by the fallback transport.
    pub fn http_url(&self) -> String {
        format!("{}{CHANNEL_PATH}", self.base_url)
    }
}

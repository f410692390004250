//! Options for the status plugin.
//!
//! Read from `plugins.entries.status.server` and
//! `plugins.entries.status.client`. A `null` value means all defaults.

use serde::{Deserialize, Serialize};

use crate::error::StatusError;

/// Server-side options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Route of the status endpoint under `/api`.
    pub path: String,
    /// Add timestamp fields to every collection schema.
    pub timestamps: bool,
    /// Token required in `x-startup-token` on channel upgrades.
    pub channel_token: Option<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            path: "/status".to_string(),
            timestamps: false,
            channel_token: None,
        }
    }
}

impl StatusConfig {
    /// Parses and validates options.
    pub fn from_options(options: &serde_json::Value) -> Result<Self, StatusError> {
        let config: Self = if options.is_null() {
            Self::default()
        } else {
            serde_json::from_value(options.clone()).map_err(StatusError::InvalidOptions)?
        };

        if !config.path.starts_with('/') || config.path.len() < 2 {
            return Err(StatusError::InvalidPath(config.path));
        }

        Ok(config)
    }
}

/// Client-side options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusClientConfig {
    /// Log the channel URLs at info level instead of debug.
    pub verbose: bool,
}

impl StatusClientConfig {
    /// Parses options.
    pub fn from_options(options: &serde_json::Value) -> Result<Self, StatusError> {
        if options.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(options.clone()).map_err(StatusError::InvalidOptions)
    }
}

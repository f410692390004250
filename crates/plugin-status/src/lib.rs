//! # Plugin Status
//!
//! A Startup plugin that reports server status and decorates the data
//! schema.
//!
//! - `api`: mounts `GET /api{path}` with plugin name, start time and uptime.
//! - `transformSchema`: adds `createdAt`/`updatedAt` to every collection
//!   when `timestamps` is set.
//! - `serverUpgrade`: requires the `x-startup-token` header on channel
//!   upgrades when `channel_token` is set.
//! - Client `init`/`connected`: log the resolved channel.

pub mod config;
pub mod error;
pub mod plugin;

pub use config::{StatusClientConfig, StatusConfig};
pub use error::StatusError;
pub use plugin::{PLUGIN_NAME, plugin};

//! # startup-client
//!
//! One-time client bootstrap. Detects the runtime, resolves the base URL of
//! the real-time channel, runs client plugin hooks, and opens the model
//! connection when the server is enabled.

pub mod bootstrap;
pub mod connector;
pub mod runtime;

pub use bootstrap::{BootstrapOptions, ClientBootstrap, ClientSession, DeprecatedPlugin};
pub use connector::{SyncConnection, SyncConnector, WebSocketConnector};
pub use runtime::{Platform, RuntimeEnv};
pub use startup_plugin::api::client::ChannelOptions;

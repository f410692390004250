//! # startup-plugin
//!
//! Plugin framework for Startup. Provides:
//!
//! - Plugin definitions with optional client and server factories
//! - An ordered plugin registry with config-driven enable/disable and options
//! - Typed hook tables, one callback slot per lifecycle point
//! - A hook dispatcher with fail-fast or isolating failure policy
//! - Discovery of plugin packages through package manifest `exports`

pub mod api;
pub mod discovery;
pub mod exports;
pub mod hooks;
pub mod prelude;
pub mod registry;

pub use api::client::ChannelOptions;
pub use api::context::{Backend, OrmRegistry, Schema, ServerApp, ServerHandle, UpgradeRequest};
pub use exports::PluginBuilder;
pub use hooks::definitions::{ClientHookPoint, HookPoint};
pub use hooks::dispatcher::{DispatchPolicy, DispatchReport, HookDispatcher};
pub use hooks::set::{ClientHookSet, HookOutcome, ServerHookSet};
pub use registry::{LoadedPlugin, PluginDefinition, PluginInfo, PluginRegistry};

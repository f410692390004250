//! Prelude for plugin crates.

pub use startup_core::error::AppError;
pub use startup_core::result::AppResult;

pub use crate::api::client::ChannelOptions;
pub use crate::api::context::{
    Backend, OrmRegistry, Schema, ServerApp, ServerHandle, UpgradeRequest,
};
pub use crate::exports::PluginBuilder;
pub use crate::hooks::definitions::{ClientHookPoint, HookPoint};
pub use crate::hooks::set::{ClientHookSet, HookOutcome, ServerHookSet};
pub use crate::registry::PluginDefinition;

//! Values handed to hook callbacks.

pub mod client;
pub mod context;

pub use client::ChannelOptions;
pub use context::{Backend, OrmRegistry, Schema, ServerApp, ServerHandle, UpgradeRequest};

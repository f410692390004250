//! Builder used by plugin crates to export their definition.

use std::sync::Arc;

use startup_core::result::AppResult;

use crate::hooks::set::{ClientHookSet, ServerHookSet};
use crate::registry::PluginDefinition;

/// Builder for constructing a [`PluginDefinition`].
///
/// ```rust,ignore
/// let plugin = PluginDefinition::builder("status")
///     .server(|options| Ok(ServerHookSet::new().on_api(|app| { ...; Ok(()) })))
///     .build();
/// ```
#[derive(Debug)]
pub struct PluginBuilder {
    definition: PluginDefinition,
}

impl PluginBuilder {
    /// Creates a builder for an enabled plugin without hooks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            definition: PluginDefinition {
                name: name.into(),
                enabled: true,
                client_factory: None,
                server_factory: None,
            },
        }
    }

    /// Sets the plugin's own enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.definition.enabled = enabled;
        self
    }

    /// Sets the client factory.
    pub fn client<F>(mut self, factory: F) -> Self
    where
        F: Fn(&serde_json::Value) -> AppResult<ClientHookSet> + Send + Sync + 'static,
    {
        self.definition.client_factory = Some(Arc::new(factory));
        self
    }

    /// Sets the server factory.
    pub fn server<F>(mut self, factory: F) -> Self
    where
        F: Fn(&serde_json::Value) -> AppResult<ServerHookSet> + Send + Sync + 'static,
    {
        self.definition.server_factory = Some(Arc::new(factory));
        self
    }

    /// Builds the final definition.
    pub fn build(self) -> PluginDefinition {
        self.definition
    }
}

//! One-time client bootstrap.
//!
//! [`ClientBootstrap::run`] consumes the bootstrap, so a process can only
//! bootstrap once per instance. The resolved [`ChannelOptions`] are returned
//! inside the [`ClientSession`] rather than written into shared state.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use startup_core::config::AppConfig;
use startup_core::result::AppResult;
use startup_plugin::api::client::ChannelOptions;
use startup_plugin::hooks::definitions::ClientHookPoint;
use startup_plugin::hooks::dispatcher::HookDispatcher;

use crate::connector::{SyncConnection, SyncConnector};
use crate::runtime::RuntimeEnv;

/// Callback from the deprecated `plugins` option list.
pub type DeprecatedPlugin = Box<dyn Fn(&BootstrapOptions) -> AppResult<()> + Send + Sync>;

/// Options passed by the application to the bootstrap.
#[derive(Default)]
pub struct BootstrapOptions {
    /// Explicit server origin.
    pub base_url: Option<String>,
    /// Overrides `channel.force_http_fallback`.
    pub force_http_fallback: Option<bool>,
    /// Legacy plugin callbacks, superseded by registered plugins.
    pub plugins: Vec<DeprecatedPlugin>,
}

impl BootstrapOptions {
    /// Options with an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }
}

impl fmt::Debug for BootstrapOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapOptions")
            .field("base_url", &self.base_url)
            .field("force_http_fallback", &self.force_http_fallback)
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

/// Result of a completed bootstrap.
#[derive(Debug)]
pub struct ClientSession {
    /// Resolved channel settings.
    pub channel: Arc<ChannelOptions>,
    /// Open model connection, absent when the server is disabled.
    pub connection: Option<Box<dyn SyncConnection>>,
}

/// Client bootstrap.
#[derive(Debug)]
pub struct ClientBootstrap {
    config: Arc<AppConfig>,
    runtime: RuntimeEnv,
    dispatcher: HookDispatcher,
}

impl ClientBootstrap {
    /// Creates a bootstrap for the given runtime.
    pub fn new(config: Arc<AppConfig>, runtime: RuntimeEnv, dispatcher: HookDispatcher) -> Self {
        Self {
            config,
            runtime,
            dispatcher,
        }
    }

    /// Resolves channel options without side effects beyond logging.
    pub fn resolve_channel(&self, options: &BootstrapOptions) -> ChannelOptions {
        let channel = &self.config.channel;
        let default_url = self
            .runtime
            .default_base_url(channel, self.config.server.port);

        let explicit = options.base_url.as_ref().or(channel.base_url.as_ref());

        if explicit.is_none() && !self.runtime.is_browser() && !self.runtime.is_mobile_dev() {
            warn!(
                platform = %self.runtime.platform,
                default_url = %default_url,
                "No base URL configured, falling back to the platform default"
            );
        }

        let base_url = if self.runtime.is_browser() {
            default_url
        } else {
            explicit.cloned().unwrap_or(default_url)
        };

        let force_http_fallback = options
            .force_http_fallback
            .unwrap_or(channel.force_http_fallback);

        ChannelOptions::new(&base_url, force_http_fallback)
    }

    /// Runs the bootstrap.
    ///
    /// Order: client `init` hooks, deprecated plugin callbacks, connection
    /// (when `channel.server_enabled`), client `connected` hooks.
    pub async fn run(
        self,
        options: BootstrapOptions,
        connector: &dyn SyncConnector,
    ) -> AppResult<ClientSession> {
        let channel = Arc::new(self.resolve_channel(&options));
        info!(
            platform = %self.runtime.platform,
            base_url = %channel.base_url,
            force_http_fallback = channel.force_http_fallback,
            "Bootstrapping client"
        );

        self.dispatcher.client(ClientHookPoint::Init, &channel)?;

        for (index, plugin) in options.plugins.iter().enumerate() {
            warn!(
                index,
                "The 'plugins' bootstrap option is deprecated, register a plugin instead"
            );
            plugin(&options)?;
        }

        if !self.config.channel.server_enabled {
            info!("Server disabled, skipping model connection");
            return Ok(ClientSession {
                channel,
                connection: None,
            });
        }

        let connection = connector.connect(&channel).await?;
        self.dispatcher.client(ClientHookPoint::Connected, &channel)?;

        Ok(ClientSession {
            channel,
            connection: Some(connection),
        })
    }
}

//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use startup_core::config::AppConfig;
use startup_plugin::api::context::Backend;
use startup_plugin::hooks::dispatcher::HookDispatcher;
use startup_resource::ResourceLocator;

use crate::middleware::session::SessionStore;

/// Application state passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Asset URL resolution for rendered pages
    pub locator: Arc<ResourceLocator>,
    /// Data backend and channel relay
    pub backend: Arc<Backend>,
    /// Hook dispatcher over the enabled plugins
    pub dispatcher: HookDispatcher,
    /// Sessions issued by the session layer
    pub sessions: Arc<SessionStore>,
}

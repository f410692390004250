//! Hook point definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use startup_core::error::AppError;

/// Server lifecycle points a plugin can hook into.
///
/// The wire names (`as_str`) are the contract between plugin authors and
/// the dispatcher; each point has a fixed callback signature in
/// [`ServerHookSet`](super::set::ServerHookSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookPoint {
    // ── Boot ──
    /// Mutates the collection schema before the backend is built.
    TransformSchema,
    /// Registers models on the ORM.
    Orm,
    /// Sees the backend once it is fully built.
    BeforeStart,

    // ── Router assembly, in mounting order ──
    /// Routes and layers added before the session layer.
    BeforeSession,
    /// Routes and layers added after the session layer.
    AfterSession,
    /// Routes mounted under `/api`.
    Api,
    /// General middleware.
    Middleware,
    /// Page routes served by the server.
    ServerRoutes,
    /// Logging layers.
    Logs,
    /// Static file mounts.
    #[serde(rename = "static")]
    Static,

    // ── Listener ──
    /// Fired once the listener is bound.
    CreateServer,
    /// Fired for every connection upgrade request.
    ServerUpgrade,
}

impl HookPoint {
    /// Every server hook point.
    pub const ALL: [HookPoint; 12] = [
        Self::TransformSchema,
        Self::Orm,
        Self::BeforeStart,
        Self::BeforeSession,
        Self::AfterSession,
        Self::Api,
        Self::Middleware,
        Self::ServerRoutes,
        Self::Logs,
        Self::Static,
        Self::CreateServer,
        Self::ServerUpgrade,
    ];

    /// Returns the wire name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::BeforeSession => "beforeSession",
            Self::AfterSession => "afterSession",
            Self::Middleware => "middleware",
            Self::ServerRoutes => "serverRoutes",
            Self::Logs => "logs",
            Self::Static => "static",
            Self::CreateServer => "createServer",
            Self::ServerUpgrade => "serverUpgrade",
            Self::BeforeStart => "beforeStart",
            Self::Orm => "orm",
            Self::TransformSchema => "transformSchema",
        }
    }

    /// Whether the callback receives the router being assembled.
    pub fn receives_app(&self) -> bool {
        matches!(
            self,
            Self::BeforeSession
                | Self::AfterSession
                | Self::Api
                | Self::Middleware
                | Self::ServerRoutes
                | Self::Logs
                | Self::Static
        )
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookPoint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|point| point.as_str() == s)
            .copied()
            .ok_or_else(|| AppError::validation(format!("Unknown hook point: {s}")))
    }
}

/// Client lifecycle points a plugin can hook into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientHookPoint {
    /// Runs during bootstrap once channel options are resolved.
    Init,
    /// Runs after the model connection has been established.
    Connected,
}

impl ClientHookPoint {
    /// Returns the wire name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for ClientHookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

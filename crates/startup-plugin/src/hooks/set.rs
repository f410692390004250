//! Typed hook tables.
//!
//! A plugin factory returns one [`ServerHookSet`] and/or one
//! [`ClientHookSet`]. Each table has one optional slot per hook point, and
//! each slot has the exact callback signature of that point, so a plugin
//! that registers the wrong shape fails to compile.

use std::fmt;
use std::sync::Arc;

use startup_core::result::AppResult;

use crate::api::client::ChannelOptions;
use crate::api::context::{Backend, OrmRegistry, Schema, ServerApp, ServerHandle, UpgradeRequest};

use super::definitions::{ClientHookPoint, HookPoint};

/// What every hook callback returns.
pub type HookOutcome = AppResult<()>;

/// Callback for the router-building points.
pub type AppHook = Arc<dyn Fn(&mut ServerApp) -> HookOutcome + Send + Sync>;
/// Callback for `transformSchema`.
pub type SchemaHook = Arc<dyn Fn(&mut Schema) -> HookOutcome + Send + Sync>;
/// Callback for `orm`.
pub type OrmHook = Arc<dyn Fn(&mut OrmRegistry) -> HookOutcome + Send + Sync>;
/// Callback for `beforeStart`.
pub type BackendHook = Arc<dyn Fn(&Backend) -> HookOutcome + Send + Sync>;
/// Callback for `createServer`.
pub type ListenerHook = Arc<dyn Fn(&ServerHandle) -> HookOutcome + Send + Sync>;
/// Callback for `serverUpgrade`.
pub type UpgradeHook = Arc<dyn Fn(&UpgradeRequest) -> HookOutcome + Send + Sync>;
/// Callback for client points.
pub type ChannelHook = Arc<dyn Fn(&ChannelOptions) -> HookOutcome + Send + Sync>;

/// Server hook table of one plugin.
#[derive(Clone, Default)]
pub struct ServerHookSet {
    api: Option<AppHook>,
    before_session: Option<AppHook>,
    after_session: Option<AppHook>,
    middleware: Option<AppHook>,
    server_routes: Option<AppHook>,
    logs: Option<AppHook>,
    static_files: Option<AppHook>,
    create_server: Option<ListenerHook>,
    server_upgrade: Option<UpgradeHook>,
    before_start: Option<BackendHook>,
    orm: Option<OrmHook>,
    transform_schema: Option<SchemaHook>,
}

macro_rules! app_hook_setter {
    ($(#[$doc:meta])* $method:ident => $field:ident) => {
        $(#[$doc])*
        pub fn $method<F>(mut self, hook: F) -> Self
        where
            F: Fn(&mut ServerApp) -> HookOutcome + Send + Sync + 'static,
        {
            self.$field = Some(Arc::new(hook));
            self
        }
    };
}

impl ServerHookSet {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    app_hook_setter!(
        /// Routes mounted under `/api`.
        on_api => api
    );
    app_hook_setter!(
        /// Router stage dispatched before `afterSession`.
        on_before_session => before_session
    );
    app_hook_setter!(
        /// Router stage dispatched after `beforeSession`.
        on_after_session => after_session
    );
    app_hook_setter!(
        /// General middleware.
        on_middleware => middleware
    );
    app_hook_setter!(
        /// Page routes.
        on_server_routes => server_routes
    );
    app_hook_setter!(
        /// Logging layers.
        on_logs => logs
    );
    app_hook_setter!(
        /// Static file mounts.
        on_static => static_files
    );

    /// Runs once the listener is bound.
    pub fn on_create_server<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ServerHandle) -> HookOutcome + Send + Sync + 'static,
    {
        self.create_server = Some(Arc::new(hook));
        self
    }

    /// Runs for every upgrade request; an error rejects the request.
    pub fn on_server_upgrade<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UpgradeRequest) -> HookOutcome + Send + Sync + 'static,
    {
        self.server_upgrade = Some(Arc::new(hook));
        self
    }

    /// Runs once the backend is built.
    pub fn on_before_start<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Backend) -> HookOutcome + Send + Sync + 'static,
    {
        self.before_start = Some(Arc::new(hook));
        self
    }

    /// Registers models.
    pub fn on_orm<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut OrmRegistry) -> HookOutcome + Send + Sync + 'static,
    {
        self.orm = Some(Arc::new(hook));
        self
    }

    /// Mutates the schema.
    pub fn on_transform_schema<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Schema) -> HookOutcome + Send + Sync + 'static,
    {
        self.transform_schema = Some(Arc::new(hook));
        self
    }

    /// Returns the router-building callback for a point, if any.
    pub fn app_hook(&self, point: HookPoint) -> Option<&AppHook> {
        match point {
            HookPoint::Api => self.api.as_ref(),
            HookPoint::BeforeSession => self.before_session.as_ref(),
            HookPoint::AfterSession => self.after_session.as_ref(),
            HookPoint::Middleware => self.middleware.as_ref(),
            HookPoint::ServerRoutes => self.server_routes.as_ref(),
            HookPoint::Logs => self.logs.as_ref(),
            HookPoint::Static => self.static_files.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn create_server(&self) -> Option<&ListenerHook> {
        self.create_server.as_ref()
    }

    pub(crate) fn server_upgrade(&self) -> Option<&UpgradeHook> {
        self.server_upgrade.as_ref()
    }

    pub(crate) fn before_start(&self) -> Option<&BackendHook> {
        self.before_start.as_ref()
    }

    pub(crate) fn orm(&self) -> Option<&OrmHook> {
        self.orm.as_ref()
    }

    pub(crate) fn transform_schema(&self) -> Option<&SchemaHook> {
        self.transform_schema.as_ref()
    }

    /// Whether a callback is registered for the point.
    pub fn defines(&self, point: HookPoint) -> bool {
        match point {
            HookPoint::CreateServer => self.create_server.is_some(),
            HookPoint::ServerUpgrade => self.server_upgrade.is_some(),
            HookPoint::BeforeStart => self.before_start.is_some(),
            HookPoint::Orm => self.orm.is_some(),
            HookPoint::TransformSchema => self.transform_schema.is_some(),
            app_point => self.app_hook(app_point).is_some(),
        }
    }

    /// Points with a registered callback.
    pub fn points(&self) -> Vec<HookPoint> {
        HookPoint::ALL
            .into_iter()
            .filter(|point| self.defines(*point))
            .collect()
    }
}

impl fmt::Debug for ServerHookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerHookSet")
            .field("points", &self.points())
            .finish()
    }
}

/// Client hook table of one plugin.
#[derive(Clone, Default)]
pub struct ClientHookSet {
    init: Option<ChannelHook>,
    connected: Option<ChannelHook>,
}

impl ClientHookSet {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs during bootstrap.
    pub fn on_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ChannelOptions) -> HookOutcome + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(hook));
        self
    }

    /// Runs after the connection is established.
    pub fn on_connected<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ChannelOptions) -> HookOutcome + Send + Sync + 'static,
    {
        self.connected = Some(Arc::new(hook));
        self
    }

    /// Returns the callback for a point, if any.
    pub fn hook(&self, point: ClientHookPoint) -> Option<&ChannelHook> {
        match point {
            ClientHookPoint::Init => self.init.as_ref(),
            ClientHookPoint::Connected => self.connected.as_ref(),
        }
    }

    /// Whether a callback is registered for the point.
    pub fn defines(&self, point: ClientHookPoint) -> bool {
        self.hook(point).is_some()
    }
}

impl fmt::Debug for ClientHookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHookSet")
            .field("init", &self.init.is_some())
            .field("connected", &self.connected.is_some())
            .finish()
    }
}

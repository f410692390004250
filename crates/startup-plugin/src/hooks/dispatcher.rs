//! Hook dispatcher. Invokes every enabled plugin's callback for a hook point.
//!
//! - Plugins are visited in registration order.
//! - Only plugins whose hook table defines the point are invoked.
//! - Under [`DispatchPolicy::FailFast`] the first failing callback aborts the
//!   dispatch and its error is returned, naming plugin and hook.
//! - Under [`DispatchPolicy::Isolate`] failures are logged and collected in
//!   the [`DispatchReport`]; the remaining plugins still run.

use std::sync::Arc;

use tracing::{debug, error, warn};

use startup_core::config::plugin::PluginsConfig;
use startup_core::error::{AppError, ErrorKind};
use startup_core::result::AppResult;

use crate::api::client::ChannelOptions;
use crate::api::context::{Backend, OrmRegistry, Schema, ServerApp, ServerHandle, UpgradeRequest};
use crate::registry::{LoadedPlugin, PluginRegistry};

use super::definitions::{ClientHookPoint, HookPoint};
use super::set::HookOutcome;

/// What to do when a plugin callback fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Propagate the first failure to the caller.
    #[default]
    FailFast,
    /// Log failures, keep dispatching, and report them.
    Isolate,
}

impl DispatchPolicy {
    /// Policy selected by `plugins.isolate_failures`.
    pub fn from_config(config: &PluginsConfig) -> Self {
        if config.isolate_failures {
            Self::Isolate
        } else {
            Self::FailFast
        }
    }
}

/// One contained callback failure.
#[derive(Debug, Clone)]
pub struct HookFailure {
    /// Plugin whose callback failed.
    pub plugin: String,
    /// The callback's error.
    pub error: AppError,
}

/// Outcome of dispatching one hook point.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Wire name of the hook point.
    pub hook: String,
    /// Plugins whose callback ran, in order.
    pub invoked: Vec<String>,
    /// Failures contained under [`DispatchPolicy::Isolate`].
    pub failures: Vec<HookFailure>,
}

impl DispatchReport {
    /// Whether every invoked callback succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dispatches hook points to loaded plugins.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    plugins: Arc<Vec<LoadedPlugin>>,
    policy: DispatchPolicy,
}

impl HookDispatcher {
    /// Creates a dispatcher over already loaded plugins.
    pub fn new(plugins: Vec<LoadedPlugin>, policy: DispatchPolicy) -> Self {
        Self {
            plugins: Arc::new(plugins),
            policy,
        }
    }

    /// Instantiates the registry's enabled plugins and builds a dispatcher.
    pub fn from_registry(registry: &PluginRegistry, config: &PluginsConfig) -> AppResult<Self> {
        Ok(Self::new(
            registry.instantiate()?,
            DispatchPolicy::from_config(config),
        ))
    }

    /// Loaded plugins in dispatch order.
    pub fn plugins(&self) -> &[LoadedPlugin] {
        &self.plugins
    }

    /// Active failure policy.
    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Dispatches a router-building point.
    pub fn dispatch_app(&self, point: HookPoint, app: &mut ServerApp) -> AppResult<DispatchReport> {
        if !point.receives_app() {
            return Err(AppError::validation(format!(
                "Hook '{point}' does not receive the server app"
            )));
        }

        self.run(
            point.as_str(),
            |plugin| plugin.server.app_hook(point),
            |hook| hook(&mut *app),
        )
    }

    /// Dispatches `transformSchema`.
    pub fn transform_schema(&self, schema: &mut Schema) -> AppResult<DispatchReport> {
        self.run(
            HookPoint::TransformSchema.as_str(),
            |plugin| plugin.server.transform_schema(),
            |hook| hook(&mut *schema),
        )
    }

    /// Dispatches `orm`.
    pub fn orm(&self, orm: &mut OrmRegistry) -> AppResult<DispatchReport> {
        self.run(
            HookPoint::Orm.as_str(),
            |plugin| plugin.server.orm(),
            |hook| hook(&mut *orm),
        )
    }

    /// Dispatches `beforeStart`.
    pub fn before_start(&self, backend: &Backend) -> AppResult<DispatchReport> {
        self.run(
            HookPoint::BeforeStart.as_str(),
            |plugin| plugin.server.before_start(),
            |hook| hook(backend),
        )
    }

    /// Dispatches `createServer`.
    pub fn create_server(&self, server: &ServerHandle) -> AppResult<DispatchReport> {
        self.run(
            HookPoint::CreateServer.as_str(),
            |plugin| plugin.server.create_server(),
            |hook| hook(server),
        )
    }

    /// Dispatches `serverUpgrade` for one incoming request.
    pub fn server_upgrade(&self, request: &UpgradeRequest) -> AppResult<DispatchReport> {
        self.run(
            HookPoint::ServerUpgrade.as_str(),
            |plugin| plugin.server.server_upgrade(),
            |hook| hook(request),
        )
    }

    /// Dispatches a client point.
    pub fn client(
        &self,
        point: ClientHookPoint,
        channel: &ChannelOptions,
    ) -> AppResult<DispatchReport> {
        self.run(
            point.as_str(),
            |plugin| plugin.client.hook(point),
            |hook| hook(channel),
        )
    }

    fn run<H: ?Sized>(
        &self,
        hook_name: &'static str,
        select: impl Fn(&LoadedPlugin) -> Option<&Arc<H>>,
        mut call: impl FnMut(&H) -> HookOutcome,
    ) -> AppResult<DispatchReport> {
        let mut report = DispatchReport {
            hook: hook_name.to_string(),
            ..Default::default()
        };

        for plugin in self.plugins.iter() {
            let Some(hook) = select(plugin) else {
                continue;
            };

            debug!(hook = hook_name, plugin = %plugin.name, "Invoking hook");
            report.invoked.push(plugin.name.clone());

            if let Err(e) = call(hook.as_ref()) {
                match self.policy {
                    DispatchPolicy::FailFast => {
                        error!(
                            hook = hook_name,
                            plugin = %plugin.name,
                            error = %e,
                            "Hook failed, aborting dispatch"
                        );
                        return Err(e.wrap(
                            ErrorKind::Plugin,
                            format_args!("Plugin '{}' failed in '{}' hook", plugin.name, hook_name),
                        ));
                    }
                    DispatchPolicy::Isolate => {
                        warn!(
                            hook = hook_name,
                            plugin = %plugin.name,
                            error = %e,
                            "Hook failed, continuing with remaining plugins"
                        );
                        report.failures.push(HookFailure {
                            plugin: plugin.name.clone(),
                            error: e,
                        });
                    }
                }
            }
        }

        if !report.invoked.is_empty() {
            debug!(
                hook = hook_name,
                invoked = report.invoked.len(),
                failures = report.failures.len(),
                "Hook dispatched"
            );
        }

        Ok(report)
    }
}

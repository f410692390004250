//! Application builder. Runs the plugin lifecycle, assembles the router
//! through the hook stages, and serves it.
//!
//! Boot order:
//!
//! 1. `transformSchema`, `orm`, `beforeStart` build the data backend.
//! 2. `beforeSession`, `afterSession`, `api` (nested at `/api`),
//!    `middleware`, `serverRoutes`, `logs`, `static` assemble the router.
//! 3. Core routes and layers are added.
//! 4. `createServer` runs once the listener is bound.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use startup_core::config::AppConfig;
use startup_core::error::AppError;
use startup_core::result::AppResult;
use startup_plugin::api::client::CHANNEL_PATH;
use startup_plugin::api::context::{Backend, OrmRegistry, Schema, ServerApp, ServerHandle};
use startup_plugin::discovery;
use startup_plugin::hooks::definitions::HookPoint;
use startup_plugin::hooks::dispatcher::HookDispatcher;
use startup_plugin::registry::PluginRegistry;
use startup_resource::ResourceLocator;

use crate::handlers::{channel, health, render};
use crate::middleware::logging::request_logging;
use crate::middleware::session::{SessionStore, session_layer};
use crate::state::AppState;

/// Router stages dispatched after the `api` stage.
const ROUTER_STAGES: [HookPoint; 4] = [
    HookPoint::Middleware,
    HookPoint::ServerRoutes,
    HookPoint::Logs,
    HookPoint::Static,
];

/// Instantiates plugins and builds the data backend.
pub fn build_state(config: Arc<AppConfig>, registry: &PluginRegistry) -> AppResult<AppState> {
    let dispatcher = HookDispatcher::from_registry(registry, &config.plugins)?;
    info!(
        plugins = dispatcher.plugins().len(),
        policy = ?dispatcher.policy(),
        "Plugins loaded"
    );

    let mut schema = Schema::new();
    dispatcher.transform_schema(&mut schema)?;

    let mut models = OrmRegistry::new();
    dispatcher.orm(&mut models)?;

    let backend = Arc::new(Backend::new(schema, models, Arc::clone(&config)));
    dispatcher.before_start(&backend)?;
    debug!(
        collections = backend.schema().len(),
        models = backend.models().bindings().len(),
        "Backend ready"
    );

    Ok(AppState {
        locator: Arc::new(ResourceLocator::new(config.resources.clone())),
        backend,
        dispatcher,
        sessions: Arc::new(SessionStore::from_config(&config.server)),
        config,
    })
}

/// Assembles the router through the plugin stages, then adds core routes and layers.
///
/// The session layer wraps the fully assembled router, so every route,
/// including those added by plugins, sees a `Session` extension.
pub fn build_app(state: AppState) -> AppResult<Router> {
    let config = Arc::clone(&state.config);
    let dispatcher = &state.dispatcher;
    let mut app = ServerApp::new(Arc::clone(&config));

    dispatcher.dispatch_app(HookPoint::BeforeSession, &mut app)?;
    dispatcher.dispatch_app(HookPoint::AfterSession, &mut app)?;

    let mut api = ServerApp::new(Arc::clone(&config));
    dispatcher.dispatch_app(HookPoint::Api, &mut api)?;
    api.route("/health", get(health::health).with_state(state.clone()));
    app.nest("/api", api.into_router());

    for point in ROUTER_STAGES {
        dispatcher.dispatch_app(point, &mut app)?;
    }

    app.route(CHANNEL_PATH, get(channel::channel).with_state(state.clone()))
        .route("/", get(render::render_default).with_state(state.clone()))
        .route("/{app}", get(render::render_app).with_state(state.clone()));

    let build_prefix = config.resources.build_client_path.trim_end_matches('/');
    if !build_prefix.is_empty() {
        app.nest_service(build_prefix, ServeDir::new(config.resources.build_dir()));
    }

    Ok(app
        .into_router()
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ))
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http()))
}

/// Serves the app on a bound listener until `shutdown` resolves.
///
/// Dispatches `createServer` before accepting connections. After `shutdown`
/// resolves, open connections get `server.shutdown_grace_seconds` to finish.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state.clone())?;
    let local_addr = listener.local_addr()?;

    state
        .dispatcher
        .create_server(&ServerHandle { local_addr })?;
    info!(addr = %local_addr, "Startup server listening");

    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let (grace_tx, grace_rx) = oneshot::channel::<()>();

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown.await;
        let _ = grace_tx.send(());
    });

    tokio::select! {
        result = server.into_future() => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        () = grace_deadline(grace_rx, grace) => {
            warn!(grace_seconds = grace.as_secs(), "Connections still open after grace period, stopping");
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Loads plugins from `registry`, binds `server.bind_address()` and serves until Ctrl-C.
pub async fn run_server(config: Arc<AppConfig>, registry: &PluginRegistry) -> AppResult<()> {
    info!("Starting Startup server...");

    report_uncompiled_plugins(&config, registry).await;
    let state = build_state(Arc::clone(&config), registry)?;

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    serve(listener, state, shutdown_signal()).await
}

/// Warns about plugin packages in the project manifest that this binary does not include.
async fn report_uncompiled_plugins(config: &AppConfig, registry: &PluginRegistry) {
    let manifest = config.plugin_manifest_path();
    if !tokio::fs::try_exists(&manifest).await.unwrap_or(false) {
        debug!(manifest = %manifest.display(), "No package manifest, skipping plugin discovery");
        return;
    }

    match discovery::discover(&manifest).await {
        Ok(found) => {
            for plugin in found.iter().filter(|p| !registry.contains(&p.package)) {
                warn!(
                    package = %plugin.package,
                    entry = %plugin.entry,
                    "Plugin package is not compiled into this server"
                );
            }
        }
        Err(e) => warn!(error = %e, "Plugin discovery failed"),
    }
}

async fn grace_deadline(started: oneshot::Receiver<()>, grace: Duration) {
    match started.await {
        Ok(()) => tokio::time::sleep(grace).await,
        Err(_) => std::future::pending::<()>().await,
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use startup_plugin::hooks::set::ServerHookSet;
    use startup_plugin::registry::PluginDefinition;

    fn recording_plugin(name: &str, calls: Arc<Mutex<Vec<String>>>) -> PluginDefinition {
        let plugin = name.to_string();
        PluginDefinition::builder(name)
            .server(move |_| {
                let record = |hook: &'static str| {
                    let calls = Arc::clone(&calls);
                    let plugin = plugin.clone();
                    move || calls.lock().unwrap().push(format!("{plugin}:{hook}"))
                };
                let (schema, orm, start) = (record("schema"), record("orm"), record("start"));
                let (before, after, api) = (record("before"), record("after"), record("api"));
                let statics = record("static");
                Ok(ServerHookSet::new()
                    .on_transform_schema(move |_| Ok(schema()))
                    .on_orm(move |_| Ok(orm()))
                    .on_before_start(move |_| Ok(start()))
                    .on_before_session(move |_| Ok(before()))
                    .on_after_session(move |_| Ok(after()))
                    .on_api(move |_| Ok(api()))
                    .on_static(move |_| Ok(statics())))
            })
            .build()
    }

    #[test]
    fn test_boot_dispatch_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PluginRegistry::new();
        registry
            .register(recording_plugin("a", Arc::clone(&calls)))
            .unwrap();
        registry
            .register(recording_plugin("b", Arc::clone(&calls)))
            .unwrap();

        let state = build_state(Arc::new(AppConfig::default()), &registry).unwrap();
        build_app(state).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "a:schema", "b:schema", "a:orm", "b:orm", "a:start", "b:start", "a:before",
                "b:before", "a:after", "b:after", "a:api", "b:api", "a:static", "b:static",
            ]
        );
    }

    #[test]
    fn test_failing_boot_hook_aborts_startup() {
        let mut registry = PluginRegistry::new();
        registry
            .register(
                PluginDefinition::builder("broken")
                    .server(|_| {
                        Ok(ServerHookSet::new()
                            .on_orm(|_| Err(AppError::internal("no database"))))
                    })
                    .build(),
            )
            .unwrap();

        let err = build_state(Arc::new(AppConfig::default()), &registry).unwrap_err();
        assert!(err.message.contains("broken"));
        assert!(err.message.contains("orm"));
    }

    #[tokio::test]
    async fn test_serve_dispatches_create_server_and_stops() {
        let bound = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&bound);

        let mut registry = PluginRegistry::new();
        registry
            .register(
                PluginDefinition::builder("listener")
                    .server(move |_| {
                        let seen = Arc::clone(&seen);
                        Ok(ServerHookSet::new().on_create_server(move |server| {
                            *seen.lock().unwrap() = Some(server.local_addr);
                            Ok(())
                        }))
                    })
                    .build(),
            )
            .unwrap();

        let state = build_state(Arc::new(AppConfig::default()), &registry).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        serve(listener, state, async {}).await.unwrap();
        assert_eq!(*bound.lock().unwrap(), Some(addr));
    }
}

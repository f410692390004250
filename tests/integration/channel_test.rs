//! Integration tests for the real-time channel: upgrade hooks, relay, and client bootstrap.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use startup_client::{
    BootstrapOptions, ClientBootstrap, Platform, RuntimeEnv, SyncConnection, WebSocketConnector,
};
use startup_core::config::AppConfig;
use startup_core::config::plugin::PluginSettings;
use startup_core::error::ErrorKind;
use startup_plugin::hooks::dispatcher::HookDispatcher;
use startup_plugin::registry::PluginRegistry;
use startup_server::AppState;

struct RunningServer {
    base_url: String,
    state: AppState,
    stop: Option<oneshot::Sender<()>>,
}

impl RunningServer {
    async fn start(config: AppConfig, registry: PluginRegistry) -> Self {
        let state = startup_server::build_state(Arc::new(config), &registry).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (stop, stopped) = oneshot::channel::<()>();
        let serve_state = state.clone();
        tokio::spawn(async move {
            startup_server::serve(listener, serve_state, async move {
                let _ = stopped.await;
            })
            .await
            .unwrap();
        });

        Self {
            base_url,
            state,
            stop: Some(stop),
        }
    }

    async fn connect(&self, config: &AppConfig) -> Box<dyn SyncConnection> {
        let bootstrap = ClientBootstrap::new(
            Arc::new(config.clone()),
            RuntimeEnv::new(Platform::Native, true),
            HookDispatcher::new(Vec::new(), Default::default()),
        );
        let session = bootstrap
            .run(
                BootstrapOptions::with_base_url(self.base_url.clone()),
                &WebSocketConnector,
            )
            .await
            .unwrap();
        session.connection.unwrap()
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn recv(connection: &mut Box<dyn SyncConnection>) -> Option<String> {
    tokio::time::timeout(Duration::from_secs(5), connection.recv())
        .await
        .expect("Timed out waiting for channel message")
        .unwrap()
}

#[tokio::test]
async fn test_messages_relay_between_clients() {
    let config = AppConfig::default();
    let server = RunningServer::start(config.clone(), PluginRegistry::new()).await;

    let mut alice = server.connect(&config).await;
    let mut bob = server.connect(&config).await;

    // Both sockets must be subscribed before publishing.
    for _ in 0..50 {
        if server.state.backend.connection_count() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(server.state.backend.connection_count(), 2);

    alice.send(r#"{"op":"ping"}"#.to_string()).await.unwrap();

    assert_eq!(recv(&mut bob).await.as_deref(), Some(r#"{"op":"ping"}"#));
    assert_eq!(recv(&mut alice).await.as_deref(), Some(r#"{"op":"ping"}"#));

    alice.close().await.unwrap();
    bob.close().await.unwrap();
}

#[tokio::test]
async fn test_bootstrap_fails_when_server_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let bootstrap = ClientBootstrap::new(
        Arc::new(AppConfig::default()),
        RuntimeEnv::new(Platform::Native, true),
        HookDispatcher::new(Vec::new(), Default::default()),
    );
    let err = bootstrap
        .run(BootstrapOptions::with_base_url(base_url), &WebSocketConnector)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Connection);
}

#[tokio::test]
async fn test_http_fallback_is_reported_unsupported() {
    let bootstrap = ClientBootstrap::new(
        Arc::new(AppConfig::default()),
        RuntimeEnv::new(Platform::Native, true),
        HookDispatcher::new(Vec::new(), Default::default()),
    );
    let options = BootstrapOptions {
        base_url: Some("http://127.0.0.1:9".to_string()),
        force_http_fallback: Some(true),
        ..Default::default()
    };

    let err = bootstrap
        .run(options, &WebSocketConnector)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotImplemented);
}

fn token_registry(config: &mut AppConfig) -> PluginRegistry {
    config.plugins.entries.insert(
        plugin_status::PLUGIN_NAME.to_string(),
        PluginSettings {
            server: json!({ "channel_token": "secret" }),
            ..Default::default()
        },
    );
    let mut registry = PluginRegistry::new();
    registry.register(plugin_status::plugin()).unwrap();
    registry.apply_config(&config.plugins);
    registry
}

#[tokio::test]
async fn test_upgrade_hook_rejects_request() {
    for isolate in [false, true] {
        let project = tempfile::tempdir().unwrap();
        let mut config = helpers::project_config(
            project.path(),
            startup_core::config::resources::BuildMode::Development,
        );
        config.plugins.isolate_failures = isolate;
        let registry = token_registry(&mut config);
        let app = helpers::TestApp::with_config(project, config, registry);

        let rejected = app.request("GET", "/channel", &[]).await;
        assert_eq!(rejected.status, StatusCode::FORBIDDEN, "isolate = {isolate}");
        assert_eq!(rejected.body["error"], "FORBIDDEN");

        // Passes the hook, then fails as a plain GET without upgrade headers.
        let accepted = app
            .request("GET", "/channel", &[("x-startup-token", "secret")])
            .await;
        assert_ne!(accepted.status, StatusCode::FORBIDDEN);

        let health = app.request("GET", "/api/health", &[]).await;
        assert_eq!(health.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_rejected_upgrade_keeps_server_running() {
    let mut config = AppConfig::default();
    let registry = token_registry(&mut config);
    let server = RunningServer::start(config.clone(), registry).await;

    let bootstrap = ClientBootstrap::new(
        Arc::new(config),
        RuntimeEnv::new(Platform::Native, true),
        HookDispatcher::new(Vec::new(), Default::default()),
    );
    let err = bootstrap
        .run(
            BootstrapOptions::with_base_url(server.base_url.clone()),
            &WebSocketConnector,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Connection);
    assert!(err.message.contains("403"));

    assert_eq!(server.state.backend.connection_count(), 0);
}

//! Integration tests for plugin registration and hook dispatch during server boot.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::routing::get;
use http::StatusCode;
use serde_json::json;

use startup_core::config::AppConfig;
use startup_core::config::plugin::PluginSettings;
use startup_core::config::resources::BuildMode;
use startup_core::error::AppError;
use startup_plugin::prelude::*;
use startup_plugin::registry::PluginRegistry;

fn counting_plugin(name: &str, enabled: bool, calls: Arc<AtomicUsize>) -> PluginDefinition {
    PluginBuilder::new(name)
        .enabled(enabled)
        .server(move |_| {
            let calls = Arc::clone(&calls);
            Ok(ServerHookSet::new().on_api(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
        })
        .build()
}

#[tokio::test]
async fn test_disabled_plugin_hooks_never_run() {
    let own_flag = Arc::new(AtomicUsize::new(0));
    let config_flag = Arc::new(AtomicUsize::new(0));
    let enabled = Arc::new(AtomicUsize::new(0));

    let mut registry = PluginRegistry::new();
    registry
        .register(counting_plugin("off", false, Arc::clone(&own_flag)))
        .unwrap();
    registry
        .register(counting_plugin("muted", true, Arc::clone(&config_flag)))
        .unwrap();
    registry
        .register(counting_plugin("on", true, Arc::clone(&enabled)))
        .unwrap();

    let project = tempfile::tempdir().unwrap();
    let mut config = helpers::project_config(project.path(), BuildMode::Development);
    config.plugins.entries.insert(
        "muted".to_string(),
        PluginSettings {
            enabled: Some(false),
            ..Default::default()
        },
    );
    registry.apply_config(&config.plugins);

    let app = helpers::TestApp::with_config(project, config, registry);

    assert_eq!(own_flag.load(Ordering::SeqCst), 0);
    assert_eq!(config_flag.load(Ordering::SeqCst), 0);
    assert_eq!(enabled.load(Ordering::SeqCst), 1);

    let health = app.request("GET", "/api/health", &[]).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["plugins"], json!(["on"]));
}

#[tokio::test]
async fn test_plugin_routes_mount_in_their_stage() {
    let mut registry = PluginRegistry::new();
    registry
        .register(
            PluginBuilder::new("routes")
                .server(|_| {
                    Ok(ServerHookSet::new()
                        .on_api(|app| {
                            app.route("/todos", get(|| async { "todos" }));
                            Ok(())
                        })
                        .on_server_routes(|app| {
                            app.route("/about", get(|| async { "about" }));
                            Ok(())
                        }))
                })
                .build(),
        )
        .unwrap();

    let app = helpers::TestApp::new(registry);

    let api = app.request("GET", "/api/todos", &[]).await;
    assert_eq!(api.status, StatusCode::OK);
    assert_eq!(api.text, "todos");

    let page = app.request("GET", "/about", &[]).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.text, "about");

    let unnested = app.request("GET", "/todos", &[]).await;
    assert_ne!(unnested.text, "todos");
}

#[tokio::test]
async fn test_status_plugin_endpoint_and_schema() {
    let mut registry = PluginRegistry::new();
    registry
        .register(
            PluginBuilder::new("schema")
                .server(|_| {
                    Ok(ServerHookSet::new().on_transform_schema(|schema| {
                        schema.insert("todos", json!({ "properties": {} }));
                        Ok(())
                    }))
                })
                .build(),
        )
        .unwrap();
    registry.register(plugin_status::plugin()).unwrap();

    let project = tempfile::tempdir().unwrap();
    let mut config = helpers::project_config(project.path(), BuildMode::Development);
    config.plugins.entries.insert(
        plugin_status::PLUGIN_NAME.to_string(),
        PluginSettings {
            server: json!({ "path": "/ping", "timestamps": true }),
            ..Default::default()
        },
    );
    registry.apply_config(&config.plugins);

    let app = helpers::TestApp::with_config(project, config, registry);

    let todos = app.state.backend.schema().get("todos").unwrap();
    assert_eq!(todos["properties"]["createdAt"]["type"], "string");

    let status = app.request("GET", "/api/ping", &[]).await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["plugin"], "status");
    assert_eq!(status.body["collections"], 1);
}

#[test]
fn test_invalid_plugin_options_abort_boot() {
    let mut registry = PluginRegistry::new();
    registry.register(plugin_status::plugin()).unwrap();

    let mut config = AppConfig::default();
    config.plugins.entries.insert(
        plugin_status::PLUGIN_NAME.to_string(),
        PluginSettings {
            server: json!({ "path": "no-slash" }),
            ..Default::default()
        },
    );
    registry.apply_config(&config.plugins);

    let err = startup_server::build_state(Arc::new(config), &registry).unwrap_err();
    assert!(err.message.contains("status"));
}

#[test]
fn test_failing_hook_is_fatal_unless_isolated() {
    let calls = Arc::new(Mutex::new(Vec::new()));

    let build_registry = |calls: Arc<Mutex<Vec<&'static str>>>| {
        let mut registry = PluginRegistry::new();
        registry
            .register(
                PluginBuilder::new("broken")
                    .server(|_| {
                        Ok(ServerHookSet::new()
                            .on_before_start(|_| Err(AppError::internal("boom"))))
                    })
                    .build(),
            )
            .unwrap();
        registry
            .register(
                PluginBuilder::new("healthy")
                    .server(move |_| {
                        let calls = Arc::clone(&calls);
                        Ok(ServerHookSet::new().on_before_start(move |_| {
                            calls.lock().unwrap().push("healthy");
                            Ok(())
                        }))
                    })
                    .build(),
            )
            .unwrap();
        registry
    };

    let registry = build_registry(Arc::clone(&calls));
    let err = startup_server::build_state(Arc::new(AppConfig::default()), &registry).unwrap_err();
    assert!(err.message.contains("broken"));
    assert!(calls.lock().unwrap().is_empty());

    let mut config = AppConfig::default();
    config.plugins.isolate_failures = true;
    let registry = build_registry(Arc::clone(&calls));
    startup_server::build_state(Arc::new(config), &registry).unwrap();
    assert_eq!(*calls.lock().unwrap(), vec!["healthy"]);
}

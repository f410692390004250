//! Shared test helpers for integration tests.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use startup_core::config::AppConfig;
use startup_core::config::resources::BuildMode;
use startup_plugin::registry::PluginRegistry;
use startup_server::AppState;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state behind the router
    pub state: AppState,
    /// Project directory the config points at
    pub project: TempDir,
}

impl TestApp {
    /// Create a development-mode app over an empty project directory
    pub fn new(registry: PluginRegistry) -> Self {
        let project = tempfile::tempdir().expect("Failed to create project dir");
        let config = project_config(project.path(), BuildMode::Development);
        Self::with_config(project, config, registry)
    }

    /// Create a production-mode app whose build manifest holds `manifest`
    pub fn production(manifest: Value, registry: PluginRegistry) -> Self {
        let project = tempfile::tempdir().expect("Failed to create project dir");
        write_manifest(project.path(), &manifest);
        let config = project_config(project.path(), BuildMode::Production);
        Self::with_config(project, config, registry)
    }

    /// Create an app from an explicit config
    pub fn with_config(project: TempDir, config: AppConfig, registry: PluginRegistry) -> Self {
        let state = startup_server::build_state(Arc::new(config), &registry)
            .expect("Failed to build state");
        let router = startup_server::build_app(state.clone()).expect("Failed to build app");

        Self {
            router,
            state,
            project,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);

        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req.body(Body::empty()).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub text: String,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
}

/// Config pointing at `project` in the given build mode
pub fn project_config(project: &Path, mode: BuildMode) -> AppConfig {
    let mut config = AppConfig::default();
    config.resources.project_path = project.display().to_string();
    config.resources.mode = mode;
    config
}

/// Writes `build/client/assets.json` under `project`
pub fn write_manifest(project: &Path, manifest: &Value) {
    let dir = project.join("build/client");
    std::fs::create_dir_all(&dir).expect("Failed to create build dir");
    std::fs::write(
        dir.join("assets.json"),
        serde_json::to_vec_pretty(manifest).expect("Failed to serialize manifest"),
    )
    .expect("Failed to write manifest");
}

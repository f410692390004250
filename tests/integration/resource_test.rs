//! Integration tests for asset resolution driven by environment configuration.

mod helpers;

use std::collections::HashMap;

use serde_json::json;

use startup_core::config::AppConfig;
use startup_core::error::ErrorKind;
use startup_resource::{ResourceLocator, ResourceOptions};

fn load_config(dir: &std::path::Path, vars: &[(&str, &str)]) -> AppConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::load_from(&dir.join("config"), "test", |key| vars.get(key).cloned())
        .expect("Failed to load config")
}

#[tokio::test]
async fn test_production_paths_from_environment() {
    let project = tempfile::tempdir().unwrap();
    let static_dir = project.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(
        static_dir.join("assets.json"),
        json!({ "app": { "js": "app.abc123.js" } }).to_string(),
    )
    .unwrap();

    let project_path = project.path().display().to_string();
    let config = load_config(
        project.path(),
        &[
            ("NODE_ENV", "production"),
            ("PROJECT_PATH", &project_path),
            ("BUILD_CLIENT_PATH", "/static/"),
            ("BUILD_REFERENCE_URL", "https://cdn.example.com/"),
        ],
    );
    let locator = ResourceLocator::new(config.resources);
    let options = ResourceOptions::default();

    assert_eq!(
        locator.hash("app", "bundle", &options).await.unwrap().as_deref(),
        Some("abc123")
    );
    assert_eq!(
        locator.resource_path("bundle", "app", &options).await.unwrap(),
        "/static/app.abc123.js"
    );
    assert_eq!(
        locator
            .resource_path("bundle", "app", &ResourceOptions::absolute())
            .await
            .unwrap(),
        "https://cdn.example.com/static/app.abc123.js"
    );
    assert_eq!(
        locator.resource_path("style", "app", &options).await.unwrap(),
        "/static/app.css"
    );
}

#[tokio::test]
async fn test_development_paths_from_environment() {
    let project = tempfile::tempdir().unwrap();
    let config = load_config(
        project.path(),
        &[("NODE_ENV", "development"), ("DEV_PORT", "4010")],
    );
    let locator = ResourceLocator::new(config.resources);
    let options = ResourceOptions::default();

    assert_eq!(
        locator.resource_path("bundle", "app", &options).await.unwrap(),
        "http://localhost:4010/build/client/app.js"
    );
    assert_eq!(locator.hash("app", "bundle", &options).await.unwrap(), None);
    assert_eq!(
        locator.resource_path("style", "app", &options).await.unwrap(),
        "/build/client/app.css"
    );
}

#[tokio::test]
async fn test_repeated_lookups_are_stable_and_cached() {
    let project = tempfile::tempdir().unwrap();
    helpers::write_manifest(
        project.path(),
        &json!({ "main": { "js": "main.f00d.js", "css": "main.css" } }),
    );
    let config = helpers::project_config(
        project.path(),
        startup_core::config::resources::BuildMode::Production,
    );
    let locator = ResourceLocator::new(config.resources);
    let options = ResourceOptions::default();

    let first = locator.resource_path("bundle", "main", &options).await.unwrap();
    for _ in 0..5 {
        assert_eq!(
            locator.resource_path("bundle", "main", &options).await.unwrap(),
            first
        );
    }

    let stats = locator.stats();
    assert_eq!(stats.path_computations, 1);
    assert_eq!(stats.manifest_loads, 1);
}

#[tokio::test]
async fn test_failures_surface_to_caller() {
    let project = tempfile::tempdir().unwrap();
    let config = helpers::project_config(
        project.path(),
        startup_core::config::resources::BuildMode::Production,
    );
    let locator = ResourceLocator::new(config.resources);
    let options = ResourceOptions::default();

    let err = locator
        .resource_path("script", "main", &options)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = locator
        .resource_path("bundle", "main", &options)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Resource);
    assert!(err.message.contains("assets.json"));
}

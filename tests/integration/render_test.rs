//! Integration tests for the HTML shell, session cookie, and health endpoint.

mod helpers;

use http::StatusCode;
use http::header::{CONTENT_TYPE, SET_COOKIE};
use serde_json::json;

use startup_core::config::resources::BuildMode;
use startup_plugin::registry::PluginRegistry;

#[tokio::test]
async fn test_development_shell_points_at_devserver() {
    let app = helpers::TestApp::new(PluginRegistry::new());

    let response = app.request("GET", "/", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response.headers[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(response.text.contains(r#"href="/build/client/main.css""#));
    assert!(
        response
            .text
            .contains(r#"src="http://localhost:3010/build/client/main.js""#)
    );
}

#[tokio::test]
async fn test_production_shell_uses_hashed_bundle() {
    let app = helpers::TestApp::production(
        json!({ "admin": { "js": "admin.9f8e7d.js" } }),
        PluginRegistry::new(),
    );

    let response = app.request("GET", "/admin", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains(r#"src="/build/client/admin.9f8e7d.js""#));
    assert!(response.text.contains(r#"href="/build/client/admin.css""#));
}

#[tokio::test]
async fn test_locator_failure_is_server_error() {
    let app = helpers::TestApp::production(
        json!({ "admin": { "js": "admin.js" } }),
        PluginRegistry::new(),
    );

    let missing = app.request("GET", "/main", &[]).await;
    assert_eq!(missing.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(missing.body["error"], "RESOURCE");

    let malformed = app.request("GET", "/admin", &[]).await;
    assert_eq!(malformed.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_invalid_app_name_is_not_found() {
    let app = helpers::TestApp::new(PluginRegistry::new());

    let response = app.request("GET", "/favicon.ico", &[]).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_cookie_issued_once() {
    let app = helpers::TestApp::new(PluginRegistry::new());

    let first = app.request("GET", "/", &[]).await;
    let cookie = first.headers[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("startup.sid="));

    let pair = cookie.split(';').next().unwrap();
    let second = app.request("GET", "/", &[("cookie", pair)]).await;
    assert!(second.headers.get(SET_COOKIE).is_none());

    let health = app.request("GET", "/api/health", &[("cookie", pair)]).await;
    assert_eq!(health.body["sessions"], 1);
}

#[tokio::test]
async fn test_cookieless_requests_do_not_grow_sessions_unbounded() {
    let project = tempfile::tempdir().unwrap();
    let mut config = helpers::project_config(project.path(), BuildMode::Development);
    config.server.session_capacity = 10;
    let app = helpers::TestApp::with_config(project, config, PluginRegistry::new());

    for _ in 0..200 {
        let response = app.request("GET", "/api/health", &[]).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    assert!(app.state.sessions.len().await <= 10);
}

#[tokio::test]
async fn test_health_reports_mode() {
    let app = helpers::TestApp::production(json!({}), PluginRegistry::new());

    let response = app.request("GET", "/api/health", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["mode"], "production");
    assert_eq!(response.body["channel_connections"], 0);
}

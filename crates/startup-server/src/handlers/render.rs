//! Server-side rendered HTML shell.
//!
//! The shell carries no markup of its own beyond the mount point; asset URLs
//! come from the resource locator so they follow the build mode.

use axum::extract::{Path, State};
use axum::response::Html;
use tracing::debug;

use startup_core::error::AppError;
use startup_resource::{ResourceOptions, ResourceType};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
pub async fn render_default(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let app = state.config.server.default_app.clone();
    render(&state, &app).await
}

/// GET /{app}
pub async fn render_app(
    State(state): State<AppState>,
    Path(app): Path<String>,
) -> Result<Html<String>, ApiError> {
    if !is_app_name(&app) {
        return Err(AppError::not_found(format!("No app named '{app}'")).into());
    }
    render(&state, &app).await
}

async fn render(state: &AppState, app: &str) -> Result<Html<String>, ApiError> {
    let options = ResourceOptions::default();
    let style = state
        .locator
        .path_for(ResourceType::Style, app, &options)
        .await?;
    let bundle = state
        .locator
        .path_for(ResourceType::Bundle, app, &options)
        .await?;

    debug!(app = %app, style = %style, bundle = %bundle, "Rendering shell");
    Ok(Html(shell(app, &style, &bundle)))
}

/// App names are path segments made of ASCII letters, digits, `-` and `_`.
pub fn is_app_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Builds the HTML page for an app.
pub fn shell(app: &str, style: &str, bundle: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{app}</title>
<link rel="stylesheet" href="{style}">
</head>
<body>
<div id="app"></div>
<script src="{bundle}"></script>
</body>
</html>
"#
    )
}

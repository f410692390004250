//! Health check handler.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the server answers.
    pub status: String,
    /// Server version.
    pub version: String,
    /// `development` or `production`.
    pub mode: String,
    /// Enabled plugins in dispatch order.
    pub plugins: Vec<String>,
    /// Open channel sockets.
    pub channel_connections: usize,
    /// Live sessions.
    pub sessions: u64,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.config.resources.mode.as_str().to_string(),
        plugins: state
            .dispatcher
            .plugins()
            .iter()
            .map(|p| p.name.clone())
            .collect(),
        channel_connections: state.backend.connection_count(),
        sessions: state.sessions.len().await,
    })
}

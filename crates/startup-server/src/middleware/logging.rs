//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::http::header::UPGRADE;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

/// Logs method, path, status and duration. Server errors are logged at `warn`.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let upgrade = request.headers().contains_key(UPGRADE);
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();

    if response.status().is_server_error() {
        warn!(%method, %path, status, duration_ms, upgrade, "Request failed");
    } else {
        info!(%method, %path, status, duration_ms, upgrade, "HTTP request");
    }

    response
}

//! Real-time channel endpoint.
//!
//! Each upgrade request is offered to the `serverUpgrade` hooks first. A
//! failing hook rejects only that request. Accepted sockets join the
//! backend relay: text frames from any socket are fanned out to all of them.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use startup_core::error::AppError;
use startup_plugin::api::context::{Backend, UpgradeRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /channel
pub async fn channel(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let request = UpgradeRequest {
        path: uri.path().to_string(),
        headers,
    };

    let report = state.dispatcher.server_upgrade(&request).map_err(|e| {
        warn!(error = %e, "Channel upgrade rejected by plugin");
        AppError::forbidden(e.message)
    })?;

    if !report.is_clean() {
        let plugins: Vec<&str> = report.failures.iter().map(|f| f.plugin.as_str()).collect();
        warn!(plugins = ?plugins, "Channel upgrade rejected by plugin");
        return Err(AppError::forbidden("Channel upgrade rejected").into());
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let backend = Arc::clone(&state.backend);
    Ok(ws.on_upgrade(move |socket| relay(backend, socket)))
}

/// Pumps frames between one socket and the backend relay until either side closes.
async fn relay(backend: Arc<Backend>, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut relay_rx = backend.subscribe();
    let open = backend.connection_opened();
    info!(connections = open, "Channel socket opened");

    let outbound = tokio::spawn(async move {
        loop {
            match relay_rx.recv().await {
                Ok(message) => {
                    if ws_tx.send(Message::Text(message.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Channel socket lagging, messages dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let receivers = backend.publish(text.as_str().to_owned());
                debug!(receivers, "Relayed channel message");
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "Channel socket error");
                break;
            }
        }
    }

    outbound.abort();
    let open = backend.connection_closed();
    info!(connections = open, "Channel socket closed");
}

//! Connection seam to the real-time sync transport.

use std::fmt;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};

use startup_core::error::AppError;
use startup_core::result::AppResult;
use startup_plugin::api::client::ChannelOptions;

/// An open model connection.
#[async_trait]
pub trait SyncConnection: Send + fmt::Debug {
    /// Sends one message.
    async fn send(&mut self, message: String) -> AppResult<()>;

    /// Receives the next message, `None` once the server closed the channel.
    async fn recv(&mut self) -> AppResult<Option<String>>;

    /// Closes the connection.
    async fn close(&mut self) -> AppResult<()>;
}

/// Opens model connections.
#[async_trait]
pub trait SyncConnector: Send + Sync {
    /// Connects using resolved channel options.
    async fn connect(&self, channel: &ChannelOptions) -> AppResult<Box<dyn SyncConnection>>;
}

/// Connector speaking WebSocket to the server's `/channel` endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl SyncConnector for WebSocketConnector {
    async fn connect(&self, channel: &ChannelOptions) -> AppResult<Box<dyn SyncConnection>> {
        if channel.force_http_fallback {
            return Err(AppError::not_implemented(
                "HTTP fallback transport is not available on the WebSocket connector",
            ));
        }

        let url = channel.websocket_url();
        let (stream, _response) = connect_async(url.as_str()).await.map_err(|e| {
            AppError::connection(format!("Failed to connect to '{url}': {e}"))
        })?;

        info!(url = %url, "Channel connected");
        Ok(Box::new(WebSocketConnection { url, stream }))
    }
}

/// WebSocket-backed [`SyncConnection`].
pub struct WebSocketConnection {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl fmt::Debug for WebSocketConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketConnection")
            .field("url", &self.url)
            .finish()
    }
}

#[async_trait]
impl SyncConnection for WebSocketConnection {
    async fn send(&mut self, message: String) -> AppResult<()> {
        self.stream
            .send(Message::Text(message.into()))
            .await
            .map_err(|e| AppError::connection(format!("Channel send failed: {e}")))
    }

    async fn recv(&mut self) -> AppResult<Option<String>> {
        while let Some(frame) = self.stream.next().await {
            let frame =
                frame.map_err(|e| AppError::connection(format!("Channel receive failed: {e}")))?;

            match frame {
                Message::Text(text) => return Ok(Some(text.as_str().to_string())),
                Message::Close(_) => return Ok(None),
                other => debug!(frame = ?other, "Ignoring non-text channel frame"),
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> AppResult<()> {
        self.stream
            .close(None)
            .await
            .map_err(|e| AppError::connection(format!("Channel close failed: {e}")))
    }
}

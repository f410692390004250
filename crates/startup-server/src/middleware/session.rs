//! Cookie session layer.
//!
//! Every request leaves this layer with a [`Session`] extension. Requests
//! without a known `startup.sid` cookie get a fresh session and a
//! `Set-Cookie` header on the response.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use startup_core::config::server::ServerConfig;

use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "startup.sid";

/// Session attached to a request.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Session id.
    pub id: String,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
    /// Issued by this request.
    pub is_new: bool,
}

/// In-memory store of issued sessions.
///
/// Entries idle for longer than the TTL are dropped, and the store never holds
/// more than its capacity; the least recently used session is evicted first.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Cache<String, DateTime<Utc>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new(idle_ttl: Duration, capacity: u64) -> Self {
        let sessions = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle_ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { sessions }
    }

    /// Creates a store sized by the `server` settings.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Duration::from_secs(config.session_ttl_seconds),
            config.session_capacity,
        )
    }

    /// Looks up a live session, refreshing its idle timer.
    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).await.map(|created_at| Session {
            id: id.to_string(),
            created_at,
            is_new: false,
        })
    }

    /// Issues a new session.
    pub async fn issue(&self) -> Session {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            is_new: true,
        };
        self.sessions
            .insert(session.id.clone(), session.created_at)
            .await;
        session
    }

    /// Number of live sessions, after pending expirations and evictions are applied.
    pub async fn len(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Reads the session id from the `Cookie` header.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Attaches a [`Session`] to the request, issuing one when needed.
pub async fn session_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let known = match session_id(request.headers()) {
        Some(id) => state.sessions.get(&id).await,
        None => None,
    };
    let session = match known {
        Some(session) => session,
        None => {
            let session = state.sessions.issue().await;
            debug!(session_id = %session.id, "Issued session");
            session
        }
    };

    let set_cookie = session.is_new.then(|| {
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            session.id
        )
    });

    request.extensions_mut().insert(session);
    let mut response = next.run(request).await;

    if let Some(cookie) = set_cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().append(SET_COOKIE, cookie);
    }

    response
}

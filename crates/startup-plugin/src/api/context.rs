//! Server-side hook contexts.
//!
//! Each server hook point receives exactly one of these values.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::Request;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::MethodRouter;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tower::Service;

use startup_core::config::AppConfig;
use startup_core::error::AppError;
use startup_core::result::AppResult;

/// Router under assembly, handed to the router-building hooks.
///
/// Layers added through [`ServerApp::map`] wrap the routes that were added
/// before them, so stage order matters.
#[derive(Debug)]
pub struct ServerApp {
    router: Router,
    config: Arc<AppConfig>,
}

impl ServerApp {
    /// Creates an empty app.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            router: Router::new(),
            config,
        }
    }

    /// Application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Adds a route.
    pub fn route(&mut self, path: &str, method_router: MethodRouter) -> &mut Self {
        self.map(|router| router.route(path, method_router))
    }

    /// Merges another router.
    pub fn merge(&mut self, other: Router) -> &mut Self {
        self.map(|router| router.merge(other))
    }

    /// Nests a router under a path prefix.
    pub fn nest(&mut self, path: &str, other: Router) -> &mut Self {
        self.map(|router| router.nest(path, other))
    }

    /// Nests a service (e.g. a static directory) under a path prefix.
    pub fn nest_service<S>(&mut self, path: &str, service: S) -> &mut Self
    where
        S: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Response: IntoResponse,
        S::Future: Send + 'static,
    {
        self.map(|router| router.nest_service(path, service))
    }

    /// Applies an arbitrary transformation, typically `.layer(...)`.
    pub fn map(&mut self, f: impl FnOnce(Router) -> Router) -> &mut Self {
        let router = std::mem::take(&mut self.router);
        self.router = f(router);
        self
    }

    /// Finishes assembly.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Collection schemas keyed by collection name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    collections: BTreeMap<String, serde_json::Value>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a collection schema.
    pub fn insert(&mut self, collection: impl Into<String>, schema: serde_json::Value) {
        self.collections.insert(collection.into(), schema);
    }

    /// Returns a collection schema.
    pub fn get(&self, collection: &str) -> Option<&serde_json::Value> {
        self.collections.get(collection)
    }

    /// Returns a mutable collection schema.
    pub fn get_mut(&mut self, collection: &str) -> Option<&mut serde_json::Value> {
        self.collections.get_mut(collection)
    }

    /// Iterates collections mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut serde_json::Value)> {
        self.collections.iter_mut()
    }

    /// Collection names in order.
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Number of collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether the schema has no collections.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// A model bound to a document path pattern such as `users.*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelBinding {
    /// Dot-separated path pattern; `*` matches one segment.
    pub pattern: String,
    /// Model name.
    pub model: String,
}

/// Model registrations collected by the `orm` hook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrmRegistry {
    bindings: Vec<ModelBinding>,
}

impl OrmRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a model to a path pattern. Patterns are unique.
    pub fn register(&mut self, pattern: &str, model: &str) -> AppResult<()> {
        if self.bindings.iter().any(|b| b.pattern == pattern) {
            return Err(AppError::conflict(format!(
                "Model pattern '{pattern}' is already registered"
            )));
        }

        self.bindings.push(ModelBinding {
            pattern: pattern.to_string(),
            model: model.to_string(),
        });
        Ok(())
    }

    /// Finds the model whose pattern matches a document path.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|binding| pattern_matches(&binding.pattern, path))
            .map(|binding| binding.model.as_str())
    }

    /// All bindings in registration order.
    pub fn bindings(&self) -> &[ModelBinding] {
        &self.bindings
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('.');
    let mut path_segments = path.split('.');

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some("*"), Some(_)) => continue,
            (Some(p), Some(s)) if p == s => continue,
            _ => return false,
        }
    }
}

/// The data backend, built once schema and models are final.
///
/// Also carries the relay that fans messages out to every open channel socket.
#[derive(Debug)]
pub struct Backend {
    schema: Arc<Schema>,
    models: Arc<OrmRegistry>,
    config: Arc<AppConfig>,
    relay: broadcast::Sender<String>,
    connections: AtomicUsize,
}

impl Backend {
    /// Creates a backend.
    pub fn new(schema: Schema, models: OrmRegistry, config: Arc<AppConfig>) -> Self {
        let (relay, _) = broadcast::channel(1024);
        Self {
            schema: Arc::new(schema),
            models: Arc::new(models),
            config,
            relay,
            connections: AtomicUsize::new(0),
        }
    }

    /// Final schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Final model registry.
    pub fn models(&self) -> &OrmRegistry {
        &self.models
    }

    /// Application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Subscribes to relayed channel messages.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.relay.subscribe()
    }

    /// Relays a message to every subscriber. Returns the number of receivers.
    pub fn publish(&self, message: String) -> usize {
        self.relay.send(message).unwrap_or(0)
    }

    /// Records an opened channel connection.
    pub fn connection_opened(&self) -> usize {
        self.connections.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Records a closed channel connection.
    pub fn connection_closed(&self) -> usize {
        self.connections
            .fetch_sub(1, Ordering::Relaxed)
            .saturating_sub(1)
    }

    /// Open channel connections.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }
}

/// The bound listener, handed to `createServer`.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    /// Address the server is listening on.
    pub local_addr: SocketAddr,
}

/// An incoming connection upgrade, handed to `serverUpgrade`.
#[derive(Debug, Clone)]
pub struct UpgradeRequest {
    /// Request path.
    pub path: String,
    /// Request headers.
    pub headers: HeaderMap,
}

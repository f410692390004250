//! Plugin definition and hook implementations.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use axum::Json;
use axum::routing::get;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use startup_plugin::prelude::*;

use crate::config::{StatusClientConfig, StatusConfig};
use crate::error::StatusError;

/// Registered plugin name.
pub const PLUGIN_NAME: &str = "status";

/// Header carrying the channel token.
pub const TOKEN_HEADER: &str = "x-startup-token";

/// Body of the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Plugin name.
    pub plugin: &'static str,
    /// When the server hooks were built.
    pub started_at: DateTime<Utc>,
    /// Seconds since `started_at`.
    pub uptime_seconds: u64,
    /// Collections in the final schema, once known.
    pub collections: usize,
}

/// Builds the plugin definition.
pub fn plugin() -> PluginDefinition {
    PluginBuilder::new(PLUGIN_NAME)
        .server(|options| server_hooks(StatusConfig::from_options(options)?))
        .client(|options| client_hooks(StatusClientConfig::from_options(options)?))
        .build()
}

fn server_hooks(config: StatusConfig) -> AppResult<ServerHookSet> {
    let started_at = Utc::now();
    let started = Instant::now();
    let collections = Arc::new(AtomicUsize::new(0));

    let mut hooks = ServerHookSet::new();

    if config.timestamps {
        hooks = hooks.on_transform_schema(|schema| {
            add_timestamps(schema);
            Ok(())
        });
    }

    let seen = Arc::clone(&collections);
    hooks = hooks.on_before_start(move |backend| {
        seen.store(backend.schema().len(), Ordering::Relaxed);
        Ok(())
    });

    let path = config.path.clone();
    hooks = hooks.on_api(move |app| {
        let collections = Arc::clone(&collections);
        app.route(
            &path,
            get(move || async move {
                Json(StatusReport {
                    plugin: PLUGIN_NAME,
                    started_at,
                    uptime_seconds: started.elapsed().as_secs(),
                    collections: collections.load(Ordering::Relaxed),
                })
            }),
        );
        info!(path = %path, "Status endpoint mounted");
        Ok(())
    });

    if let Some(token) = config.channel_token {
        hooks = hooks.on_server_upgrade(move |request| check_token(request, &token));
    }

    Ok(hooks)
}

fn client_hooks(config: StatusClientConfig) -> AppResult<ClientHookSet> {
    let verbose = config.verbose;
    Ok(ClientHookSet::new()
        .on_init(move |channel| {
            if verbose {
                info!(
                    url = %channel.websocket_url(),
                    fallback = channel.force_http_fallback,
                    "Channel configured"
                );
            } else {
                debug!(url = %channel.websocket_url(), "Channel configured");
            }
            Ok(())
        })
        .on_connected(|channel| {
            info!(base_url = %channel.base_url, "Channel connected");
            Ok(())
        }))
}

/// Adds `createdAt` and `updatedAt` properties to every object schema.
fn add_timestamps(schema: &mut Schema) {
    for (collection, definition) in schema.iter_mut() {
        let Some(object) = definition.as_object_mut() else {
            debug!(collection = %collection, "Skipping non-object schema");
            continue;
        };

        let properties = object
            .entry("properties")
            .or_insert_with(|| Value::Object(Default::default()));

        if let Some(properties) = properties.as_object_mut() {
            for field in ["createdAt", "updatedAt"] {
                properties
                    .entry(field)
                    .or_insert_with(|| json!({ "type": "string", "format": "date-time" }));
            }
        }
    }
}

fn check_token(request: &UpgradeRequest, expected: &str) -> HookOutcome {
    let provided = request
        .headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided == Some(expected) {
        Ok(())
    } else {
        Err(StatusError::ChannelToken.into())
    }
}

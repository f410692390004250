//! # startup-server
//!
//! HTTP server for Startup built on Axum.
//!
//! Boots the plugin lifecycle (schema, models, backend), assembles the router
//! through the plugin hook stages, and serves the session layer, the
//! real-time `/channel` endpoint, and the HTML shell of each client app.

pub mod app;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use app::{build_app, build_state, run_server, serve};
pub use state::AppState;

//! # startup-core
//!
//! Core crate for the Startup application server. Contains the
//! configuration schemas with their loader and the unified error system.
//!
//! This crate has **no** internal dependencies on other Startup crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::AppConfig;
pub use error::AppError;
pub use result::AppResult;

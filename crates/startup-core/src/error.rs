//! Unified application error types for Startup.
//!
//! Every crate maps its internal errors into [`AppError`] so failures
//! propagate through the `?` operator with one type at the boundaries.

use std::fmt;
use thiserror::Error;

/// Failure category shared by the locator, the hook dispatcher, the server and the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested item was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A hook refused the request.
    Forbidden,
    /// Duplicate plugin registration.
    Conflict,
    /// An internal error occurred.
    Internal,
    /// Settings could not be loaded or are inconsistent.
    Configuration,
    /// An asset could not be resolved.
    Resource,
    /// A plugin factory or hook failed.
    Plugin,
    /// JSON could not be read or written.
    Serialization,
    /// A file system I/O error occurred.
    Io,
    /// The real-time channel could not be reached.
    Connection,
    /// The requested transport is not available.
    NotImplemented,
}

impl ErrorKind {
    /// Stable code used in logs and JSON error bodies.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL",
            Self::Configuration => "CONFIGURATION",
            Self::Resource => "RESOURCE",
            Self::Plugin => "PLUGIN",
            Self::Serialization => "SERIALIZATION",
            Self::Io => "IO",
            Self::Connection => "CONNECTION",
            Self::NotImplemented => "NOT_IMPLEMENTED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout Startup.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// Failure category.
    pub kind: ErrorKind,
    /// Message shown to operators and API callers.
    pub message: String,
    /// Underlying cause, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Creates an error without a cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error that keeps `source` as its cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Re-labels this error under `kind`, keeping it as the cause.
    ///
    /// The inner message is appended so the chain stays readable in a single log line.
    pub fn wrap(self, kind: ErrorKind, context: impl fmt::Display) -> Self {
        let message = format!("{context}: {}", self.message);
        Self::with_source(kind, message, self)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }
}

// Hook failures are copied into dispatch reports; the boxed cause is not clonable.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self::new(self.kind, self.message.clone())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Serialization, format!("Invalid JSON: {err}"), err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Failed to load settings: {err}"),
            err,
        )
    }
}

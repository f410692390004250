//! Convenience result type alias for Startup.

use crate::error::AppError;

/// A specialized `Result` type for Startup operations.
pub type AppResult<T> = Result<T, AppError>;

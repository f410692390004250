//! Error type for the status plugin.

use startup_core::error::AppError;
use thiserror::Error;

/// Status plugin errors.
#[derive(Debug, Error)]
pub enum StatusError {
    /// Options did not match the expected shape.
    #[error("Invalid status plugin options: {0}")]
    InvalidOptions(#[source] serde_json::Error),

    /// The endpoint path is not absolute.
    #[error("Status path must start with '/' and name a route: '{0}'")]
    InvalidPath(String),

    /// A channel upgrade did not carry the expected token.
    #[error("Missing or invalid channel token")]
    ChannelToken,
}

impl From<StatusError> for AppError {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::InvalidOptions(_) | StatusError::InvalidPath(_) => {
                AppError::configuration(err.to_string())
            }
            StatusError::ChannelToken => AppError::forbidden(err.to_string()),
        }
    }
}

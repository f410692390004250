//! Error type for asset resolution.

use std::path::PathBuf;

use startup_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Failures raised while resolving asset URLs. All of them are configuration
/// problems and are surfaced to the operator as-is.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The requested resource type is not `bundle` or `style`.
    #[error("Invalid resource type: {0}")]
    InvalidResourceType(String),

    /// The requested hash type is not known.
    #[error("Unknown hash type: {0}")]
    UnknownHashType(String),

    /// The asset manifest could not be read.
    #[error("Failed to load asset manifest '{path}': {source}")]
    FileLoad {
        /// Manifest location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The asset manifest is not valid JSON of the expected shape.
    #[error("Failed to parse asset manifest '{path}': {source}")]
    ManifestParse {
        /// Manifest location.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest has no bundle recorded for the app.
    #[error("No bundle recorded for app '{app}' in asset manifest")]
    MissingEntry {
        /// App name that was looked up.
        app: String,
    },

    /// The recorded filename is not of the `name.hash.js` shape.
    #[error("Bundle filename '{filename}' does not match '<name>.<hash>.js'")]
    Format {
        /// Offending filename.
        filename: String,
    },
}

impl From<ResourceError> for AppError {
    fn from(err: ResourceError) -> Self {
        let kind = match &err {
            ResourceError::InvalidResourceType(_) | ResourceError::UnknownHashType(_) => {
                ErrorKind::Validation
            }
            _ => ErrorKind::Resource,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

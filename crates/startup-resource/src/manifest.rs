//! The `assets.json` manifest written by the client build.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ResourceError;

/// Files recorded for one app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Hashed bundle filename, e.g. `main.abc123.js`.
    #[serde(default)]
    pub js: Option<String>,
    /// Stylesheet filename, when the build extracts one.
    #[serde(default)]
    pub css: Option<String>,
}

/// Mapping from app name to its built files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    entries: HashMap<String, AssetEntry>,
}

impl AssetManifest {
    /// Reads and parses the manifest at `path`.
    pub async fn load(path: &Path) -> Result<Self, ResourceError> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|source| ResourceError::FileLoad {
                path: path.to_path_buf(),
                source,
            })?;

        let manifest: Self =
            serde_json::from_slice(&raw).map_err(|source| ResourceError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            apps = manifest.entries.len(),
            "Asset manifest loaded"
        );

        Ok(manifest)
    }

    /// Returns the entry for an app.
    pub fn entry(&self, app: &str) -> Option<&AssetEntry> {
        self.entries.get(app)
    }

    /// Returns the recorded bundle filename for an app.
    pub fn bundle_file(&self, app: &str) -> Result<&str, ResourceError> {
        self.entry(app)
            .and_then(|entry| entry.js.as_deref())
            .ok_or_else(|| ResourceError::MissingEntry {
                app: app.to_string(),
            })
    }

    /// Number of apps in the manifest.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest lists no apps.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extracts `hash` from a `name.hash.js` filename.
pub fn extract_bundle_hash(filename: &str) -> Result<&str, ResourceError> {
    let format_error = || ResourceError::Format {
        filename: filename.to_string(),
    };

    let stem = filename.strip_suffix(".js").ok_or_else(format_error)?;
    let (name, hash) = stem.rsplit_once('.').ok_or_else(format_error)?;

    if name.is_empty() || hash.is_empty() || hash.contains('/') {
        return Err(format_error());
    }

    Ok(hash)
}

//! Discovery of plugin packages through package manifests.
//!
//! A package exposes a plugin by listing a `plugin` (or `./plugin`) entry in
//! the `exports` map of its `package.json`. Discovery reads the project's
//! manifest, then the manifest of every dependency under `node_modules/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use startup_core::error::AppError;
use startup_core::result::AppResult;

/// A package that exports a plugin entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPlugin {
    /// Package name.
    pub package: String,
    /// Module path of the plugin export.
    pub entry: String,
    /// Manifest the export was found in.
    pub manifest: PathBuf,
}

/// Scans the project manifest and its dependencies for plugin exports.
///
/// Only the project manifest must be readable. Dependencies whose manifest is
/// absent, unreadable or malformed are skipped. Results are sorted by package name.
pub async fn discover(project_manifest: &Path) -> AppResult<Vec<DiscoveredPlugin>> {
    let root = read_manifest(project_manifest).await?;
    let project_dir = project_manifest.parent().unwrap_or(Path::new("."));

    let mut found = Vec::new();
    if let Some(plugin) = plugin_export(&root, project_manifest) {
        found.push(plugin);
    }

    for dependency in dependency_names(&root) {
        let manifest_path = project_dir
            .join("node_modules")
            .join(&dependency)
            .join("package.json");

        match tokio::fs::try_exists(&manifest_path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(package = %dependency, "Dependency manifest not installed, skipping");
                continue;
            }
            Err(e) => {
                warn!(
                    package = %dependency,
                    error = %e,
                    "Cannot access dependency manifest, skipping"
                );
                continue;
            }
        }

        let manifest = match read_manifest(&manifest_path).await {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(
                    package = %dependency,
                    error = %e,
                    "Invalid dependency manifest, skipping"
                );
                continue;
            }
        };
        if let Some(plugin) = plugin_export(&manifest, &manifest_path) {
            found.push(plugin);
        }
    }

    found.sort_by(|a, b| a.package.cmp(&b.package));
    info!(
        manifest = %project_manifest.display(),
        plugins = found.len(),
        "Plugin discovery complete"
    );

    Ok(found)
}

async fn read_manifest(path: &Path) -> AppResult<Value> {
    let raw = tokio::fs::read(path).await.map_err(|e| {
        AppError::configuration(format!(
            "Failed to read package manifest '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::from_slice(&raw).map_err(|e| {
        AppError::configuration(format!(
            "Failed to parse package manifest '{}': {e}",
            path.display()
        ))
    })
}

fn dependency_names(manifest: &Value) -> Vec<String> {
    manifest
        .get("dependencies")
        .and_then(Value::as_object)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default()
}

fn plugin_export(manifest: &Value, path: &Path) -> Option<DiscoveredPlugin> {
    let package = manifest.get("name")?.as_str()?;
    let exports = manifest.get("exports")?.as_object()?;
    let target = exports.get("./plugin").or_else(|| exports.get("plugin"))?;

    Some(DiscoveredPlugin {
        package: package.to_string(),
        entry: export_target(target)?,
        manifest: path.to_path_buf(),
    })
}

/// Resolves a conditional export to a module path.
fn export_target(target: &Value) -> Option<String> {
    match target {
        Value::String(path) => Some(path.clone()),
        Value::Object(conditions) => ["default", "import", "require"]
            .iter()
            .find_map(|key| conditions.get(*key))
            .and_then(export_target),
        _ => None,
    }
}

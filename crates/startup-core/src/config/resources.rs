//! Build output and asset URL configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which kind of build the server is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Bundles come from the development server, no hashing.
    #[default]
    Development,
    /// Bundles are hashed files listed in the asset manifest.
    Production,
}

impl BuildMode {
    /// Maps a `NODE_ENV` value to a build mode.
    pub fn from_node_env(value: &str) -> Self {
        if value == "production" {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Returns the lowercase name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Asset resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Project root. Overridden by `PROJECT_PATH`.
    #[serde(default = "default_project_path")]
    pub project_path: String,
    /// URL path and on-disk directory of the client build. Overridden by `BUILD_CLIENT_PATH`.
    #[serde(default = "default_build_client_path")]
    pub build_client_path: String,
    /// Overridden by `NODE_ENV`.
    #[serde(default)]
    pub mode: BuildMode,
    /// Development server origin. Overridden by `DEVSERVER_URL`.
    #[serde(default)]
    pub devserver_url: Option<String>,
    /// Development server port used when `devserver_url` is unset. Overridden by `DEV_PORT`.
    #[serde(default = "default_dev_port")]
    pub dev_port: u16,
    /// CDN origin prepended to absolute bundle URLs. Overridden by `BUILD_REFERENCE_URL`.
    #[serde(default)]
    pub reference_url: Option<String>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            project_path: default_project_path(),
            build_client_path: default_build_client_path(),
            mode: BuildMode::default(),
            devserver_url: None,
            dev_port: default_dev_port(),
            reference_url: None,
        }
    }
}

impl ResourceConfig {
    /// Whether hashed production bundles are served.
    pub fn is_production(&self) -> bool {
        self.mode == BuildMode::Production
    }

    /// Origin of the development bundle server.
    pub fn devserver_origin(&self) -> String {
        match &self.devserver_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.dev_port),
        }
    }

    /// On-disk client build directory.
    pub fn build_dir(&self) -> PathBuf {
        PathBuf::from(&self.project_path).join(self.build_client_path.trim_start_matches('/'))
    }

    /// On-disk location of `assets.json`.
    pub fn manifest_path(&self) -> PathBuf {
        self.build_dir().join("assets.json")
    }
}

fn default_project_path() -> String {
    ".".to_string()
}

fn default_build_client_path() -> String {
    "/build/client/".to_string()
}

fn default_dev_port() -> u16 {
    3010
}

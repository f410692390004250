//! Runtime detection and platform default URLs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use startup_core::config::channel::ChannelConfig;
use startup_core::error::AppError;

/// Address under which an Android emulator reaches the host machine.
const EMULATOR_HOST: &str = "10.0.2.2";

/// Where the client code is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// A browser page served by the app server.
    Web,
    /// A mobile app on a device or simulator sharing the host network.
    Native,
    /// A mobile app inside an emulator with its own network.
    Emulator,
}

impl Platform {
    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Native => "native",
            Self::Emulator => "emulator",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "native" | "ios" | "android" => Ok(Self::Native),
            "emulator" => Ok(Self::Emulator),
            other => Err(AppError::validation(format!("Unknown platform: {other}"))),
        }
    }
}

/// Detected runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeEnv {
    /// Detected platform.
    pub platform: Platform,
    /// Development build.
    pub dev: bool,
}

impl RuntimeEnv {
    /// Creates a runtime description.
    pub fn new(platform: Platform, dev: bool) -> Self {
        Self { platform, dev }
    }

    /// Detects the runtime from `STARTUP_PLATFORM` and `STARTUP_DEV`.
    pub fn detect() -> Self {
        Self::detect_with(|key| std::env::var(key).ok())
    }

    /// Detects the runtime, resolving variables through `lookup`.
    pub fn detect_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let platform = match lookup("STARTUP_PLATFORM") {
            Some(value) => value.parse().unwrap_or_else(|e: AppError| {
                warn!(error = %e, "Falling back to web platform");
                Platform::Web
            }),
            None => Platform::Web,
        };

        let dev = lookup("STARTUP_DEV")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(cfg!(debug_assertions));

        Self { platform, dev }
    }

    /// Running inside a browser page.
    pub fn is_browser(&self) -> bool {
        self.platform == Platform::Web
    }

    /// Running a development build of the mobile app.
    pub fn is_mobile_dev(&self) -> bool {
        self.dev && matches!(self.platform, Platform::Native | Platform::Emulator)
    }

    /// Base URL used when nothing else is configured.
    pub fn default_base_url(&self, channel: &ChannelConfig, port: u16) -> String {
        match self.platform {
            Platform::Web => channel
                .web_origin
                .clone()
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            Platform::Native => format!("http://localhost:{port}"),
            Platform::Emulator => format!("http://{EMULATOR_HOST}:{port}"),
        }
    }
}

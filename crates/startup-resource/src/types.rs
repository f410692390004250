//! Resource and hash kinds plus per-call options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// Kinds of assets a page can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Compiled JavaScript bundle.
    Bundle,
    /// Extracted stylesheet.
    Style,
}

impl ResourceType {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bundle => "bundle",
            Self::Style => "style",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bundle" => Ok(Self::Bundle),
            "style" => Ok(Self::Style),
            other => Err(ResourceError::InvalidResourceType(other.to_string())),
        }
    }
}

/// Kinds of content hash recorded in the asset manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    /// Hash embedded in the bundle filename.
    Bundle,
}

impl HashType {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bundle => "bundle",
        }
    }
}

impl FromStr for HashType {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bundle" => Ok(Self::Bundle),
            other => Err(ResourceError::UnknownHashType(other.to_string())),
        }
    }
}

/// Per-call options. Part of the memo key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceOptions {
    /// Prefix production bundle URLs with the configured reference URL.
    #[serde(default)]
    pub absolute: bool,
}

impl ResourceOptions {
    /// Options requesting absolute bundle URLs.
    pub fn absolute() -> Self {
        Self { absolute: true }
    }
}

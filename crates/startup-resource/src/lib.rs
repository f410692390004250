//! # startup-resource
//!
//! Resolves logical asset names to the URLs emitted into rendered pages.
//!
//! - Bundles point at the development server outside production and at
//!   content-hashed files from `assets.json` in production.
//! - Styles always resolve to a static path under the client build directory.
//! - Every lookup is memoized for the lifetime of the [`ResourceLocator`].

pub mod error;
pub mod locator;
pub mod manifest;
pub mod types;

pub use error::ResourceError;
pub use locator::ResourceLocator;
pub use manifest::AssetManifest;
pub use types::{HashType, ResourceOptions, ResourceType};

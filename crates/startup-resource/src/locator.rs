//! Memoized resource URL resolution.
//!
//! For fixed arguments and a fixed configuration the resolved URL never
//! changes while the process runs, so both lookups are cached in `moka`
//! caches keyed by the JSON-serialized argument tuple. Concurrent first
//! calls for the same key share one computation, and the manifest is read
//! from disk at most once through a [`OnceCell`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use moka::future::Cache;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use startup_core::config::resources::ResourceConfig;
use startup_core::error::AppError;
use startup_core::result::AppResult;

use crate::error::ResourceError;
use crate::manifest::{AssetManifest, extract_bundle_hash};
use crate::types::{HashType, ResourceOptions, ResourceType};

const MEMO_CAPACITY: u64 = 10_000;

/// Counters exposing how often the locator did real work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocatorStats {
    /// Path computations that missed the memo cache.
    pub path_computations: usize,
    /// Hash computations that missed the memo cache.
    pub hash_computations: usize,
    /// Reads of `assets.json` from disk.
    pub manifest_loads: usize,
}

/// Resolves asset names to URLs for server-side rendering.
#[derive(Debug)]
pub struct ResourceLocator {
    config: ResourceConfig,
    manifest: OnceCell<Arc<AssetManifest>>,
    paths: Cache<String, String>,
    hashes: Cache<String, Option<String>>,
    path_computations: AtomicUsize,
    hash_computations: AtomicUsize,
    manifest_loads: AtomicUsize,
}

impl ResourceLocator {
    /// Creates a locator over the given build settings.
    pub fn new(config: ResourceConfig) -> Self {
        Self {
            config,
            manifest: OnceCell::new(),
            paths: Cache::new(MEMO_CAPACITY),
            hashes: Cache::new(MEMO_CAPACITY),
            path_computations: AtomicUsize::new(0),
            hash_computations: AtomicUsize::new(0),
            manifest_loads: AtomicUsize::new(0),
        }
    }

    /// Returns the build settings.
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Resolves the URL of a resource given its type name (`bundle` or `style`).
    pub async fn resource_path(
        &self,
        kind: &str,
        app: &str,
        options: &ResourceOptions,
    ) -> AppResult<String> {
        let kind = kind.parse::<ResourceType>().map_err(|e| {
            error!(kind = %kind, app = %app, "Rejected resource lookup");
            AppError::from(e)
        })?;
        self.path_for(kind, app, options).await
    }

    /// Resolves the URL of a typed resource.
    pub async fn path_for(
        &self,
        kind: ResourceType,
        app: &str,
        options: &ResourceOptions,
    ) -> AppResult<String> {
        let key = memo_key(kind.as_str(), app, options)?;

        self.paths
            .try_get_with(key, self.compute_path(kind, app, options))
            .await
            .map_err(|e| (*e).clone())
    }

    /// Returns the content hash of an app's asset, or `None` outside production.
    pub async fn hash(
        &self,
        app: &str,
        kind: &str,
        options: &ResourceOptions,
    ) -> AppResult<Option<String>> {
        if !self.config.is_production() {
            return Ok(None);
        }

        let kind = kind.parse::<HashType>().map_err(|e| {
            error!(kind = %kind, app = %app, "Rejected hash lookup");
            AppError::from(e)
        })?;
        self.hash_for(app, kind, options).await
    }

    /// Typed variant of [`ResourceLocator::hash`].
    pub async fn hash_for(
        &self,
        app: &str,
        kind: HashType,
        options: &ResourceOptions,
    ) -> AppResult<Option<String>> {
        if !self.config.is_production() {
            return Ok(None);
        }

        let key = memo_key(kind.as_str(), app, options)?;

        self.hashes
            .try_get_with(key, self.compute_hash(app, kind))
            .await
            .map_err(|e| (*e).clone())
    }

    /// Returns work counters, mostly useful in tests and diagnostics.
    pub fn stats(&self) -> LocatorStats {
        LocatorStats {
            path_computations: self.path_computations.load(Ordering::Relaxed),
            hash_computations: self.hash_computations.load(Ordering::Relaxed),
            manifest_loads: self.manifest_loads.load(Ordering::Relaxed),
        }
    }

    async fn compute_path(
        &self,
        kind: ResourceType,
        app: &str,
        options: &ResourceOptions,
    ) -> AppResult<String> {
        self.path_computations.fetch_add(1, Ordering::Relaxed);
        let build_path = &self.config.build_client_path;

        let path = match kind {
            ResourceType::Style => format!("{build_path}{app}.css"),
            ResourceType::Bundle if !self.config.is_production() => {
                format!("{}{build_path}{app}.js", self.config.devserver_origin())
            }
            ResourceType::Bundle => {
                let hash = self
                    .hash_for(app, HashType::Bundle, options)
                    .await?
                    .ok_or_else(|| AppError::internal("Production bundle resolved without hash"))?;
                let path = format!("{build_path}{app}.{hash}.js");

                match (&self.config.reference_url, options.absolute) {
                    (Some(reference), true) => {
                        format!("{}{path}", reference.trim_end_matches('/'))
                    }
                    _ => path,
                }
            }
        };

        debug!(kind = %kind, app = %app, path = %path, "Resource path resolved");
        Ok(path)
    }

    async fn compute_hash(&self, app: &str, kind: HashType) -> AppResult<Option<String>> {
        self.hash_computations.fetch_add(1, Ordering::Relaxed);
        let manifest = self.manifest().await?;

        let hash = match kind {
            HashType::Bundle => {
                let filename = manifest.bundle_file(app).inspect_err(|e| {
                    error!(app = %app, error = %e, "Bundle missing from asset manifest");
                })?;
                extract_bundle_hash(filename).inspect_err(|e| {
                    error!(app = %app, error = %e, "Malformed bundle filename");
                })?
            }
        };

        Ok(Some(hash.to_string()))
    }

    async fn manifest(&self) -> Result<Arc<AssetManifest>, ResourceError> {
        self.manifest
            .get_or_try_init(|| async {
                self.manifest_loads.fetch_add(1, Ordering::Relaxed);
                let path = self.config.manifest_path();
                AssetManifest::load(&path)
                    .await
                    .map(Arc::new)
                    .inspect_err(|e| error!(error = %e, "Asset manifest unavailable"))
            })
            .await
            .cloned()
    }
}

fn memo_key(kind: &str, app: &str, options: &ResourceOptions) -> AppResult<String> {
    #[derive(Serialize)]
    struct Key<'a>(&'a str, &'a str, &'a ResourceOptions);

    Ok(serde_json::to_string(&Key(kind, app, options))?)
}

//! Application State
//!
//! Builds the storage backends and services from an `AppConfig` and holds
//! them for the lifetime of the process.

use std::path::PathBuf;
use std::sync::Arc;

use glyph_pool_core::LocalStorage;
use serde::Serialize;
use tracing::{info, warn};

use crate::models::settings::AppConfig;
use crate::services::{
    compose, ComposedSentence, GlyphStore, IdentityProvider, RemoteStore, Resolution,
    ResolutionEngine, IDENTITY_STORAGE_KEY,
};
use crate::storage::{
    MemoryLocalStorage, SqliteDocumentStore, SqliteLocalStorage, UnavailableLocalStorage,
};
use crate::utils::error::AppResult;
use crate::utils::paths::{default_local_storage_path, default_pool_database_path};

/// Snapshot of backend health for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub identity: String,
    pub remote_configured: bool,
    pub remote_reachable: bool,
    pub remote_error: Option<String>,
    pub artifact_count: Option<u64>,
    pub local_healthy: bool,
}

/// Application state holding every service
pub struct AppState {
    config: AppConfig,
    local: Arc<dyn LocalStorage>,
    identity: IdentityProvider,
    glyph_store: Arc<GlyphStore>,
    engine: ResolutionEngine,
}

impl AppState {
    /// Build all services from `config`.
    ///
    /// `force_local` keeps the shared pool disabled regardless of config.
    /// Backends that cannot be opened degrade instead of failing. An
    /// unopenable local file leaves the identity in memory and makes local
    /// glyph writes fail with `StorageUnavailable`; an unopenable shared pool
    /// becomes `Disabled`.
    pub fn from_config(config: &AppConfig, force_local: bool) -> AppResult<Self> {
        let local = open_local_storage(config)?;
        let remote = if config.remote_enabled && !force_local {
            open_remote(config)?
        } else {
            info!("shared glyph pool disabled; running local-only");
            RemoteStore::Disabled
        };

        Ok(Self::assemble(
            config.clone(),
            remote,
            local.identity,
            local.glyphs,
        ))
    }

    /// Assemble state from already-built backends.
    pub fn from_parts(
        config: AppConfig,
        remote: RemoteStore,
        local: Arc<dyn LocalStorage>,
    ) -> Self {
        Self::assemble(config, remote, Arc::clone(&local), local)
    }

    fn assemble(
        config: AppConfig,
        remote: RemoteStore,
        identity_storage: Arc<dyn LocalStorage>,
        local: Arc<dyn LocalStorage>,
    ) -> Self {
        let identity = IdentityProvider::new(identity_storage);
        let glyph_store = Arc::new(GlyphStore::new(remote, Arc::clone(&local)));
        let engine = ResolutionEngine::new(Arc::clone(&glyph_store));

        Self {
            config,
            local,
            identity,
            glyph_store,
            engine,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn identity_provider(&self) -> &IdentityProvider {
        &self.identity
    }

    pub fn glyph_store(&self) -> &Arc<GlyphStore> {
        &self.glyph_store
    }

    pub fn engine(&self) -> &ResolutionEngine {
        &self.engine
    }

    /// This device's identity
    pub fn identity(&self) -> String {
        self.identity.get_or_create_identity()
    }

    /// Save a glyph as this device's identity
    pub async fn save(&self, character: &str, image: &str) -> AppResult<String> {
        let identity = self.identity();
        Ok(self.glyph_store.save(&identity, character, image).await?)
    }

    /// Resolve characters as this device's identity
    pub async fn resolve<S: AsRef<str>>(&self, characters: &[S]) -> Resolution {
        let identity = self.identity();
        self.engine.resolve(&identity, characters).await
    }

    /// Compose a sentence (the configured one when `sentence` is None)
    pub async fn compose(&self, sentence: Option<&str>) -> ComposedSentence {
        let identity = self.identity();
        let sentence = sentence.unwrap_or(&self.config.sentence);
        compose(&self.engine, &identity, sentence).await
    }

    /// Probe both backends
    pub async fn health(&self) -> HealthReport {
        let identity = self.identity();
        let local_healthy = self.local.get_item(IDENTITY_STORAGE_KEY).is_ok();

        let mut report = HealthReport {
            identity,
            remote_configured: self.glyph_store.is_remote_available(),
            remote_reachable: false,
            remote_error: None,
            artifact_count: None,
            local_healthy,
        };

        if let RemoteStore::Connected(store) = self.glyph_store.remote() {
            match store.ping().await {
                Ok(()) => {
                    report.remote_reachable = true;
                    match store.count_artifacts().await {
                        Ok(count) => report.artifact_count = Some(count),
                        Err(e) => report.remote_error = Some(e.to_string()),
                    }
                }
                Err(e) => report.remote_error = Some(e.to_string()),
            }
        }

        report
    }
}

fn local_storage_path(config: &AppConfig) -> AppResult<PathBuf> {
    match &config.local_storage_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => default_local_storage_path(),
    }
}

fn remote_database_path(config: &AppConfig) -> AppResult<PathBuf> {
    match &config.remote_database_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => default_pool_database_path(),
    }
}

/// Device-local backends. Both are the same store unless the file could not
/// be opened.
struct LocalBackends {
    identity: Arc<dyn LocalStorage>,
    glyphs: Arc<dyn LocalStorage>,
}

fn open_local_storage(config: &AppConfig) -> AppResult<LocalBackends> {
    let path = local_storage_path(config)?;
    match SqliteLocalStorage::open(&path, config.local_quota_bytes) {
        Ok(storage) => {
            let storage: Arc<dyn LocalStorage> = Arc::new(storage);
            Ok(LocalBackends {
                identity: Arc::clone(&storage),
                glyphs: storage,
            })
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "local storage unavailable; identity will not persist and local glyph saves will fail");
            Ok(LocalBackends {
                identity: Arc::new(MemoryLocalStorage::with_quota(config.local_quota_bytes)),
                glyphs: Arc::new(UnavailableLocalStorage::new(e.to_string())),
            })
        }
    }
}

fn open_remote(config: &AppConfig) -> AppResult<RemoteStore> {
    let path = remote_database_path(config)?;
    match SqliteDocumentStore::open(&path) {
        Ok(store) => {
            info!(path = %path.display(), "connected to shared glyph pool");
            Ok(RemoteStore::connected(store))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "shared glyph pool unavailable; running local-only");
            Ok(RemoteStore::Disabled)
        }
    }
}

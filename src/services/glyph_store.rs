//! Glyph Store
//!
//! Persistence and query layer over two backends:
//!
//! - the shared pool (`DocumentStore`), when the application is configured
//!   with one: append-only artifacts plus a per-identity pointer map
//! - device-local storage, when it is not: one overwritable entry per
//!   `(identity, character)` under `glyph:{identity}:{character}`
//!
//! Which backend is used is decided once, at construction, by `RemoteStore`.
//! A remote that fails at runtime is reported to the caller; it does not
//! silently switch the store to local mode.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use futures_util::future::join_all;
use glyph_pool_core::{
    character_from_local_key, local_glyph_key, local_glyph_prefix, validate_identity,
    CoreError, CoreResult, DocumentStore, LocalStorage, NewGlyphArtifact,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

/// Character -> image data URL.
pub type GlyphImages = BTreeMap<String, String>;

/// The shared pool handle, or the explicit absence of one.
#[derive(Clone)]
pub enum RemoteStore {
    Connected(Arc<dyn DocumentStore>),
    Disabled,
}

impl RemoteStore {
    pub fn connected(store: impl DocumentStore + 'static) -> Self {
        Self::Connected(Arc::new(store))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected(_) => write!(f, "RemoteStore::Connected"),
            Self::Disabled => write!(f, "RemoteStore::Disabled"),
        }
    }
}

/// Saves drawn glyphs and answers glyph lookups.
pub struct GlyphStore {
    remote: RemoteStore,
    local: Arc<dyn LocalStorage>,
    rng: Mutex<StdRng>,
}

impl GlyphStore {
    pub fn new(remote: RemoteStore, local: Arc<dyn LocalStorage>) -> Self {
        Self {
            remote,
            local,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replace the random source used to pick from the shared pool.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn remote(&self) -> &RemoteStore {
        &self.remote
    }

    pub fn is_remote_available(&self) -> bool {
        self.remote.is_available()
    }

    /// Persist a drawn glyph for `(identity, character)`.
    ///
    /// Returns the new artifact id, or the local key when running without a
    /// shared pool. Inputs are validated before any I/O. The image is only
    /// borrowed, so the caller still holds it if this fails.
    pub async fn save(&self, identity: &str, character: &str, image: &str) -> CoreResult<String> {
        let artifact = NewGlyphArtifact::new(identity, character, image)?;

        match &self.remote {
            RemoteStore::Connected(store) => {
                let created = store.create_artifact(artifact).await?;

                // The artifact and the pointer are separate documents. If the
                // pointer write fails the artifact stays in the pool, unowned
                // by any map, and the identity's own lookup misses it.
                if let Err(e) = store
                    .merge_user_pointer(identity, character, &created.id)
                    .await
                {
                    warn!(
                        identity = %identity,
                        character = %character,
                        artifact_id = %created.id,
                        error = %e,
                        "saved glyph but could not update the identity's glyph map"
                    );
                }

                debug!(identity = %identity, character = %character, artifact_id = %created.id, "saved glyph to shared pool");
                Ok(created.id)
            }
            RemoteStore::Disabled => {
                let key = local_glyph_key(identity, character);
                self.local.set_item(&key, image).map_err(|e| match e {
                    CoreError::StorageUnavailable(_) => e,
                    other => CoreError::storage_unavailable(other.to_string()),
                })?;

                debug!(identity = %identity, character = %character, key = %key, "saved glyph locally");
                Ok(key)
            }
        }
    }

    /// Every glyph `identity` currently has on file, by character.
    ///
    /// An identity with no map yet gets an empty result. Pointers to artifacts
    /// that cannot be fetched are skipped.
    pub async fn load_own_artifacts(&self, identity: &str) -> CoreResult<GlyphImages> {
        validate_identity(identity)?;

        match &self.remote {
            RemoteStore::Connected(store) => {
                let Some(map) = store.get_user_map(identity).await? else {
                    return Ok(GlyphImages::new());
                };

                let fetches = map.character_pointers.iter().map(|(character, artifact_id)| {
                    let store = Arc::clone(store);
                    async move {
                        let result = store.get_artifact(artifact_id).await;
                        (character, artifact_id, result)
                    }
                });

                let mut images = GlyphImages::new();
                for (character, artifact_id, result) in join_all(fetches).await {
                    match result {
                        Ok(Some(artifact)) => {
                            images.insert(character.clone(), artifact.image);
                        }
                        Ok(None) => {
                            debug!(identity = %identity, character = %character, artifact_id = %artifact_id, "glyph map points at a missing artifact");
                        }
                        Err(e) => {
                            warn!(identity = %identity, character = %character, artifact_id = %artifact_id, error = %e, "failed to fetch own glyph");
                        }
                    }
                }
                Ok(images)
            }
            RemoteStore::Disabled => {
                let entries = self.local.entries_with_prefix(&local_glyph_prefix(identity))?;
                Ok(entries
                    .into_iter()
                    .filter_map(|(key, image)| {
                        character_from_local_key(identity, &key)
                            .map(|character| (character.to_string(), image))
                    })
                    .collect())
            }
        }
    }

    /// A uniformly random image for `character` from the shared pool.
    ///
    /// `None` when nobody has drawn it, or when there is no shared pool.
    pub async fn query_random_global_artifact(&self, character: &str) -> CoreResult<Option<String>> {
        let RemoteStore::Connected(store) = &self.remote else {
            return Ok(None);
        };
        if character.is_empty() {
            return Ok(None);
        }

        let matches = store.query_artifacts(character).await?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| CoreError::internal("random source lock poisoned"))?;

        Ok(matches
            .choose(&mut *rng)
            .map(|artifact| artifact.image.clone()))
    }
}

//! Failure Containment Tests
//!
//! A real pool database behind a wrapper that fails selected calls, so each
//! fault can be aimed at one stage of save or resolve.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use glyph_pool::models::settings::AppConfig;
use glyph_pool::services::RemoteStore;
use glyph_pool::state::AppState;
use glyph_pool::storage::{MemoryLocalStorage, SqliteDocumentStore};
use glyph_pool::AppError;
use glyph_pool_core::{
    CoreError, CoreResult, DocumentStore, GlyphArtifact, NewGlyphArtifact, Provenance,
    UserGlyphMap,
};

const IMG: &str = "data:image/png;base64,eA==";

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct Faults {
    /// Characters whose pool query fails
    query: Mutex<BTreeSet<String>>,
    user_map: AtomicBool,
    merge: AtomicBool,
    create: AtomicBool,
    get_artifact: AtomicBool,
}

struct FaultyStore {
    inner: SqliteDocumentStore,
    faults: Arc<Faults>,
}

fn down(what: &str) -> CoreError {
    CoreError::transport_unavailable(format!("{} failed", what))
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn create_artifact(&self, artifact: NewGlyphArtifact) -> CoreResult<GlyphArtifact> {
        if self.faults.create.load(Ordering::SeqCst) {
            return Err(CoreError::permission_denied("pool rejected the write"));
        }
        self.inner.create_artifact(artifact).await
    }

    async fn get_artifact(&self, id: &str) -> CoreResult<Option<GlyphArtifact>> {
        if self.faults.get_artifact.load(Ordering::SeqCst) {
            return Err(down("get_artifact"));
        }
        self.inner.get_artifact(id).await
    }

    async fn query_artifacts(&self, character: &str) -> CoreResult<Vec<GlyphArtifact>> {
        if self.faults.query.lock().unwrap().contains(character) {
            return Err(down("query"));
        }
        self.inner.query_artifacts(character).await
    }

    async fn get_user_map(&self, owner_id: &str) -> CoreResult<Option<UserGlyphMap>> {
        if self.faults.user_map.load(Ordering::SeqCst) {
            return Err(down("get_user_map"));
        }
        self.inner.get_user_map(owner_id).await
    }

    async fn merge_user_pointer(
        &self,
        owner_id: &str,
        character: &str,
        artifact_id: &str,
    ) -> CoreResult<()> {
        if self.faults.merge.load(Ordering::SeqCst) {
            return Err(down("merge"));
        }
        self.inner
            .merge_user_pointer(owner_id, character, artifact_id)
            .await
    }

    async fn count_artifacts(&self) -> CoreResult<u64> {
        self.inner.count_artifacts().await
    }

    async fn ping(&self) -> CoreResult<()> {
        self.inner.ping().await
    }
}

/// Two devices over one in-memory pool; faults apply to the first.
fn setup() -> (AppState, AppState, Arc<Faults>) {
    let pool = SqliteDocumentStore::in_memory().unwrap();
    let faults = Arc::new(Faults::default());

    let faulty = AppState::from_parts(
        AppConfig::default(),
        RemoteStore::connected(FaultyStore {
            inner: pool.clone(),
            faults: Arc::clone(&faults),
        }),
        Arc::new(MemoryLocalStorage::new()),
    );
    let healthy = AppState::from_parts(
        AppConfig::default(),
        RemoteStore::connected(pool),
        Arc::new(MemoryLocalStorage::new()),
    );

    (faulty, healthy, faults)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_failed_query_only_drops_that_character() {
    let (me, other, faults) = setup();
    other.save("a", IMG).await.unwrap();
    other.save("b", IMG).await.unwrap();
    faults.query.lock().unwrap().insert("a".to_string());

    let resolution = me.resolve(&["a", "b"]).await;
    assert!(!resolution.contains_key("a"));
    assert_eq!(resolution["b"].provenance, Provenance::Global);
}

#[tokio::test]
async fn test_unreadable_map_falls_back_to_pool() {
    let (me, _other, faults) = setup();
    me.save("a", IMG).await.unwrap();
    faults.user_map.store(true, Ordering::SeqCst);

    // My own glyph is still in the pool, just no longer recognised as mine.
    let resolution = me.resolve(&["a"]).await;
    assert_eq!(resolution["a"].provenance, Provenance::Global);

    let err = me
        .glyph_store()
        .load_own_artifacts(&me.identity())
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unfetchable_artifacts_are_skipped() {
    let (me, _other, faults) = setup();
    me.save("a", IMG).await.unwrap();
    faults.get_artifact.store(true, Ordering::SeqCst);

    let own = me
        .glyph_store()
        .load_own_artifacts(&me.identity())
        .await
        .unwrap();
    assert!(own.is_empty());
}

#[tokio::test]
async fn test_pointer_failure_still_contributes_to_pool() {
    let (me, other, faults) = setup();
    faults.merge.store(true, Ordering::SeqCst);

    let id = me.save("a", IMG).await.unwrap();
    assert!(!id.is_empty());

    // Not mine any more...
    let mine = me.resolve(&["a"]).await;
    assert_eq!(mine["a"].provenance, Provenance::Global);
    // ...but visible to everyone.
    let theirs = other.resolve(&["a"]).await;
    assert_eq!(theirs["a"].provenance, Provenance::Global);
}

#[tokio::test]
async fn test_rejected_write_propagates() {
    let (me, _other, faults) = setup();
    faults.create.store(true, Ordering::SeqCst);

    let err = me.save("a", IMG).await.unwrap_err();
    assert!(matches!(err, AppError::Glyph(CoreError::PermissionDenied(_))));
    assert_eq!(me.health().await.artifact_count, Some(0));
}

#[tokio::test]
async fn test_invalid_input_never_reaches_the_pool() {
    let (me, _other, faults) = setup();
    faults.create.store(true, Ordering::SeqCst);

    let err = me.save("", IMG).await.unwrap_err();
    assert!(matches!(err, AppError::Glyph(CoreError::InvalidInput(_))));
    let err = me.save("a", "not-an-image").await.unwrap_err();
    assert!(matches!(err, AppError::Glyph(CoreError::InvalidInput(_))));
}

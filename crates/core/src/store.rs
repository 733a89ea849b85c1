//! Storage Seams
//!
//! The two backends the glyph store composes:
//!
//! - `DocumentStore` - the shared remote document database (async; may
//!   suspend on network I/O)
//! - `LocalStorage` - the single-device key-value fallback (sync, like a
//!   browser's local storage)
//!
//! Both are object-safe so the application can hold them as `Arc<dyn ...>`
//! and tests can substitute faulty or in-memory implementations.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::glyph::{GlyphArtifact, NewGlyphArtifact, UserGlyphMap};

/// Remote document database holding the shared pool.
///
/// Implementations classify backend failures as `PermissionDenied` or
/// `TransportUnavailable`. Absent documents are `Ok(None)`, never errors.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a new artifact. The store assigns the id and `created_at`.
    async fn create_artifact(&self, artifact: NewGlyphArtifact) -> CoreResult<GlyphArtifact>;

    /// Fetch one artifact by id.
    async fn get_artifact(&self, id: &str) -> CoreResult<Option<GlyphArtifact>>;

    /// All artifacts whose character matches exactly.
    async fn query_artifacts(&self, character: &str) -> CoreResult<Vec<GlyphArtifact>>;

    /// Fetch an identity's pointer map.
    async fn get_user_map(&self, owner_id: &str) -> CoreResult<Option<UserGlyphMap>>;

    /// Merge a single `character -> artifact_id` pointer into an identity's
    /// map, creating the map if needed. Must be atomic per document.
    async fn merge_user_pointer(
        &self,
        owner_id: &str,
        character: &str,
        artifact_id: &str,
    ) -> CoreResult<()>;

    /// Number of artifacts in the pool.
    async fn count_artifacts(&self) -> CoreResult<u64>;

    /// Cheap reachability check.
    async fn ping(&self) -> CoreResult<()>;
}

/// Device-local key-value storage.
///
/// Any failure to persist is `StorageUnavailable`.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> CoreResult<Option<String>>;

    /// Insert or overwrite.
    fn set_item(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Every `(key, value)` whose key starts with `prefix`.
    fn entries_with_prefix(&self, prefix: &str) -> CoreResult<Vec<(String, String)>>;
}

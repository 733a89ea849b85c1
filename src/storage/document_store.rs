//! Shared Pool Document Store
//!
//! `DocumentStore` over a SQLite database that every participating device
//! points at. Two collections:
//!
//! - `global_glyphs` (`globalGlyphs`) - append-only artifacts. Update and
//!   delete are refused by triggers, so the access rule holds no matter which
//!   client writes to the file.
//! - `user_glyphs` (`userGlyphs`) - one row per identity with a JSON object
//!   of `character -> artifact id`, merge-updated one key at a time.
//!
//! Ids and `created_at` are assigned here, never by the caller.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use glyph_pool_core::{
    CoreError, CoreResult, DocumentStore, GlyphArtifact, NewGlyphArtifact, UserGlyphMap,
};
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use tracing::debug;

use crate::storage::database::{
    remote_error, remote_pool_error, Database, DbConnection, APPEND_ONLY_VIOLATION,
};
use crate::utils::error::AppResult;

/// SQLite implementation of the shared pool.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    database: Arc<Database>,
}

impl SqliteDocumentStore {
    /// Wrap an existing database, creating the collections if needed.
    pub fn new(database: Arc<Database>) -> AppResult<Self> {
        let store = Self { database };
        store.init_schema()?;
        Ok(store)
    }

    /// Open the pool database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        Self::new(Arc::new(Database::open(path)?))
    }

    /// A private in-memory pool.
    pub fn in_memory() -> AppResult<Self> {
        Self::new(Arc::new(Database::new_in_memory()?))
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    fn init_schema(&self) -> AppResult<()> {
        let conn = self.database.get_connection()?;

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS global_glyphs (
                id TEXT PRIMARY KEY,
                character TEXT NOT NULL,
                image TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX IF NOT EXISTS idx_global_glyphs_character
                ON global_glyphs(character);

            CREATE TRIGGER IF NOT EXISTS global_glyphs_no_update
                BEFORE UPDATE ON global_glyphs
                BEGIN SELECT RAISE(ABORT, '{violation}'); END;

            CREATE TRIGGER IF NOT EXISTS global_glyphs_no_delete
                BEFORE DELETE ON global_glyphs
                BEGIN SELECT RAISE(ABORT, '{violation}'); END;

            CREATE TABLE IF NOT EXISTS user_glyphs (
                owner_id TEXT PRIMARY KEY,
                character_pointers TEXT NOT NULL DEFAULT '{{}}',
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );",
            violation = APPEND_ONLY_VIOLATION,
        ))?;

        Ok(())
    }

    /// Run `f` on a pooled connection on the blocking thread pool, so a
    /// slow or locked pool file never stalls the async runtime.
    async fn run_blocking<T, F>(&self, f: F) -> CoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut DbConnection) -> CoreResult<T> + Send + 'static,
    {
        let pool = self.database.pool().clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(remote_pool_error)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| CoreError::internal(format!("Glyph pool task join error: {}", e)))?
    }
}

fn artifact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GlyphArtifact> {
    Ok(GlyphArtifact {
        id: row.get(0)?,
        character: row.get(1)?,
        image: row.get(2)?,
        created_at: row.get(3)?,
        owner_id: row.get(4)?,
    })
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create_artifact(&self, artifact: NewGlyphArtifact) -> CoreResult<GlyphArtifact> {
        self.run_blocking(move |conn| {
            let id = uuid::Uuid::new_v4().to_string();

            conn.execute(
                "INSERT INTO global_glyphs (id, character, image, owner_id) VALUES (?1, ?2, ?3, ?4)",
                params![id, artifact.character, artifact.image, artifact.owner_id],
            )
            .map_err(|e| remote_error("Failed to append glyph", e))?;

            let created_at: String = conn
                .query_row(
                    "SELECT created_at FROM global_glyphs WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .map_err(|e| remote_error("Failed to read appended glyph", e))?;

            debug!(artifact_id = %id, character = %artifact.character, "appended glyph artifact");

            Ok(GlyphArtifact {
                id,
                character: artifact.character,
                image: artifact.image,
                created_at,
                owner_id: artifact.owner_id,
            })
        })
        .await
    }

    async fn get_artifact(&self, id: &str) -> CoreResult<Option<GlyphArtifact>> {
        let id = id.to_string();
        self.run_blocking(move |conn| {
            conn.query_row(
                "SELECT id, character, image, created_at, owner_id
                 FROM global_glyphs WHERE id = ?1",
                params![id],
                artifact_from_row,
            )
            .optional()
            .map_err(|e| remote_error("Failed to fetch glyph", e))
        })
        .await
    }

    async fn query_artifacts(&self, character: &str) -> CoreResult<Vec<GlyphArtifact>> {
        let character = character.to_string();
        self.run_blocking(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, character, image, created_at, owner_id
                     FROM global_glyphs WHERE character = ?1
                     ORDER BY created_at, id",
                )
                .map_err(|e| remote_error("Failed to query glyphs", e))?;

            let rows = stmt
                .query_map(params![character], artifact_from_row)
                .map_err(|e| remote_error("Failed to query glyphs", e))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| remote_error("Failed to read glyph row", e))
        })
        .await
    }

    async fn get_user_map(&self, owner_id: &str) -> CoreResult<Option<UserGlyphMap>> {
        let owner_id = owner_id.to_string();
        self.run_blocking(move |conn| {
            let pointers: Option<String> = conn
                .query_row(
                    "SELECT character_pointers FROM user_glyphs WHERE owner_id = ?1",
                    params![owner_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| remote_error("Failed to fetch glyph map", e))?;

            match pointers {
                Some(json) => Ok(Some(UserGlyphMap {
                    character_pointers: serde_json::from_str(&json)?,
                    owner_id,
                })),
                None => Ok(None),
            }
        })
        .await
    }

    async fn merge_user_pointer(
        &self,
        owner_id: &str,
        character: &str,
        artifact_id: &str,
    ) -> CoreResult<()> {
        let owner_id = owner_id.to_string();
        let character = character.to_string();
        let artifact_id = artifact_id.to_string();

        self.run_blocking(move |conn| {
            // Immediate: take the write lock before reading so two merges into
            // the same map cannot interleave.
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| remote_error("Failed to begin glyph map update", e))?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT character_pointers FROM user_glyphs WHERE owner_id = ?1",
                    params![owner_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| remote_error("Failed to fetch glyph map", e))?;

            let mut map = match existing {
                Some(json) => UserGlyphMap {
                    owner_id: owner_id.clone(),
                    character_pointers: serde_json::from_str(&json)?,
                },
                None => UserGlyphMap::new(owner_id.as_str()),
            };
            map.merge_pointer(character.as_str(), artifact_id.as_str());
            let pointers = serde_json::to_string(&map.character_pointers)?;

            tx.execute(
                "INSERT INTO user_glyphs (owner_id, character_pointers) VALUES (?1, ?2)
                 ON CONFLICT(owner_id) DO UPDATE SET
                    character_pointers = excluded.character_pointers,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![owner_id, pointers],
            )
            .map_err(|e| remote_error("Failed to write glyph map", e))?;

            tx.commit()
                .map_err(|e| remote_error("Failed to commit glyph map", e))?;

            debug!(identity = %owner_id, character = %character, artifact_id = %artifact_id, "merged glyph pointer");
            Ok(())
        })
        .await
    }

    async fn count_artifacts(&self) -> CoreResult<u64> {
        self.run_blocking(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM global_glyphs", [], |row| row.get(0))
                .map_err(|e| remote_error("Failed to count glyphs", e))?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn ping(&self) -> CoreResult<()> {
        self.run_blocking(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .map_err(|e| remote_error("Glyph pool did not respond", e))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMG_A: &str = "data:image/png;base64,QUFB";
    const IMG_B: &str = "data:image/png;base64,QkJC";

    fn new_artifact(owner: &str, character: &str, image: &str) -> NewGlyphArtifact {
        NewGlyphArtifact::new(owner, character, image).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamp() {
        let store = SqliteDocumentStore::in_memory().unwrap();

        let created = store
            .create_artifact(new_artifact("user_1", "a", IMG_A))
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert!(created.created_at.ends_with('Z'));
        assert_eq!(created.owner_id, "user_1");

        let fetched = store.get_artifact(&created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn duplicate_images_are_kept_as_separate_artifacts() {
        let store = SqliteDocumentStore::in_memory().unwrap();

        let first = store
            .create_artifact(new_artifact("user_1", "a", IMG_A))
            .await
            .unwrap();
        let second = store
            .create_artifact(new_artifact("user_1", "a", IMG_A))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.count_artifacts().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn query_matches_character_exactly() {
        let store = SqliteDocumentStore::in_memory().unwrap();
        store
            .create_artifact(new_artifact("user_1", "a", IMG_A))
            .await
            .unwrap();
        store
            .create_artifact(new_artifact("user_2", "A", IMG_B))
            .await
            .unwrap();

        let lower = store.query_artifacts("a").await.unwrap();
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].image, IMG_A);

        let upper = store.query_artifacts("A").await.unwrap();
        assert_eq!(upper.len(), 1);
        assert_eq!(upper[0].image, IMG_B);

        assert!(store.query_artifacts("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_documents_are_none() {
        let store = SqliteDocumentStore::in_memory().unwrap();
        assert_eq!(store.get_artifact("nope").await.unwrap(), None);
        assert_eq!(store.get_user_map("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn merge_keeps_other_pointers() {
        let store = SqliteDocumentStore::in_memory().unwrap();

        store.merge_user_pointer("user_1", "a", "art-1").await.unwrap();
        store.merge_user_pointer("user_1", "b", "art-2").await.unwrap();
        store.merge_user_pointer("user_1", "a", "art-3").await.unwrap();

        let map = store.get_user_map("user_1").await.unwrap().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.pointer("a"), Some("art-3"));
        assert_eq!(map.pointer("b"), Some("art-2"));
    }

    #[tokio::test]
    async fn artifacts_cannot_be_updated_or_deleted() {
        let store = SqliteDocumentStore::in_memory().unwrap();
        let created = store
            .create_artifact(new_artifact("user_1", "a", IMG_A))
            .await
            .unwrap();

        let conn = store.database().get_connection().unwrap();
        let update = conn
            .execute(
                "UPDATE global_glyphs SET image = ?1 WHERE id = ?2",
                params![IMG_B, created.id],
            )
            .map_err(|e| remote_error("update", e));
        assert!(matches!(update, Err(CoreError::PermissionDenied(_))));

        let delete = conn
            .execute("DELETE FROM global_glyphs WHERE id = ?1", params![created.id])
            .map_err(|e| remote_error("delete", e));
        assert!(matches!(delete, Err(CoreError::PermissionDenied(_))));
        drop(conn);

        let fetched = store.get_artifact(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.image, IMG_A);
    }

    #[tokio::test]
    async fn ping_succeeds_on_open_pool() {
        let store = SqliteDocumentStore::in_memory().unwrap();
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn two_handles_on_one_file_share_the_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.db");
        let device_one = SqliteDocumentStore::open(&path).unwrap();
        let device_two = SqliteDocumentStore::open(&path).unwrap();

        device_one
            .create_artifact(new_artifact("user_1", "q", IMG_A))
            .await
            .unwrap();

        let seen = device_two.query_artifacts("q").await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].owner_id, "user_1");
    }

    #[tokio::test]
    async fn locked_pool_does_not_stall_other_tasks() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        use futures_util::future::join_all;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.db");
        let store = SqliteDocumentStore::open(&path).unwrap();
        for character in ["x", "y", "z"] {
            store
                .create_artifact(new_artifact("user_1", character, IMG_A))
                .await
                .unwrap();
        }

        // Another device holds the write lock for a while.
        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let holder_path = path.clone();
        let holder = std::thread::spawn(move || {
            let conn = rusqlite::Connection::open(holder_path).unwrap();
            conn.execute_batch("BEGIN EXCLUSIVE").unwrap();
            locked_tx.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(500));
            conn.execute_batch("COMMIT").unwrap();
        });
        locked_rx.recv().unwrap();

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        let results = join_all(["x", "y", "z"].map(|c| store.query_artifacts(c))).await;
        ticker.abort();
        holder.join().unwrap();

        for result in results {
            assert_eq!(result.unwrap().len(), 1);
        }
        assert!(
            ticks.load(Ordering::SeqCst) > 0,
            "runtime was blocked while waiting on the pool lock"
        );
    }
}

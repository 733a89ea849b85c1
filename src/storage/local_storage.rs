//! Device-Local Storage
//!
//! Flat key-value storage that never leaves the device, with a byte quota
//! like a browser origin's local storage. Keys and values both count towards
//! the quota. Overwriting a key replaces its value.
//!
//! - `SqliteLocalStorage` - persisted in a `local_kv` table
//! - `MemoryLocalStorage` - process-lifetime only
//! - `UnavailableLocalStorage` - stands in for a store that could not be
//!   opened; every call fails with `StorageUnavailable`

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use glyph_pool_core::{CoreError, CoreResult, LocalStorage};
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::models::settings::DEFAULT_LOCAL_QUOTA_BYTES;
use crate::storage::database::{local_error, Database, DbConnection};
use crate::utils::error::AppResult;

fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

fn quota_exceeded(needed: u64, quota: u64) -> CoreError {
    CoreError::storage_unavailable(format!(
        "local storage quota exceeded ({} of {} bytes)",
        needed, quota
    ))
}

// ---------------------------------------------------------------------------
// SQLite-backed
// ---------------------------------------------------------------------------

/// Local storage persisted in a device-local SQLite file.
#[derive(Clone)]
pub struct SqliteLocalStorage {
    database: Arc<Database>,
    quota_bytes: u64,
}

impl SqliteLocalStorage {
    pub fn new(database: Arc<Database>, quota_bytes: u64) -> AppResult<Self> {
        let storage = Self {
            database,
            quota_bytes,
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Open the local storage file at `path`.
    pub fn open(path: impl AsRef<Path>, quota_bytes: u64) -> AppResult<Self> {
        Self::new(Arc::new(Database::open(path)?), quota_bytes)
    }

    pub fn in_memory() -> AppResult<Self> {
        Self::new(Arc::new(Database::new_in_memory()?), DEFAULT_LOCAL_QUOTA_BYTES)
    }

    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    fn init_schema(&self) -> AppResult<()> {
        let conn = self.database.get_connection()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn connection(&self) -> CoreResult<DbConnection> {
        self.database
            .pool()
            .get()
            .map_err(|e| local_error("Failed to open local storage", e))
    }
}

impl LocalStorage for SqliteLocalStorage {
    fn get_item(&self, key: &str) -> CoreResult<Option<String>> {
        let conn = self.connection()?;
        conn.query_row(
            "SELECT value FROM local_kv WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| local_error("Failed to read local storage", e))
    }

    fn set_item(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut conn = self.connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| local_error("Failed to write local storage", e))?;

        let used: i64 = tx
            .query_row(
                "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
                 FROM local_kv WHERE key != ?1",
                params![key],
                |row| row.get(0),
            )
            .map_err(|e| local_error("Failed to measure local storage", e))?;

        let needed = used.max(0) as u64 + entry_size(key, value);
        if needed > self.quota_bytes {
            return Err(quota_exceeded(needed, self.quota_bytes));
        }

        tx.execute(
            "INSERT INTO local_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(|e| local_error("Failed to write local storage", e))?;

        tx.commit()
            .map_err(|e| local_error("Failed to write local storage", e))
    }

    fn entries_with_prefix(&self, prefix: &str) -> CoreResult<Vec<(String, String)>> {
        let conn = self.connection()?;
        // substr() rather than LIKE: identities and characters may contain % or _.
        let mut stmt = conn
            .prepare(
                "SELECT key, value FROM local_kv
                 WHERE substr(key, 1, length(?1)) = ?1
                 ORDER BY key",
            )
            .map_err(|e| local_error("Failed to scan local storage", e))?;

        let rows = stmt
            .query_map(params![prefix], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| local_error("Failed to scan local storage", e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| local_error("Failed to scan local storage", e))
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Local storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryLocalStorage {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<u64>,
}

impl MemoryLocalStorage {
    /// Unbounded storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage refusing writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStorage for MemoryLocalStorage {
    fn get_item(&self, key: &str) -> CoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage_unavailable("local storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage_unavailable("local storage lock poisoned"))?;

        if let Some(quota) = self.quota_bytes {
            let used: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            let needed = used + entry_size(key, value);
            if needed > quota {
                return Err(quota_exceeded(needed, quota));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn entries_with_prefix(&self, prefix: &str) -> CoreResult<Vec<(String, String)>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage_unavailable("local storage lock poisoned"))?;
        Ok(entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Unavailable
// ---------------------------------------------------------------------------

/// Local storage that could not be opened. Nothing is ever accepted, so
/// writes fail loudly instead of vanishing at process exit.
#[derive(Debug, Clone)]
pub struct UnavailableLocalStorage {
    reason: String,
}

impl UnavailableLocalStorage {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> CoreError {
        CoreError::storage_unavailable(format!("local storage unavailable: {}", self.reason))
    }
}

impl LocalStorage for UnavailableLocalStorage {
    fn get_item(&self, _key: &str) -> CoreResult<Option<String>> {
        Err(self.error())
    }

    fn set_item(&self, _key: &str, _value: &str) -> CoreResult<()> {
        Err(self.error())
    }

    fn entries_with_prefix(&self, _prefix: &str) -> CoreResult<Vec<(String, String)>> {
        Err(self.error())
    }
}

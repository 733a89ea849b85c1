//! SQLite Database
//!
//! Embedded database handle using rusqlite with r2d2 connection pooling.
//! Both the shared pool store and the device-local store sit on top of this;
//! each one creates its own tables.

use std::path::Path;
use std::time::Duration;

use glyph_pool_core::CoreError;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::ErrorCode;

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::ensure_parent_dir;

/// Message raised by the append-only triggers on the artifact table.
pub const APPEND_ONLY_VIOLATION: &str = "global glyphs are append-only";

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database service wrapping a SQLite connection pool
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a database from an existing connection pool.
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create an in-memory database for testing.
    ///
    /// The pool holds a single connection: every in-memory SQLite connection
    /// is its own database.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Open (or create) a database file with connection pooling
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;

        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
        let pool = Pool::builder()
            .max_size(8)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .map_err(|e| {
                AppError::database(format!(
                    "Failed to open database {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Get the connection pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

/// Classify a SQLite failure from the shared pool database.
///
/// Rule rejections (read-only files, authorizer denials, the append-only
/// triggers) become `PermissionDenied`; anything that looks like the database
/// being out of reach becomes `TransportUnavailable`.
pub fn remote_error(context: &str, err: rusqlite::Error) -> CoreError {
    let message = format!("{}: {}", context, err);
    match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::AuthorizationForStatementDenied => CoreError::permission_denied(message),
            ErrorCode::ConstraintViolation if message.contains(APPEND_ONLY_VIOLATION) => {
                CoreError::permission_denied(message)
            }
            ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::FileLockingProtocolFailed
            | ErrorCode::NotADatabase => CoreError::transport_unavailable(message),
            _ => CoreError::internal(message),
        },
        _ => CoreError::internal(message),
    }
}

/// Classify a pool checkout failure from the shared pool database.
pub fn remote_pool_error(err: r2d2::Error) -> CoreError {
    CoreError::transport_unavailable(format!("Failed to reach glyph pool: {}", err))
}

/// Classify a SQLite failure from device-local storage. Every local failure
/// means the write (or read) did not happen.
pub fn local_error(context: &str, err: impl std::fmt::Display) -> CoreError {
    CoreError::storage_unavailable(format!("{}: {}", context, err))
}

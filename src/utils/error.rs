//! Error Handling
//!
//! Application-level error type. Glyph operations report `CoreError`; this
//! type adds the setup concerns around them (config files, database files,
//! paths) and wraps `CoreError` for callers that mix both.

use glyph_pool_core::CoreError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Glyph store / resolution errors
    #[error(transparent)]
    Glyph(#[from] CoreError),

    /// Database errors
    #[error("Database error: {0}")]
    Database(String),

    /// SQLite errors (auto-converted from rusqlite::Error)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Guidance for the end user, when the error carries any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Glyph(err) => Some(err.hint()),
            Self::Config(_) | Self::Validation(_) => {
                Some("Run `glyph-pool config show` to inspect the active settings.")
            }
            _ => None,
        }
    }
}

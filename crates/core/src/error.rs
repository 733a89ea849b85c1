//! Core Error Types
//!
//! The error taxonomy shared by every glyph-pool component. Storage backends
//! classify their native failures into these variants at the trait boundary,
//! so callers only ever match on this enum.
//!
//! Missing data (absent document, empty query, broken pointer) is never an
//! error here. Those are plain `None` / empty results.

use thiserror::Error;

/// Core error type for the glyph-pool workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed character, image, or identity argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Neither remote nor local persistence accepted a write
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The remote store's access rules rejected the request
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Network or connectivity failure talking to the remote store
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a storage unavailable error
    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a transport unavailable error
    pub fn transport_unavailable(msg: impl Into<String>) -> Self {
        Self::TransportUnavailable(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether retrying the same call later can succeed without changes
    /// from the caller or an operator.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransportUnavailable(_) | Self::StorageUnavailable(_)
        )
    }

    /// Actionable guidance to show next to the error message.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => {
                "Check the character is non-empty and the image is a data:image/... string."
            }
            Self::StorageUnavailable(_) => {
                "Your drawing has not been lost. Free some local storage space and save again."
            }
            Self::PermissionDenied(_) => {
                "The glyph pool's access policy rejected this request. Allow public reads and append-only writes to global glyphs."
            }
            Self::TransportUnavailable(_) => {
                "Could not reach the glyph pool. Check your connection and try again."
            }
            Self::Serialization(_) | Self::Internal(_) => {
                "This is a bug in glyph-pool. Please report it with the log output."
            }
        }
    }
}

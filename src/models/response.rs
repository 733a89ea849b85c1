//! Response Types
//!
//! Standard response types for all CLI commands.

use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

/// Generic command response, printed as-is with `--json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl<T> CommandResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            hint: None,
        }
    }

    /// Create an error response with message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            hint: None,
        }
    }
}

impl<T> From<Result<T, AppError>> for CommandResponse<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut response = Self::err(e.to_string());
                response.hint = e.hint().map(str::to_string);
                response
            }
        }
    }
}

/// Where a saved glyph ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveTarget {
    /// The shared pool; the id is an artifact id
    Pool,
    /// Device-local storage; the id is a local key
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub character: String,
    pub id: String,
    pub target: SaveTarget,
}

/// Resolution outcome for one requested character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveEntry {
    pub character: String,
    /// "own", "global" or "default"
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub character: String,
    pub source: String,
    pub path: String,
    pub bytes: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub identity: String,
    pub remote_configured: bool,
    pub remote_reachable: bool,
    pub remote_error: Option<String>,
    pub artifact_count: Option<u64>,
    pub local_healthy: bool,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: "glyph-pool".to_string(),
            identity: String::new(),
            remote_configured: false,
            remote_reachable: false,
            remote_error: None,
            artifact_count: None,
            local_healthy: false,
        }
    }
}

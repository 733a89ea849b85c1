//! Cross-Platform Path Utilities
//!
//! Resolves the glyph-pool data directory (~/.glyph-pool/) and the files in it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Glyph Pool directory (~/.glyph-pool/)
pub fn glyph_pool_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".glyph-pool"))
}

/// Get the config file path (~/.glyph-pool/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(glyph_pool_dir()?.join("config.json"))
}

/// Get the default shared pool database path (~/.glyph-pool/pool.db)
pub fn default_pool_database_path() -> AppResult<PathBuf> {
    Ok(glyph_pool_dir()?.join("pool.db"))
}

/// Get the default device-local storage path (~/.glyph-pool/local.db)
pub fn default_local_storage_path() -> AppResult<PathBuf> {
    Ok(glyph_pool_dir()?.join("local.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensure the parent directory of a file path exists
pub fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

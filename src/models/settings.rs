//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};

/// Default local storage budget, matching a typical browser origin quota.
pub const DEFAULT_LOCAL_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Use the shared pool database. When false the store runs local-only.
    #[serde(default = "default_remote_enabled")]
    pub remote_enabled: bool,
    /// Shared pool database path (defaults to ~/.glyph-pool/pool.db)
    #[serde(default)]
    pub remote_database_path: Option<String>,
    /// Device-local storage path (defaults to ~/.glyph-pool/local.db)
    #[serde(default)]
    pub local_storage_path: Option<String>,
    /// Byte budget for device-local storage
    #[serde(default = "default_local_quota_bytes")]
    pub local_quota_bytes: u64,
    /// Sentence the composer renders
    #[serde(default = "default_sentence")]
    pub sentence: String,
    /// Log level: "trace", "debug", "info", "warn" or "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_remote_enabled() -> bool {
    true
}

fn default_local_quota_bytes() -> u64 {
    DEFAULT_LOCAL_QUOTA_BYTES
}

fn default_sentence() -> String {
    "Hello World".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote_enabled: default_remote_enabled(),
            remote_database_path: None,
            local_storage_path: None,
            local_quota_bytes: default_local_quota_bytes(),
            sentence: default_sentence(),
            log_level: default_log_level(),
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub remote_enabled: Option<bool>,
    pub remote_database_path: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_quota_bytes: Option<u64>,
    pub sentence: Option<String>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(enabled) = update.remote_enabled {
            self.remote_enabled = enabled;
        }
        if let Some(path) = update.remote_database_path {
            self.remote_database_path = Some(path);
        }
        if let Some(path) = update.local_storage_path {
            self.local_storage_path = Some(path);
        }
        if let Some(quota) = update.local_quota_bytes {
            self.local_quota_bytes = quota;
        }
        if let Some(sentence) = update.sentence {
            self.sentence = sentence;
        }
        if let Some(level) = update.log_level {
            self.log_level = level;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.local_quota_bytes == 0 {
            return Err("local_quota_bytes must be greater than zero".to_string());
        }

        if self.sentence.trim().is_empty() {
            return Err("sentence must contain at least one visible character".to_string());
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if matches!(self.remote_database_path.as_deref(), Some("")) {
            return Err("remote_database_path must not be empty".to_string());
        }

        if matches!(self.local_storage_path.as_deref(), Some("")) {
            return Err("local_storage_path must not be empty".to_string());
        }

        Ok(())
    }
}

//! Settings Commands
//!
//! Commands for reading and updating the configuration file.

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::storage::config::ConfigService;
use crate::utils::error::AppResult;

/// Get current application settings
pub fn get_settings(config: &ConfigService) -> AppResult<AppConfig> {
    Ok(config.get_config().clone())
}

/// Update application settings with a partial update
pub fn update_settings(config: &mut ConfigService, update: SettingsUpdate) -> AppResult<AppConfig> {
    config.update_config(update)
}

/// Point the app at a shared pool database and enable it
pub fn set_remote(config: &mut ConfigService, path: &str) -> AppResult<AppConfig> {
    update_settings(
        config,
        SettingsUpdate {
            remote_enabled: Some(true),
            remote_database_path: Some(path.to_string()),
            ..SettingsUpdate::default()
        },
    )
}

pub fn set_remote_enabled(config: &mut ConfigService, enabled: bool) -> AppResult<AppConfig> {
    update_settings(
        config,
        SettingsUpdate {
            remote_enabled: Some(enabled),
            ..SettingsUpdate::default()
        },
    )
}

/// Restore defaults
pub fn reset_settings(config: &mut ConfigService) -> AppResult<AppConfig> {
    config.reset()?;
    Ok(config.get_config().clone())
}

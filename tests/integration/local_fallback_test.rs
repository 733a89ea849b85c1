//! Local-Only Lifecycle Tests
//!
//! With the shared pool disabled, glyphs and identity live in the device's
//! local storage file and survive restarts.

use std::path::Path;

use glyph_pool::models::settings::AppConfig;
use glyph_pool::state::AppState;
use glyph_pool::storage::local_storage::SqliteLocalStorage;
use glyph_pool_core::{local_glyph_key, CoreError, LocalStorage, Provenance};
use glyph_pool::AppError;

const IMG_X: &str = "data:image/png;base64,WA==";
const IMG_Y: &str = "data:image/png;base64,WQ==";

fn local_config(dir: &Path) -> AppConfig {
    AppConfig {
        remote_enabled: false,
        remote_database_path: Some(dir.join("pool.db").to_string_lossy().to_string()),
        local_storage_path: Some(dir.join("local.db").to_string_lossy().to_string()),
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_glyphs_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = local_config(dir.path());

    let (identity, key) = {
        let state = AppState::from_config(&config, false).unwrap();
        assert!(!state.glyph_store().is_remote_available());
        let key = state.save("x", IMG_X).await.unwrap();
        (state.identity(), key)
    };
    assert_eq!(key, local_glyph_key(&identity, "x"));

    let restarted = AppState::from_config(&config, false).unwrap();
    assert_eq!(restarted.identity(), identity);

    let resolution = restarted.resolve(&["x", "y"]).await;
    assert_eq!(resolution.len(), 1);
    assert_eq!(resolution["x"].image, IMG_X);
    assert_eq!(resolution["x"].provenance, Provenance::Own);

    // No pool was ever created.
    assert!(!dir.path().join("pool.db").exists());
}

#[tokio::test]
async fn test_resave_overwrites_local_glyph() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::from_config(&local_config(dir.path()), false).unwrap();

    let first = state.save("x", IMG_X).await.unwrap();
    let second = state.save("x", IMG_Y).await.unwrap();
    assert_eq!(first, second);

    let own = state
        .glyph_store()
        .load_own_artifacts(&state.identity())
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own["x"], IMG_Y);
}

#[tokio::test]
async fn test_other_identities_on_same_file_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let config = local_config(dir.path());
    let state = AppState::from_config(&config, false).unwrap();
    state.save("x", IMG_X).await.unwrap();

    // A stray entry from another identity sharing the file.
    let storage = SqliteLocalStorage::open(dir.path().join("local.db"), config.local_quota_bytes)
        .unwrap();
    storage
        .set_item(&local_glyph_key("user_0_other", "y"), IMG_Y)
        .unwrap();

    let own = state
        .glyph_store()
        .load_own_artifacts(&state.identity())
        .await
        .unwrap();
    assert_eq!(own.keys().map(String::as_str).collect::<Vec<_>>(), vec!["x"]);

    // No pool, so nobody else's glyphs are reachable either.
    let resolution = state.resolve(&["y"]).await;
    assert!(resolution.is_empty());
}

#[tokio::test]
async fn test_quota_exhaustion_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = local_config(dir.path());
    config.local_quota_bytes = 256;
    let state = AppState::from_config(&config, false).unwrap();

    let huge = format!("data:image/png;base64,{}", "A".repeat(1024));
    let err = state.save("x", &huge).await.unwrap_err();
    assert!(matches!(err, AppError::Glyph(CoreError::StorageUnavailable(_))));
    assert!(err.hint().is_some());

    // The failed write left nothing behind.
    let resolution = state.resolve(&["x"]).await;
    assert!(resolution.is_empty());
}

#[tokio::test]
async fn test_local_only_flag_overrides_enabled_pool() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = local_config(dir.path());
    config.remote_enabled = true;

    let state = AppState::from_config(&config, true).unwrap();
    let key = state.save("x", IMG_X).await.unwrap();
    assert!(key.starts_with("glyph:"));
    assert!(!dir.path().join("pool.db").exists());
}

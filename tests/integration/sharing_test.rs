//! Cross-Identity Sharing Tests
//!
//! Two devices, each with its own local storage (and therefore its own
//! identity), pointed at the same pool database file.

use std::collections::BTreeSet;
use std::path::Path;

use glyph_pool::models::settings::AppConfig;
use glyph_pool::state::AppState;
use glyph_pool_core::Provenance;

const IMG_A1: &str = "data:image/png;base64,QTE=";
const IMG_A2: &str = "data:image/png;base64,QTI=";
const IMG_B1: &str = "data:image/png;base64,QjE=";
const IMG_B2: &str = "data:image/png;base64,QjI=";

// ============================================================================
// Helpers
// ============================================================================

fn device(dir: &Path, name: &str) -> AppState {
    let config = AppConfig {
        remote_database_path: Some(dir.join("pool.db").to_string_lossy().to_string()),
        local_storage_path: Some(
            dir.join(format!("{}-local.db", name))
                .to_string_lossy()
                .to_string(),
        ),
        ..AppConfig::default()
    };
    AppState::from_config(&config, false).expect("failed to build device state")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_devices_have_distinct_identities() {
    let dir = tempfile::tempdir().unwrap();
    let u1 = device(dir.path(), "u1");
    let u2 = device(dir.path(), "u2");

    assert_ne!(u1.identity(), u2.identity());
    // Stable per device
    assert_eq!(u1.identity(), u1.identity());
}

#[tokio::test]
async fn test_own_glyphs_beat_pool_and_gaps_stay_unresolved() {
    let dir = tempfile::tempdir().unwrap();
    let u1 = device(dir.path(), "u1");
    let u2 = device(dir.path(), "u2");

    u1.save("A", IMG_A1).await.unwrap();
    u1.save("B", IMG_B1).await.unwrap();
    u2.save("B", IMG_B2).await.unwrap();

    let seen_by_u2 = u2.resolve(&["A", "B", "C"]).await;
    assert_eq!(seen_by_u2.len(), 2);
    assert_eq!(seen_by_u2["A"].image, IMG_A1);
    assert_eq!(seen_by_u2["A"].provenance, Provenance::Global);
    assert_eq!(seen_by_u2["B"].image, IMG_B2);
    assert_eq!(seen_by_u2["B"].provenance, Provenance::Own);
    assert!(!seen_by_u2.contains_key("C"));

    let seen_by_u1 = u1.resolve(&["A", "B"]).await;
    assert_eq!(seen_by_u1["A"].provenance, Provenance::Own);
    assert_eq!(seen_by_u1["B"].image, IMG_B1);
    assert_eq!(seen_by_u1["B"].provenance, Provenance::Own);
}

#[tokio::test]
async fn test_resave_moves_pointer_and_keeps_old_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let u1 = device(dir.path(), "u1");
    let u2 = device(dir.path(), "u2");

    let first = u1.save("A", IMG_A1).await.unwrap();
    let second = u1.save("A", IMG_A2).await.unwrap();
    assert_ne!(first, second);

    let mine = u1.resolve(&["A"]).await;
    assert_eq!(mine["A"].image, IMG_A2);
    assert_eq!(mine["A"].provenance, Provenance::Own);

    // Both contributions stay in the pool for everyone else.
    let health = u1.health().await;
    assert_eq!(health.artifact_count, Some(2));

    let mut images = BTreeSet::new();
    for _ in 0..64 {
        let theirs = u2.resolve(&["A"]).await;
        assert_eq!(theirs["A"].provenance, Provenance::Global);
        images.insert(theirs["A"].image.clone());
    }
    assert!(images.iter().all(|img| img == IMG_A1 || img == IMG_A2));
}

#[tokio::test]
async fn test_load_own_artifacts_only_returns_own() {
    let dir = tempfile::tempdir().unwrap();
    let u1 = device(dir.path(), "u1");
    let u2 = device(dir.path(), "u2");

    u1.save("A", IMG_A1).await.unwrap();
    u2.save("B", IMG_B2).await.unwrap();

    let own = u2
        .glyph_store()
        .load_own_artifacts(&u2.identity())
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own["B"], IMG_B2);
}

#[tokio::test]
async fn test_composed_sentence_mixes_sources() {
    let dir = tempfile::tempdir().unwrap();
    let u1 = device(dir.path(), "u1");
    let u2 = device(dir.path(), "u2");

    u1.save("H", IMG_A1).await.unwrap();
    u2.save("i", IMG_B2).await.unwrap();

    let composed = u2.compose(Some("Hi!")).await;
    assert_eq!(composed.cells.len(), 3);
    assert_eq!(composed.own_count(), 1);
    assert_eq!(composed.global_count(), 1);
    assert_eq!(composed.default_count(), 1);
}

#[tokio::test]
async fn test_resolve_on_locked_pool_keeps_runtime_responsive() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    let dir = tempfile::tempdir().unwrap();
    let u1 = device(dir.path(), "u1");
    let u2 = device(dir.path(), "u2");
    for character in ["x", "y", "z"] {
        u1.save(character, IMG_A1).await.unwrap();
    }
    // Settle u2's identity before the pool is locked.
    u2.identity();

    let (locked_tx, locked_rx) = std::sync::mpsc::channel();
    let pool_path = dir.path().join("pool.db");
    let holder = std::thread::spawn(move || {
        let conn = rusqlite::Connection::open(pool_path).unwrap();
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

    let resolution = u2.resolve(&["x", "y", "z"]).await;
    ticker.abort();
    holder.join().unwrap();

    assert_eq!(resolution.len(), 3);
    assert!(resolution
        .values()
        .all(|glyph| glyph.provenance == Provenance::Global));
    assert!(ticks.load(Ordering::SeqCst) > 0);
}

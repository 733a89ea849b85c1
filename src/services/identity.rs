//! Identity Provider
//!
//! A self-asserted per-device token, minted once and kept in local storage.
//! It is a pseudonym, not a credential: nothing on the pool side verifies it.

use std::sync::Arc;

use glyph_pool_core::{validate_identity, LocalStorage};
use rand::Rng;
use tracing::{debug, warn};

/// Local storage key holding the device's identity.
pub const IDENTITY_STORAGE_KEY: &str = "glyph_pool_user_id";

const SUFFIX_LEN: usize = 9;

/// Hands out the device's identity token.
#[derive(Clone)]
pub struct IdentityProvider {
    storage: Arc<dyn LocalStorage>,
}

impl IdentityProvider {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// Return the persisted identity, minting and persisting one on first use.
    ///
    /// If local storage cannot be read or written, a fresh token is returned
    /// on every call: the caller loses continuity across sessions but can
    /// still save and resolve.
    pub fn get_or_create_identity(&self) -> String {
        match self.storage.get_item(IDENTITY_STORAGE_KEY) {
            Ok(Some(existing)) if validate_identity(&existing).is_ok() => return existing,
            Ok(Some(existing)) => {
                warn!(stored = %existing, "stored identity is unusable; replacing it");
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "could not read identity from local storage; using a temporary identity");
                return mint_identity();
            }
        }

        let identity = mint_identity();
        match self.storage.set_item(IDENTITY_STORAGE_KEY, &identity) {
            Ok(()) => debug!(identity = %identity, "created new identity"),
            Err(e) => {
                warn!(error = %e, "could not persist identity; it will not survive this session")
            }
        }
        identity
    }
}

/// Mint a token shaped `user_<unix millis>_<9 base-36 chars>`.
pub fn mint_identity() -> String {
    mint_identity_with(
        &mut rand::thread_rng(),
        chrono::Utc::now().timestamp_millis(),
    )
}

/// Mint a token from an explicit random source and timestamp.
pub fn mint_identity_with<R: Rng + ?Sized>(rng: &mut R, millis: i64) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| std::char::from_digit(rng.gen_range(0..36), 36).unwrap_or('0'))
        .collect();
    format!("user_{}_{}", millis, suffix)
}

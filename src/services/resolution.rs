//! Resolution Engine
//!
//! Fills a set of required characters with the best image available, in a
//! fixed order of preference:
//!
//! 1. the asking identity's own glyph (`Provenance::Own`), which is final
//! 2. a random glyph from the shared pool (`Provenance::Global`)
//! 3. nothing, so the caller draws the character in its default typeface
//!
//! Resolution never fails. Lookup errors are logged and the affected
//! characters fall through to the next tier.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;
use glyph_pool_core::ResolvedGlyph;
use tracing::{debug, warn};

use crate::services::glyph_store::{GlyphImages, GlyphStore};

/// Character -> resolved image. Characters missing here get the default typeface.
pub type Resolution = BTreeMap<String, ResolvedGlyph>;

/// Resolves required characters against a glyph store.
#[derive(Clone)]
pub struct ResolutionEngine {
    store: Arc<GlyphStore>,
}

impl ResolutionEngine {
    pub fn new(store: Arc<GlyphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<GlyphStore> {
        &self.store
    }

    /// Resolve every character in `required` for `identity`.
    ///
    /// Empty entries are dropped and duplicates resolved once. Shared-pool
    /// lookups for the characters the identity has not drawn run
    /// concurrently and are all awaited before returning.
    pub async fn resolve<S: AsRef<str>>(&self, identity: &str, required: &[S]) -> Resolution {
        let working_set = working_set(required);
        let mut resolution = Resolution::new();
        if working_set.is_empty() {
            return resolution;
        }

        let own = match self.store.load_own_artifacts(identity).await {
            Ok(own) => own,
            Err(e) => {
                warn!(identity = %identity, error = %e, "could not load own glyphs; using the shared pool only");
                GlyphImages::new()
            }
        };

        let mut missing = Vec::new();
        for character in working_set {
            match own.get(character) {
                Some(image) => {
                    resolution.insert(character.to_string(), ResolvedGlyph::own(image.clone()));
                }
                None => missing.push(character),
            }
        }

        let lookups = missing.into_iter().map(|character| async move {
            let result = self.store.query_random_global_artifact(character).await;
            (character, result)
        });

        for (character, result) in join_all(lookups).await {
            match result {
                Ok(Some(image)) => {
                    resolution.insert(character.to_string(), ResolvedGlyph::global(image));
                }
                Ok(None) => {
                    debug!(character = %character, "no glyph available; default typeface");
                }
                Err(e) => {
                    warn!(character = %character, error = %e, "shared pool lookup failed; default typeface");
                }
            }
        }

        resolution
    }
}

/// Non-empty required characters, first occurrence order, without duplicates.
fn working_set<S: AsRef<str>>(required: &[S]) -> Vec<&str> {
    let mut seen = HashSet::new();
    required
        .iter()
        .map(AsRef::as_ref)
        .filter(|character| !character.is_empty())
        .filter(|character| seen.insert(*character))
        .collect()
}

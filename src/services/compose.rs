//! Sentence Composer
//!
//! Lays out a sentence as a sequence of cells, one per character, using a
//! single resolution pass over its distinct visible characters.

use glyph_pool_core::Provenance;
use serde::{Deserialize, Serialize};

use crate::services::resolution::ResolutionEngine;

/// One position in a composed sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComposedCell {
    /// A hand-drawn glyph
    Glyph {
        character: String,
        image: String,
        provenance: Provenance,
    },
    /// No glyph anywhere; draw the character in the default typeface
    DefaultType { character: String },
    /// Whitespace
    Space,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedSentence {
    pub cells: Vec<ComposedCell>,
}

impl ComposedSentence {
    fn count_provenance(&self, wanted: Provenance) -> usize {
        self.cells
            .iter()
            .filter(|cell| {
                matches!(cell, ComposedCell::Glyph { provenance, .. } if *provenance == wanted)
            })
            .count()
    }

    pub fn own_count(&self) -> usize {
        self.count_provenance(Provenance::Own)
    }

    pub fn global_count(&self) -> usize {
        self.count_provenance(Provenance::Global)
    }

    pub fn default_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, ComposedCell::DefaultType { .. }))
            .count()
    }

    /// True when no visible character needs the default typeface.
    pub fn is_fully_handwritten(&self) -> bool {
        self.default_count() == 0
    }
}

/// Compose `sentence` for `identity`.
pub async fn compose(
    engine: &ResolutionEngine,
    identity: &str,
    sentence: &str,
) -> ComposedSentence {
    let required: Vec<String> = sentence
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(String::from)
        .collect();

    let resolution = engine.resolve(identity, &required).await;

    let cells = sentence
        .chars()
        .map(|c| {
            if c.is_whitespace() {
                return ComposedCell::Space;
            }
            let character = c.to_string();
            match resolution.get(&character) {
                Some(resolved) => ComposedCell::Glyph {
                    image: resolved.image.clone(),
                    provenance: resolved.provenance,
                    character,
                },
                None => ComposedCell::DefaultType { character },
            }
        })
        .collect();

    ComposedSentence { cells }
}

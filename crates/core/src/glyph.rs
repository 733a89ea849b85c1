//! Glyph Data Model
//!
//! Artifacts in the shared pool, per-identity pointer maps, resolution
//! results, and the input contracts every write goes through.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Every stored image must start with this marker (an image data URL).
pub const IMAGE_DATA_MARKER: &str = "data:image/";

/// Namespace for glyph entries in device-local storage.
pub const LOCAL_GLYPH_SCOPE: &str = "glyph";

/// Remote collection holding immutable artifacts.
pub const GLOBAL_GLYPHS_COLLECTION: &str = "globalGlyphs";

/// Remote collection holding one pointer map per identity.
pub const USER_GLYPHS_COLLECTION: &str = "userGlyphs";

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// One immutable drawn glyph in the global pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphArtifact {
    /// Opaque id assigned by the store.
    pub id: String,
    /// The character depicted. Matched exactly, never normalized.
    pub character: String,
    /// Image data URL.
    pub image: String,
    /// Store-assigned creation timestamp (RFC 3339).
    pub created_at: String,
    /// Contributing identity. Provenance only.
    pub owner_id: String,
}

/// An artifact before the store has assigned its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGlyphArtifact {
    pub character: String,
    pub image: String,
    pub owner_id: String,
}

impl NewGlyphArtifact {
    /// Build a validated artifact ready to append.
    pub fn new(
        owner_id: impl Into<String>,
        character: impl Into<String>,
        image: impl Into<String>,
    ) -> CoreResult<Self> {
        let artifact = Self {
            character: character.into(),
            image: image.into(),
            owner_id: owner_id.into(),
        };
        validate_identity(&artifact.owner_id)?;
        validate_character(&artifact.character)?;
        validate_image(&artifact.image)?;
        Ok(artifact)
    }
}

// ---------------------------------------------------------------------------
// Per-identity pointer map
// ---------------------------------------------------------------------------

/// The current artifact choice per character for one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGlyphMap {
    pub owner_id: String,
    #[serde(default)]
    pub character_pointers: BTreeMap<String, String>,
}

impl UserGlyphMap {
    /// Create an empty map for an identity.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            character_pointers: BTreeMap::new(),
        }
    }

    /// Point `character` at `artifact_id`, leaving every other pointer as is.
    ///
    /// Returns the previous artifact id for that character, if any.
    pub fn merge_pointer(
        &mut self,
        character: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Option<String> {
        self.character_pointers
            .insert(character.into(), artifact_id.into())
    }

    pub fn pointer(&self, character: &str) -> Option<&str> {
        self.character_pointers.get(character).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.character_pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.character_pointers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Resolution results
// ---------------------------------------------------------------------------

/// Where a resolved image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provenance {
    /// Drawn by the identity asking for it
    Own,
    /// Picked from the shared pool
    Global,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Own => write!(f, "own"),
            Provenance::Global => write!(f, "global"),
        }
    }
}

/// One resolved character: the image to draw and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGlyph {
    pub image: String,
    pub provenance: Provenance,
}

impl ResolvedGlyph {
    pub fn own(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            provenance: Provenance::Own,
        }
    }

    pub fn global(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            provenance: Provenance::Global,
        }
    }
}

// ---------------------------------------------------------------------------
// Input contracts
// ---------------------------------------------------------------------------

/// A character must be a non-empty string.
pub fn validate_character(character: &str) -> CoreResult<()> {
    if character.is_empty() {
        return Err(CoreError::invalid_input("character must not be empty"));
    }
    Ok(())
}

/// An image must be a non-empty string starting with [`IMAGE_DATA_MARKER`].
///
/// Only the prefix is checked; the payload is not decoded.
pub fn validate_image(image: &str) -> CoreResult<()> {
    if image.is_empty() {
        return Err(CoreError::invalid_input("image must not be empty"));
    }
    if !image.starts_with(IMAGE_DATA_MARKER) {
        return Err(CoreError::invalid_input(format!(
            "image must begin with '{}'",
            IMAGE_DATA_MARKER
        )));
    }
    Ok(())
}

/// Separator between the parts of a local glyph key.
pub const LOCAL_KEY_SEPARATOR: char = ':';

/// An identity must be a non-empty string without [`LOCAL_KEY_SEPARATOR`],
/// so one identity's local key prefix can never cover another's keys.
pub fn validate_identity(identity: &str) -> CoreResult<()> {
    if identity.is_empty() {
        return Err(CoreError::invalid_input("identity must not be empty"));
    }
    if identity.contains(LOCAL_KEY_SEPARATOR) {
        return Err(CoreError::invalid_input(format!(
            "identity must not contain '{}'",
            LOCAL_KEY_SEPARATOR
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Local key layout
// ---------------------------------------------------------------------------

/// Prefix shared by every local glyph key of one identity.
pub fn local_glyph_prefix(identity: &str) -> String {
    format!(
        "{scope}{sep}{identity}{sep}",
        scope = LOCAL_GLYPH_SCOPE,
        sep = LOCAL_KEY_SEPARATOR
    )
}

/// Local key for one `(identity, character)` pair.
pub fn local_glyph_key(identity: &str, character: &str) -> String {
    format!("{}{}", local_glyph_prefix(identity), character)
}

/// Recover the character from a local key belonging to `identity`.
pub fn character_from_local_key<'a>(identity: &str, key: &'a str) -> Option<&'a str> {
    let prefix = local_glyph_prefix(identity);
    key.strip_prefix(prefix.as_str())
        .filter(|character| !character.is_empty())
}

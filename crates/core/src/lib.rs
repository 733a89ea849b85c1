//! Glyph Pool Core
//!
//! Foundational types for the glyph-pool workspace: the error taxonomy, the
//! glyph data model with its input contracts, and the storage traits the
//! application crate implements. Nothing here touches SQLite, the filesystem,
//! or a runtime.
//!
//! ## Module Organization
//!
//! - `error` - Error taxonomy (`CoreError`, `CoreResult`)
//! - `glyph` - Artifacts, pointer maps, provenance, validation, local key layout
//! - `store` - Storage seams (`DocumentStore`, `LocalStorage`)

pub mod error;
pub mod glyph;
pub mod store;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Data Model ─────────────────────────────────────────────────────────
pub use glyph::{
    character_from_local_key, local_glyph_key, local_glyph_prefix, validate_character,
    validate_identity, validate_image, GlyphArtifact, NewGlyphArtifact, Provenance,
    ResolvedGlyph, UserGlyphMap, GLOBAL_GLYPHS_COLLECTION, IMAGE_DATA_MARKER,
    LOCAL_GLYPH_SCOPE, LOCAL_KEY_SEPARATOR, USER_GLYPHS_COLLECTION,
};

// ── Storage Seams ──────────────────────────────────────────────────────
pub use store::{DocumentStore, LocalStorage};

//! Services
//!
//! The glyph pipeline: identity, storage, resolution, and composition.

pub mod compose;
pub mod glyph_store;
pub mod identity;
pub mod resolution;

pub use compose::{compose, ComposedCell, ComposedSentence};
pub use glyph_store::{GlyphImages, GlyphStore, RemoteStore};
pub use identity::{mint_identity, IdentityProvider, IDENTITY_STORAGE_KEY};
pub use resolution::{Resolution, ResolutionEngine};

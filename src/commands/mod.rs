//! Commands
//!
//! Handlers behind each CLI subcommand. Each returns plain data; rendering
//! is left to the binary.

pub mod glyphs;
pub mod health;
pub mod identity;
pub mod settings;

pub use glyphs::*;
pub use health::*;
pub use identity::*;
pub use settings::*;

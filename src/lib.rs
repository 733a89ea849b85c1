//! Glyph Pool
//!
//! A shared pool of hand-drawn glyphs. Each device gets an anonymous
//! identity; glyphs it saves go to a shared, append-only pool (or to
//! device-local storage when the pool is unavailable), and any character the
//! device has not drawn is filled with a random contribution from someone
//! else.
//!
//! - `cli` / `commands`: the `glyph-pool` command surface
//! - `services`: identity, glyph store, resolution, composition
//! - `storage`: SQLite-backed shared pool and local storage, config file
//! - `models` / `utils`: settings, responses, errors and paths

pub mod cli;
pub mod commands;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::{GlyphStore, IdentityProvider, RemoteStore, ResolutionEngine};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};

//! Storage Layer
//!
//! Handles all data persistence: the shared pool database, device-local
//! key-value storage, and JSON config.

pub mod config;
pub mod database;
pub mod document_store;
pub mod local_storage;

pub use config::*;
pub use database::*;
pub use document_store::*;
pub use local_storage::*;

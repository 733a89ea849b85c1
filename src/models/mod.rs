//! Data Models
//!
//! Serializable configuration and command response types.

pub mod response;
pub mod settings;

pub use response::*;
pub use settings::*;

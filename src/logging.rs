//! Logging
//!
//! Installs the global `tracing` subscriber for the binary. `RUST_LOG` wins
//! when set; otherwise the configured level applies to this crate and its
//! core crate.

use std::io::stderr;

use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Directives used when `RUST_LOG` is not set.
pub fn default_directives(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("glyph_pool={level},glyph_pool_core={level},r2d2=warn")
}

/// Install the subscriber. Safe to call once per process.
pub fn init(level: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level, verbose)));

    // A second init (e.g. in tests) is not an error worth surfacing.
    let _ = registry()
        .with(filter)
        .with(fmt::layer().with_writer(stderr))
        .try_init();
}

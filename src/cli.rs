//! Command-line interface for glyph-pool.
//!
//! Argument parsing only; the handlers live in `commands`.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

/// glyph-pool - A shared pool of hand-drawn glyphs
#[derive(Parser, Debug)]
#[command(name = "glyph-pool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.glyph-pool/config.json
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip the shared pool for this run
    #[arg(long, global = true)]
    pub local_only: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the command response as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print this device's identity
    Whoami,

    /// Save a glyph for a character
    #[command(group(ArgGroup::new("image").required(true).args(["image_file", "data_url"])))]
    Save {
        /// The character the glyph draws
        character: String,

        /// Image file to encode (png, jpg, gif or webp)
        #[arg(long, value_name = "FILE")]
        image_file: Option<PathBuf>,

        /// Ready-made data:image/... URL
        #[arg(long, value_name = "URL")]
        data_url: Option<String>,
    },

    /// Show where each character's glyph comes from
    Resolve {
        /// Characters to resolve
        #[arg(required = true)]
        characters: Vec<String>,
    },

    /// Lay out a sentence with the best available glyphs
    Compose {
        /// Sentence to compose (defaults to the configured one)
        #[arg(long)]
        sentence: Option<String>,
    },

    /// Write a character's resolved glyph image to a file
    Export {
        character: String,
        out: PathBuf,
    },

    /// Check the shared pool and local storage
    Doctor,

    /// Inspect or change settings
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the active settings
    Show,
    /// Use the shared pool database at PATH
    SetRemote { path: String },
    /// Stop using the shared pool
    DisableRemote,
    /// Resume using the shared pool
    EnableRemote,
    /// Restore default settings
    Reset,
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oembed")]
#[command(author, version, about = "Turn URLs into embeddable HTML")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a URL and print its embed markup
    Resolve {
        /// URL to embed
        #[arg(required = true)]
        url: String,

        /// Render at this width, keeping the aspect ratio
        #[arg(short, long)]
        width: Option<u32>,

        /// Print the AMP variant
        #[arg(long)]
        amp: bool,

        /// Output the embed as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which provider handles a URL, without fetching anything
    Match {
        /// URL to match
        #[arg(required = true)]
        url: String,
    },

    /// List configured providers in match order
    Providers,

    /// Validate a providers file
    Validate {
        /// Providers file to validate (uses the configured list if not specified)
        path: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trailarr - Keep one best trailer next to every Radarr movie
///
/// Without a subcommand trailarr runs as a Radarr custom script and reads
/// the event from the `radarr_*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "trailarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: <config_dir>/trailarr/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize trailers
    Sync {
        /// Only this movie (TMDB ID)
        #[arg(long, value_name = "TMDB_ID", conflicts_with = "all", required_unless_present = "all")]
        tmdb: Option<u64>,

        /// Every movie Radarr has a file for
        #[arg(long)]
        all: bool,
    },

    /// Run preflight checks
    Check,

    /// Inspect or edit the download history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List downloaded trailers of a movie, best first
    List {
        /// TMDB ID
        #[arg(value_name = "TMDB_ID")]
        tmdb: u64,
    },

    /// Always prefer one trailer for a movie
    Force {
        /// TMDB ID
        #[arg(value_name = "TMDB_ID")]
        tmdb: u64,

        /// Source URL of the trailer
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Go back to quality-based selection
    Unforce {
        /// TMDB ID
        #[arg(value_name = "TMDB_ID")]
        tmdb: u64,
    },

    /// Drop every record of a movie
    Forget {
        /// TMDB ID
        #[arg(value_name = "TMDB_ID")]
        tmdb: u64,
    },
}

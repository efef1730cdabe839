//! CLI argument definitions for minicross.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use minicross::config::sync::COMPLETIONS_LIMIT;

#[derive(Parser)]
#[command(name = "minicross")]
#[command(about = "Daily mini crossword", version)]
pub struct Args {
    /// Directory for cached puzzles, progress, stats and the sync queue
    #[arg(long, value_name = "DIR", env = "MINICROSS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Load options from a TOML file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// API endpoint URL
    #[arg(long, env = "MINICROSS_API_ENDPOINT")]
    pub api_endpoint: Option<String>,

    /// API token
    #[arg(long, env = "MINICROSS_API_TOKEN")]
    pub api_token: Option<String>,

    /// Signed-in user id (anonymous when omitted)
    #[arg(long, env = "MINICROSS_USER")]
    pub user: Option<String>,

    /// Puzzle date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check a puzzle document for shape errors
    Validate {
        /// Puzzle JSON file
        file: PathBuf,
        /// Exit with an error instead of warning
        #[arg(long)]
        strict: bool,
    },
    /// List the day's clues in play order
    Clues {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play the day's puzzle from a script of moves
    Play {
        /// Script file, or "-" for stdin
        #[arg(default_value = "-")]
        script: String,
        /// Site used in the share link
        #[arg(long, default_value = "https://minicross.app")]
        site_url: String,
        /// Start with the connection down: remote writes wait in the sync
        /// queue until an `online` move
        #[arg(long)]
        offline: bool,
    },
    /// Show local stats
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show queued sync operations
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay the sync queue against the API
    Sync {
        /// Retry each operation with exponential backoff
        #[arg(long)]
        retry: bool,
    },
    /// List completions recorded remotely
    Completions {
        /// Maximum number of rows
        #[arg(long, default_value_t = COMPLETIONS_LIMIT)]
        limit: usize,
    },
    /// Show or update the local profile
    Profile {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Setting as KEY=VALUE (VALUE parsed as JSON, else kept as a string)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        settings: Vec<String>,
    },
}

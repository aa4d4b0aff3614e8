use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for cityfinder
#[derive(Debug, Parser)]
#[command(
    name = "cityfinder",
    version,
    about = "Search the world cities directory and manage favorite cities"
)]
pub struct CliArgs {
    /// Path to a local dataset (JSON array of city records, optionally .json.gz)
    #[arg(short = 'i', long = "input", global = true, conflicts_with = "url")]
    pub input: Option<PathBuf>,

    /// Download the dataset from this URL instead of the configured one
    #[arg(short = 'u', long = "url", global = true)]
    pub url: Option<String>,

    /// Directory holding persisted favorites (default: ./.cityfinder)
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show dataset and favorites counts
    Stats,

    /// List cities whose name starts with a prefix (case-insensitive)
    Search {
        /// Name prefix; empty lists everything
        #[arg(default_value = "")]
        prefix: String,

        /// Only show favorite cities
        #[arg(short = 'f', long = "favorites")]
        favorites: bool,

        /// Maximum number of rows to print
        #[arg(short = 'n', long = "limit", default_value_t = 20)]
        limit: usize,
    },

    /// Manage favorite cities
    #[command(subcommand)]
    Fav(FavCommand),
}

#[derive(Debug, Subcommand)]
pub enum FavCommand {
    /// Mark a city as favorite
    Add { id: i64 },
    /// Unmark a city
    Remove { id: i64 },
    /// Flip the favorite state of a city
    Toggle { id: i64 },
    /// List favorite cities present in the dataset
    List,
    /// Remove all favorites
    Clear,
}

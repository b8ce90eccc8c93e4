//! CLI commands and argument parsing

use crate::pagination::PageType;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Browse BeatSaver from the command line
#[derive(Parser, Debug)]
#[command(name = "beatsaver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client options file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Service root, overriding the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Fail on HTTP 429 instead of waiting for the reset
    #[arg(long, global = true)]
    pub no_rate_limit_handling: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log level, raised to debug by `--verbose`
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a built-in map listing
    List {
        /// Which listing
        kind: ListingKind,

        /// Page index
        #[arg(short, long, default_value = "0")]
        page: u32,

        /// Walk every page from the start
        #[arg(long)]
        all: bool,

        /// Stop after this many maps (with --all)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search maps
    Search {
        /// Search text
        query: String,

        /// Treat the query as advanced (Lucene) syntax
        #[arg(long)]
        advanced: bool,

        /// Page index
        #[arg(short, long, default_value = "0")]
        page: u32,
    },

    /// Look up a map by key
    Map {
        /// Short map key
        key: String,
    },

    /// Look up a map by hash
    Hash {
        /// Map content hash
        hash: String,
    },

    /// Look up a user
    User {
        /// User id
        id: String,

        /// Also list the user's uploads
        #[arg(long)]
        maps: bool,

        /// Uploads page index (with --maps)
        #[arg(short, long, default_value = "0")]
        page: u32,
    },
}

/// Listing selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingKind {
    Latest,
    Hot,
    Rating,
    Downloads,
    Plays,
}

impl From<ListingKind> for PageType {
    fn from(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Latest => PageType::Latest,
            ListingKind::Hot => PageType::Hot,
            ListingKind::Rating => PageType::Rating,
            ListingKind::Downloads => PageType::Downloads,
            ListingKind::Plays => PageType::Plays,
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}

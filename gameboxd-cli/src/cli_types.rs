//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gameboxd")]
#[command(about = "Run and maintain the Gameboxd game catalog", long_about = None)]
pub(crate) struct Cli {
    /// Settings file (defaults to ~/.config/gameboxd/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the catalog database path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind (overrides settings)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides settings)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Import a JSON array of games from a file
    Import {
        /// Path to the JSON file
        file: PathBuf,

        /// Provenance label recorded on new games (default: "JSON Upload")
        #[arg(long)]
        tag: Option<String>,
    },

    /// Import top-rated games from RAWG
    ImportPopular {
        /// First page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Games per page (RAWG allows at most 40)
        #[arg(long, default_value_t = 20)]
        page_size: u32,

        /// Number of consecutive pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Detail requests in flight at once (overrides settings)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Manage API keys
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Show catalog statistics and recent imports
    Stats {
        /// Number of recent import runs to show
        #[arg(long, default_value_t = 5)]
        recent: u32,
    },

    /// Show settings and credentials
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum KeysAction {
    /// Issue a new API key
    Generate {
        /// Who or what the key is for
        #[arg(short, long, default_value = "")]
        description: String,

        /// Never meter this key
        #[arg(long)]
        unlimited: bool,

        /// Requests allowed per month
        #[arg(long, default_value_t = 1000)]
        monthly_limit: i64,
    },

    /// List issued keys and their usage
    List,

    /// Zero every key's monthly usage (run at the start of each month)
    ResetUsage,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show effective settings and where RAWG credentials come from
    Show,

    /// Print the settings file path
    Path,
}

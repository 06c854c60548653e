//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Scan command arguments.
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Record store to scan (defaults to the configured path)
    #[arg(short, long, value_name = "FILE")]
    pub records: Option<PathBuf>,

    /// Skip the verification request
    #[arg(long)]
    pub no_verify: bool,

    /// Render the route map when verification does not succeed
    #[arg(long)]
    pub visual: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Fetch command arguments.
#[derive(Debug, Args)]
pub struct FetchCommand {
    /// Overwrite an existing record store
    #[arg(short, long)]
    pub force: bool,

    /// Where to write the records (defaults to the configured path)
    #[arg(short, long, value_name = "FILE")]
    pub records: Option<PathBuf>,
}

/// Verify command arguments.
#[derive(Debug, Args)]
pub struct VerifyCommand {
    /// Token to send as the last path segment
    pub token: String,
}

/// Download command arguments.
#[derive(Debug, Args)]
pub struct DownloadCommand {
    /// Granted token whose documents are downloaded
    pub token: String,

    /// Directory to save the documents in (defaults to the configured one)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Document to download; repeatable (defaults to the configured list)
    #[arg(long = "file", value_name = "NAME")]
    pub files: Vec<String>,
}

/// Map command arguments.
#[derive(Debug, Args)]
pub struct MapCommand {
    /// Record store to plot (defaults to the configured path)
    #[arg(short, long, value_name = "FILE")]
    pub records: Option<PathBuf>,

    /// Where to write the SVG (defaults to the configured path)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Findings table and token
    #[default]
    Plain,
    /// JSON document
    Json,
}

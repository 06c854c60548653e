//! Command-line interface for flightclues.
//!
//! This module provides the CLI structure for the `fclues` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DownloadCommand, FetchCommand, MapCommand, OutputFormat, ScanCommand,
    VerifyCommand,
};

/// fclues - Recover the message hidden in flight record anomalies
///
/// Scans a JSON store of flight records for stray characters, orders them
/// chronologically into a candidate token and checks it against an endpoint.
#[derive(Debug, Parser)]
#[command(name = "fclues")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the record store and verify the candidate token
    Scan(ScanCommand),

    /// Download the paginated flight listing into the record store
    Fetch(FetchCommand),

    /// Verify a hand-picked token against the endpoint
    Verify(VerifyCommand),

    /// Download the documents a granted token unlocks
    Download(DownloadCommand),

    /// Render the route map for the record store
    Map(MapCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "fclues");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["fclues", "-q", "scan"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["fclues", "scan"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["fclues", "-v", "scan"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["fclues", "-vv", "scan"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_scan_defaults() {
        let cli = parse(&["fclues", "scan"]);
        let Command::Scan(scan) = cli.command else {
            panic!("expected scan");
        };
        assert!(scan.records.is_none());
        assert!(!scan.no_verify);
        assert!(!scan.visual);
        assert_eq!(scan.format, OutputFormat::Plain);
    }

    #[test]
    fn test_parse_scan_options() {
        let cli = parse(&[
            "fclues", "scan", "--records", "db.json", "--no-verify", "--visual", "--format", "json",
        ]);
        let Command::Scan(scan) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(scan.records, Some(PathBuf::from("db.json")));
        assert!(scan.no_verify);
        assert!(scan.visual);
        assert_eq!(scan.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_fetch_force() {
        let cli = parse(&["fclues", "fetch", "--force"]);
        assert!(matches!(cli.command, Command::Fetch(FetchCommand { force: true, .. })));
    }

    #[test]
    fn test_parse_verify_requires_token() {
        assert!(Cli::try_parse_from(["fclues", "verify"]).is_err());
        let cli = parse(&["fclues", "verify", "ABC-123"]);
        let Command::Verify(verify) = cli.command else {
            panic!("expected verify");
        };
        assert_eq!(verify.token, "ABC-123");
    }

    #[test]
    fn test_parse_download_defaults() {
        let cli = parse(&["fclues", "download", "SHADOW"]);
        let Command::Download(download) = cli.command else {
            panic!("expected download");
        };
        assert_eq!(download.token, "SHADOW");
        assert!(download.output.is_none());
        assert!(download.files.is_empty());
    }

    #[test]
    fn test_parse_download_files() {
        let cli = parse(&[
            "fclues", "download", "SHADOW", "-o", "docs", "--file", "a.pdf", "--file", "b.pdf",
        ]);
        let Command::Download(download) = cli.command else {
            panic!("expected download");
        };
        assert_eq!(download.output, Some(PathBuf::from("docs")));
        assert_eq!(download.files, vec!["a.pdf".to_string(), "b.pdf".to_string()]);
    }

    #[test]
    fn test_parse_map_output() {
        let cli = parse(&["fclues", "map", "-o", "out.svg"]);
        let Command::Map(map) = cli.command else {
            panic!("expected map");
        };
        assert_eq!(map.output, Some(PathBuf::from("out.svg")));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["fclues", "config", "validate", "--file", "c.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["fclues", "-c", "/custom/config.toml", "scan"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}

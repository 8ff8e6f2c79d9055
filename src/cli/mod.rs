//! CLI interface using clap
//!
//! Provides the command-line interface for lexscan

mod commands;

pub use commands::*;

use crate::config::Profile;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// lexscan - Legal document detection and extraction
#[derive(Parser, Debug)]
#[command(name = "lexscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/lexscan/config.toml)
    #[arg(short, long, global = true, env = "LEXSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tuning profile, overriding the configuration file
    #[arg(short, long, global = true)]
    pub profile: Option<Profile>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a page as legal document or not
    Detect(PageArgs),

    /// Extract text, outline and chunks from a page
    Extract(ExtractArgs),

    /// Classify a page and extract it when it is a legal document
    Analyze(PageArgs),

    /// List the chunks of a page, or print one of them
    Chunks(ChunksArgs),

    /// Show or reset configuration
    Config(ConfigArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A saved HTML snapshot and where it came from
#[derive(Args, Debug)]
pub struct PageArgs {
    /// HTML file holding the rendered page
    pub file: PathBuf,

    /// URL the page was loaded from
    #[arg(short, long)]
    pub url: String,

    /// Page title (defaults to the document's <title>)
    #[arg(short, long)]
    pub title: Option<String>,
}

/// Arguments for extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Keep the raw text instead of cleaning it
    #[arg(long)]
    pub no_clean: bool,

    /// Skip chunking
    #[arg(long)]
    pub no_chunks: bool,

    /// Skip outline and section extraction
    #[arg(long)]
    pub no_structure: bool,

    /// Skip document metadata
    #[arg(long)]
    pub no_metadata: bool,

    /// Maximum cleaned text length in characters
    #[arg(long)]
    pub max_length: Option<usize>,
}

/// Arguments for chunks command
#[derive(Args, Debug)]
pub struct ChunksArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Print only the chunk at this index
    #[arg(short, long)]
    pub index: Option<usize>,
}

/// Arguments for config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Write the defaults of the active profile
    #[arg(long)]
    pub reset: bool,

    /// Print the configuration file path
    #[arg(long)]
    pub path: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "lexscan",
            "detect",
            "page.html",
            "--url",
            "https://acme.com/terms",
        ]);
        assert!(matches!(cli.command, Commands::Detect(_)));

        if let Commands::Detect(args) = cli.command {
            assert_eq!(args.url, "https://acme.com/terms");
            assert!(args.title.is_none());
        }
    }

    #[test]
    fn test_extract_flags() {
        let cli = Cli::parse_from([
            "lexscan",
            "-o",
            "json",
            "--profile",
            "lax",
            "extract",
            "page.html",
            "-u",
            "https://acme.com/terms",
            "--no-chunks",
            "--max-length",
            "5000",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.profile, Some(Profile::Lax));

        if let Commands::Extract(args) = cli.command {
            assert!(args.no_chunks);
            assert!(!args.no_clean);
            assert_eq!(args.max_length, Some(5000));
        } else {
            panic!("expected extract command");
        }
    }

    #[test]
    fn test_chunks_index() {
        let cli = Cli::parse_from([
            "lexscan", "chunks", "page.html", "--url", "http://localhost/t", "--index", "2",
        ]);
        if let Commands::Chunks(args) = cli.command {
            assert_eq!(args.index, Some(2));
        } else {
            panic!("expected chunks command");
        }
    }
}

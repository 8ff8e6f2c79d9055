//! lexscan - Legal document detection and extraction tool
//!
//! Classifies saved HTML snapshots as legal documents and extracts their
//! text, outline and chunks.

use anyhow::Result;
use clap::Parser;
use lexscan::cli::{
    analyze, config_path, detect, extract, extract_options, handle_config, load_config,
    load_page, print_analysis_text, print_chunk_text, print_chunks_text,
    print_classification_text, print_extraction_text, print_json, Cli, Commands, OutputFormat,
};
use lexscan::ExtractOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging on stderr so JSON on stdout stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let path = config_path(cli.config.as_deref());
    let config = load_config(path.as_deref(), cli.profile)?;

    // Execute command
    match cli.command {
        Commands::Detect(args) => {
            let page = load_page(&args)?;
            let result = detect(&config, &page);

            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Text => print_classification_text(&result),
            }
        }

        Commands::Extract(args) => {
            let page = load_page(&args.page)?;
            let result = extract(&config, &page, &extract_options(&args));

            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Text => print_extraction_text(&result),
            }
        }

        Commands::Analyze(args) => {
            let page = load_page(&args)?;
            let analysis = analyze(&config, &page);

            match cli.format {
                OutputFormat::Json => print_json(&analysis)?,
                OutputFormat::Text => print_analysis_text(&analysis),
            }
        }

        Commands::Chunks(args) => {
            let page = load_page(&args.page)?;
            let result = extract(&config, &page, &ExtractOptions::default());

            if !result.success {
                match cli.format {
                    OutputFormat::Json => print_json(&result)?,
                    OutputFormat::Text => print_extraction_text(&result),
                }
                return Ok(());
            }

            match (args.index, cli.format) {
                (Some(index), format) => match result.chunk(index) {
                    Some(chunk) if format == OutputFormat::Json => print_json(chunk)?,
                    Some(chunk) => print_chunk_text(chunk),
                    None => println!(
                        "No chunk at index {} ({} chunks)",
                        index,
                        result.chunks().len()
                    ),
                },
                (None, OutputFormat::Json) => print_json(result.chunks())?,
                (None, OutputFormat::Text) => print_chunks_text(result.chunks()),
            }
        }

        Commands::Config(args) => {
            handle_config(path.as_deref(), &config, &args)?;
        }
    }

    Ok(())
}

//! Command implementations

use super::{ConfigArgs, ExtractArgs, PageArgs};
use crate::config::{Config, Profile};
use crate::detect::{ClassificationResult, Detector};
use crate::extract::{Chunk, ExtractOptions, ExtractionResult, Extractor};
use crate::page::PageView;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Combined output of the analyze command
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub classification: ClassificationResult,
    /// Present only for positive verdicts
    pub extraction: Option<ExtractionResult>,
}

/// Resolve the configuration file path
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(Config::default_path)
}

/// Load configuration and apply a command-line profile override
pub fn load_config(path: Option<&Path>, profile: Option<Profile>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_or_default(path)?,
        None => Config::default(),
    };

    if let Some(profile) = profile {
        config.apply_profile(profile);
    }

    Ok(config)
}

/// Read and parse an HTML snapshot
pub fn load_page(args: &PageArgs) -> Result<PageView> {
    let html = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read HTML file: {:?}", args.file))?;

    let page = PageView::parse(&args.url, &html);
    Ok(match args.title.as_deref() {
        Some(title) => page.with_title(title),
        None => page,
    })
}

/// Extraction options from command-line flags
pub fn extract_options(args: &ExtractArgs) -> ExtractOptions {
    let defaults = ExtractOptions::default();
    ExtractOptions {
        include_metadata: !args.no_metadata,
        clean_text: !args.no_clean,
        chunk_text: !args.no_chunks,
        preserve_structure: !args.no_structure,
        max_length: args.max_length.unwrap_or(defaults.max_length),
    }
}

/// Classify a page
pub fn detect(config: &Config, page: &PageView) -> ClassificationResult {
    let mut detector = Detector::with_config(config.detector.clone());
    detector.classify(page)
}

/// Extract a page
pub fn extract(config: &Config, page: &PageView, options: &ExtractOptions) -> ExtractionResult {
    let mut extractor = Extractor::with_config(config.extractor.clone());
    extractor.extract(page, options)
}

/// Classify, then extract only legal documents
pub fn analyze(config: &Config, page: &PageView) -> Analysis {
    let mut detector = Detector::with_config(config.detector.clone());
    let classification = detector.classify(page);

    let extraction = detector.is_current_page_legal(page).then(|| {
        let mut extractor = Extractor::with_config(config.extractor.clone());
        extractor.extract(page, &ExtractOptions::default())
    });

    Analysis {
        classification,
        extraction,
    }
}

/// Show, reset or locate the configuration file
pub fn handle_config(path: Option<&Path>, config: &Config, args: &ConfigArgs) -> Result<()> {
    if args.path {
        match path {
            Some(path) => println!("{}", path.display()),
            None => println!("No configuration directory available"),
        }
    }

    if args.reset {
        let path = path.context("No configuration path; pass --config")?;
        Config::for_profile(config.profile).save(path)?;
        println!("✓ Configuration reset to {} defaults: {}", config.profile, path.display());
    }

    if args.show || (!args.reset && !args.path) {
        let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
        println!("{}", content);
    }

    Ok(())
}

/// Print any result as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a classification in text format
pub fn print_classification_text(result: &ClassificationResult) {
    let verdict = if result.is_legal_document {
        "✓ Legal document"
    } else {
        "✗ Not a legal document"
    };

    println!("{}", verdict);
    println!("   URL: {}", result.signature.url);
    if let Some(doc_type) = result.document_type {
        println!("   Type: {}", doc_type.label());
    }
    println!("   Confidence: {:.0}%", result.confidence * 100.0);

    if result.short_circuited {
        println!("   Skipped: page excluded before scanning");
    }
    if let Some(ref error) = result.error {
        println!("   Error: {}", error);
        return;
    }

    let i = &result.indicators;
    println!(
        "   Signals: url={} title={} content={} structure={}",
        i.url_match, i.title_match, i.content_match, i.structural_match
    );

    let m = &result.metadata;
    println!(
        "   Words: {}  Sections: {}  TOC: {}  Legal phrases: {}",
        m.word_count, m.section_count, m.has_table_of_contents, m.legal_phrase_count
    );
    if let Some(ref updated) = m.last_updated_text {
        println!("   Last updated: {}", updated);
    }
}

/// Print an extraction in text format
pub fn print_extraction_text(result: &ExtractionResult) {
    let Some(document) = result.document.as_ref() else {
        let message = result
            .error
            .as_ref()
            .map(|f| format!("{}: {}", f.kind, f.message))
            .unwrap_or_default();
        println!("✗ Extraction failed: {}", message);
        return;
    };

    println!("Extraction: {}", result.url);
    println!("===========\n");

    if let Some(ref metadata) = document.metadata {
        println!("Words: {}", metadata.word_count);
        println!("Characters: {}", metadata.char_count);
        println!("Reading time: {} min", metadata.reading_time_minutes);
        println!("Language: {}", metadata.language);
        if let Some(ref updated) = metadata.last_updated_text {
            println!("Last updated: {}", updated);
        }
    }
    if document.truncated {
        println!("Text truncated to {} characters", document.cleaned_text.chars().count());
    }

    if !document.sections.is_empty() {
        println!("\nSections:");
        for section in &document.sections {
            let indent = "  ".repeat(section.heading_level.max(1) as usize);
            println!(
                "{}{} ({} chars)",
                indent,
                section.title,
                section.content.chars().count()
            );
        }
    }

    let outline = &document.structure;
    if !outline.lists.is_empty() || !outline.tables.is_empty() {
        println!(
            "\nLists: {}  Tables: {}",
            outline.lists.len(),
            outline.tables.len()
        );
    }

    println!();
    print_chunks_text(&document.chunks);
}

/// Print a chunk listing in text format
pub fn print_chunks_text(chunks: &[Chunk]) {
    if chunks.is_empty() {
        println!("No chunks.");
        return;
    }

    println!("Chunks ({}):", chunks.len());
    for chunk in chunks {
        let title = chunk.title.as_deref().unwrap_or("-");
        println!(
            "  [{}] {} {} ({} chars) {}",
            chunk.index,
            chunk.id,
            chunk.kind,
            chunk.char_len(),
            title
        );
    }
}

/// Print a single chunk in text format
pub fn print_chunk_text(chunk: &Chunk) {
    println!("[{}] {} ({})", chunk.index, chunk.id, chunk.kind);
    if let Some(ref title) = chunk.title {
        println!("{}", title);
    }
    println!();
    println!("{}", chunk.text);
}

/// Print the analyze command output in text format
pub fn print_analysis_text(analysis: &Analysis) {
    print_classification_text(&analysis.classification);
    if let Some(ref extraction) = analysis.extraction {
        println!();
        print_extraction_text(extraction);
    }
}

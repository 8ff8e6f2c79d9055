//! Extraction engine
//!
//! Isolates the main content, applies the sufficiency gate, cleans, truncates,
//! builds the outline and sections, chunks, and caches by (url, options).

use super::outline::{build_outline, build_sections, limit_sections};
use super::{
    chunk_document, content_hash, ChunkConfig, DocumentMetadata, ExtractOptions,
    ExtractedDocument, ExtractionResult, StructuralOutline,
};
use crate::error::ScanError;
use crate::page::PageView;
use crate::text::{
    char_len, clean, detect_language, last_updated, reading_time_minutes, truncate_chars,
    word_count,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Configuration for extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Minimum raw text length for ordinary pages
    pub min_document_length: usize,
    /// Minimum raw text length for local and test pages
    pub relaxed_min_document_length: usize,
    /// Upper bound accepted for `ExtractOptions::max_length`
    pub max_length_ceiling: usize,
    pub chunking: ChunkConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_document_length: 2000,
            relaxed_min_document_length: 100,
            max_length_ceiling: 1_000_000,
            chunking: ChunkConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Minimum raw length required for `page`
    pub fn min_length_for(&self, page: &PageView) -> usize {
        if page.is_local() {
            self.relaxed_min_document_length
        } else {
            self.min_document_length
        }
    }
}

/// Legal text extractor with its own result cache
pub struct Extractor {
    config: ExtractorConfig,
    cache: HashMap<String, ExtractionResult>,
    last: Option<ExtractionResult>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            config,
            cache: HashMap::new(),
            last: None,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a page, serving repeated (url, options) pairs from the cache
    ///
    /// Never fails: errors become `success: false` results, which are not cached.
    pub fn extract(&mut self, page: &PageView, options: &ExtractOptions) -> ExtractionResult {
        let key = match cache_key(page.url(), options) {
            Ok(key) => key,
            Err(e) => return failure(page, &e),
        };

        if let Some(cached) = self.cache.get(&key) {
            debug!(url = %page.url(), "Extraction cache hit");
            self.last = Some(cached.clone());
            return cached.clone();
        }

        match self.run(page, options) {
            Ok(document) => {
                let result = ExtractionResult::succeeded(page.url(), page.title(), document);
                self.cache.insert(key, result.clone());
                self.last = Some(result.clone());
                result
            }
            Err(e) => failure(page, &e),
        }
    }

    /// Run the full extraction without touching the cache
    pub fn run(
        &self,
        page: &PageView,
        options: &ExtractOptions,
    ) -> Result<ExtractedDocument, ScanError> {
        let start = Instant::now();
        options.validate(self.config.max_length_ceiling)?;
        self.config.chunking.validate()?;

        let content = page.isolate();
        let raw_text = content.raw_text.trim().to_string();

        let required = self.config.min_length_for(page);
        let found = char_len(&raw_text);
        if found < required {
            return Err(ScanError::InsufficientContent { found, required });
        }
        debug!(root = %content.root, chars = found, "Main content isolated");

        let full_text = if options.clean_text {
            clean(&raw_text)
        } else {
            raw_text.clone()
        };

        let (cleaned_text, truncated) = match truncate_chars(&full_text, options.max_length) {
            Some(cut) => {
                warn!(
                    url = %page.url(),
                    max_length = options.max_length,
                    "Text truncated to {} characters",
                    options.max_length
                );
                (cut.to_string(), true)
            }
            None => (full_text.clone(), false),
        };

        let metadata = options.include_metadata.then(|| {
            let words = word_count(&cleaned_text);
            DocumentMetadata {
                word_count: words,
                char_count: char_len(&cleaned_text),
                reading_time_minutes: reading_time_minutes(words),
                language: detect_language(&cleaned_text),
                last_updated_text: last_updated(&cleaned_text),
            }
        });

        let (structure, sections) = if options.preserve_structure {
            let mut sections = build_sections(&content.blocks, options.clean_text);
            if truncated {
                sections = limit_sections(sections, &full_text, options.max_length);
            }
            (build_outline(&content.blocks), sections)
        } else {
            (StructuralOutline::default(), Vec::new())
        };

        let chunks = if options.chunk_text {
            chunk_document(
                &cleaned_text,
                &sections,
                structure.headings.len(),
                &self.config.chunking,
            )
        } else {
            Vec::new()
        };

        info!(
            url = %page.url(),
            words = metadata.as_ref().map(|m| m.word_count),
            chunks = chunks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Text extraction completed"
        );

        Ok(ExtractedDocument {
            raw_text,
            cleaned_text,
            truncated,
            structure,
            sections,
            chunks,
            metadata,
        })
    }

    /// Most recent successful extraction
    pub fn last_result(&self) -> Option<&ExtractionResult> {
        self.last.as_ref()
    }

    /// Drop every cached extraction and the last result
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.last = None;
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

fn failure(page: &PageView, err: &ScanError) -> ExtractionResult {
    error!(url = %page.url(), "Text extraction failed: {}", err);
    ExtractionResult::failed(page.url(), page.title(), err)
}

/// Cache key: the URL plus a hash of the effective options
fn cache_key(url: &str, options: &ExtractOptions) -> Result<String, ScanError> {
    let serialized = serde_json::to_string(options)?;
    Ok(format!("{url}#{}", content_hash(&serialized)))
}

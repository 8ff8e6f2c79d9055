//! Legal text extraction module
//!
//! This module turns a page that was classified as a legal document into:
//! - Cleaned full text
//! - A structural outline (headings, lists, tables)
//! - Sections derived from heading boundaries
//! - Bounded, overlapping chunks for downstream readers

pub mod chunk;
mod extractor;
pub mod outline;

pub use chunk::{chunk_document, chunk_by_sentences, chunk_by_structure, split_windows, Window};
pub use extractor::{Extractor, ExtractorConfig};

use crate::error::{Failure, ScanError};
use crate::page::SourcePosition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Compute a stable hash for content
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Per-call extraction options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub include_metadata: bool,
    pub clean_text: bool,
    pub chunk_text: bool,
    pub preserve_structure: bool,
    /// Hard cap on cleaned text length, in characters
    pub max_length: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_metadata: true,
            clean_text: true,
            chunk_text: true,
            preserve_structure: true,
            max_length: 100_000,
        }
    }
}

impl ExtractOptions {
    pub fn validate(&self, ceiling: usize) -> Result<(), ScanError> {
        if self.max_length == 0 || self.max_length > ceiling {
            return Err(ScanError::InvalidOptions(format!(
                "max_length must be within 1..={ceiling}, got {}",
                self.max_length
            )));
        }
        Ok(())
    }
}

/// Chunking parameters, all lengths in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    pub overlap_size: usize,
    /// Shorter sentence fragments are folded into a neighbour
    pub min_sentence_chars: usize,
    /// Structure-aware chunking needs more headings than this
    pub structure_heading_threshold: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            min_chunk_size: 200,
            max_chunk_size: 1000,
            overlap_size: 100,
            min_sentence_chars: 10,
            structure_heading_threshold: 3,
        }
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.max_chunk_size == 0 {
            return Err(ScanError::InvalidOptions(
                "max_chunk_size must be positive".to_string(),
            ));
        }
        if self.min_chunk_size > self.max_chunk_size {
            return Err(ScanError::InvalidOptions(format!(
                "min_chunk_size ({}) exceeds max_chunk_size ({})",
                self.min_chunk_size, self.max_chunk_size
            )));
        }
        if self.overlap_size >= self.max_chunk_size {
            return Err(ScanError::InvalidOptions(format!(
                "overlap_size ({}) must be smaller than max_chunk_size ({})",
                self.overlap_size, self.max_chunk_size
            )));
        }
        Ok(())
    }
}

/// A heading in the outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Sequential id (`heading_0`, `heading_1`, ...)
    pub id: String,
    pub level: u8,
    pub text: String,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub kind: ListKind,
    pub items: Vec<String>,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub header_cells: Vec<String>,
    pub row_count: usize,
    pub position: SourcePosition,
}

/// Skeleton of the document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralOutline {
    pub headings: Vec<Heading>,
    pub lists: Vec<List>,
    pub tables: Vec<Table>,
}

/// Content between one heading and the next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    /// 0 for the introduction before the first heading
    pub heading_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// A whole section
    Section,
    /// A piece of an oversized section
    SectionPart,
    /// Sentence-accumulated text
    Semantic,
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkKind::Section => write!(f, "section"),
            ChunkKind::SectionPart => write!(f, "section_part"),
            ChunkKind::Semantic => write!(f, "semantic"),
        }
    }
}

/// A bounded unit of extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    /// Position in the chunk sequence
    pub index: usize,
    pub kind: ChunkKind,
    pub title: Option<String>,
    pub text: String,
    /// Number of leading characters repeated from the previous chunk
    pub overlap: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_index: Option<usize>,
    /// 1-based part number for `SectionPart` chunks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<usize>,
}

impl Chunk {
    /// Text after the declared overlap
    pub fn fresh_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((byte_idx, _)) => self.text[byte_idx..].trim_start(),
            None if self.overlap == 0 => &self.text,
            None => "",
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Cheap statistics over the cleaned text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub word_count: usize,
    pub char_count: usize,
    pub reading_time_minutes: usize,
    pub language: String,
    pub last_updated_text: Option<String>,
}

/// Everything produced by a successful extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub raw_text: String,
    pub cleaned_text: String,
    /// The cleaned text was cut to `max_length`
    pub truncated: bool,
    pub structure: StructuralOutline,
    pub sections: Vec<Section>,
    pub chunks: Vec<Chunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
}

/// Outcome of one extraction call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub url: String,
    pub title: String,
    pub extracted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
    #[serde(flatten)]
    pub document: Option<ExtractedDocument>,
}

impl ExtractionResult {
    pub fn succeeded(url: &str, title: &str, document: ExtractedDocument) -> Self {
        Self {
            success: true,
            url: url.to_string(),
            title: title.to_string(),
            extracted_at: Utc::now(),
            error: None,
            document: Some(document),
        }
    }

    pub fn failed(url: &str, title: &str, error: &ScanError) -> Self {
        Self {
            success: false,
            url: url.to_string(),
            title: title.to_string(),
            extracted_at: Utc::now(),
            error: Some(Failure::from(error)),
            document: None,
        }
    }

    /// Chunks of a successful extraction, empty otherwise
    pub fn chunks(&self) -> &[Chunk] {
        self.document
            .as_ref()
            .map(|doc| doc.chunks.as_slice())
            .unwrap_or_default()
    }

    /// Index-addressable chunk access
    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks().get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn chunk(text: &str, overlap: usize) -> Chunk {
        Chunk {
            id: "chunk_0".to_string(),
            index: 0,
            kind: ChunkKind::Semantic,
            title: None,
            text: text.to_string(),
            overlap,
            section_index: None,
            part: None,
        }
    }

    #[test]
    fn test_content_hash_stable() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
        assert_eq!(content_hash("").len(), 64);
    }

    #[test]
    fn test_fresh_text() {
        assert_eq!(chunk("One two. Three four.", 0).fresh_text(), "One two. Three four.");
        assert_eq!(chunk("One two. Three four.", 8).fresh_text(), "Three four.");
        assert_eq!(chunk("short", 20).fresh_text(), "");
    }

    #[test]
    fn test_options_validate() {
        assert!(ExtractOptions::default().validate(1_000_000).is_ok());

        let zero = ExtractOptions {
            max_length: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(1_000_000), Err(ScanError::InvalidOptions(_))));

        let huge = ExtractOptions {
            max_length: 2_000_000,
            ..Default::default()
        };
        assert!(huge.validate(1_000_000).is_err());
    }

    #[test]
    fn test_chunk_config_validate() {
        assert!(ChunkConfig::default().validate().is_ok());

        let inverted = ChunkConfig {
            min_chunk_size: 2000,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let overlap = ChunkConfig {
            overlap_size: 1000,
            ..Default::default()
        };
        assert!(overlap.validate().is_err());
    }

    #[test]
    fn test_failed_result_serializes_error() {
        let err = ScanError::InsufficientContent {
            found: 150,
            required: 2000,
        };
        let result = ExtractionResult::failed("https://acme.com/terms", "Terms", &err);
        assert!(!result.success);
        assert!(result.chunks().is_empty());
        assert_eq!(result.error.as_ref().map(|f| f.kind), Some(FailureKind::InsufficientContent));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["kind"], "insufficient_content");
        assert!(json.get("chunks").is_none());
    }
}

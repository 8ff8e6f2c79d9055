//! lexscan - Legal document detection and text extraction
//!
//! This library decides whether a rendered page is a legal document (terms of
//! service, privacy policy, EULA, ...) and, if so, extracts its text into a
//! clean, structured and chunked representation for downstream readers.

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod page;
pub mod text;

/// Re-export commonly used types
pub use config::{Config, Profile};
pub use detect::{ClassificationResult, Detector, DetectorConfig, DocumentType};
pub use error::{Failure, FailureKind, ScanError};
pub use extract::{Chunk, ExtractOptions, ExtractionResult, Extractor, ExtractorConfig};
pub use page::{PageSignature, PageView};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "lexscan";

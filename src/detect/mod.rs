//! Legal document detection
//!
//! This module decides whether a page is a legal document by adding up
//! independent weighted signals:
//! - URL path patterns
//! - Title patterns
//! - Legal-register phrases in the body
//! - Document structure (headings, numbering, table of contents)

mod detector;
mod rules;

pub use detector::{Detector, DetectorConfig, VerdictRule};
pub use rules::{
    matched_phrases, ContentSignal, ExclusionFilter, PatternRule, Signal, SignalHit,
    SignalInput, SignalRule, SignalSet, StructureSignal, TitleSignal, UrlSignal, LEGAL_PHRASES,
};

use crate::page::PageSignature;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of legal document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    PrivacyPolicy,
    TermsOfService,
    CookiePolicy,
    Eula,
    UserAgreement,
    LegalNotice,
    /// Generic fallback
    LegalDocument,
}

impl DocumentType {
    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::PrivacyPolicy => "Privacy Policy",
            DocumentType::TermsOfService => "Terms of Service",
            DocumentType::CookiePolicy => "Cookie Policy",
            DocumentType::Eula => "End User License Agreement",
            DocumentType::UserAgreement => "User Agreement",
            DocumentType::LegalNotice => "Legal Notice",
            DocumentType::LegalDocument => "Legal Document",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            DocumentType::PrivacyPolicy => "privacy_policy",
            DocumentType::TermsOfService => "terms_of_service",
            DocumentType::CookiePolicy => "cookie_policy",
            DocumentType::Eula => "eula",
            DocumentType::UserAgreement => "user_agreement",
            DocumentType::LegalNotice => "legal_notice",
            DocumentType::LegalDocument => "legal_document",
        };
        write!(f, "{}", tag)
    }
}

/// Which signals fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicators {
    pub url_match: bool,
    pub title_match: bool,
    pub content_match: bool,
    pub structural_match: bool,
}

impl Indicators {
    /// Record that `signal` fired
    pub fn set(&mut self, signal: Signal) {
        match signal {
            Signal::Url => self.url_match = true,
            Signal::Title => self.title_match = true,
            Signal::Content => self.content_match = true,
            Signal::Structure => self.structural_match = true,
        }
    }
}

/// Facts gathered about the page while classifying it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionMetadata {
    pub word_count: usize,
    pub section_count: usize,
    pub has_table_of_contents: bool,
    pub last_updated_text: Option<String>,
    /// Distinct legal-register phrases found in the body
    pub legal_phrase_count: usize,
}

/// Verdict for one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_legal_document: bool,
    /// Additive score in [0, 1]
    pub confidence: f64,
    /// Set only for positive verdicts
    pub document_type: Option<DocumentType>,
    pub indicators: Indicators,
    pub metadata: DetectionMetadata,
    pub signature: PageSignature,
    /// The early-exit filter rejected the page before any content scan
    pub short_circuited: bool,
    pub analyzed_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl ClassificationResult {
    /// Zero-confidence negative verdict
    pub fn negative(signature: PageSignature) -> Self {
        Self {
            is_legal_document: false,
            confidence: 0.0,
            document_type: None,
            indicators: Indicators::default(),
            metadata: DetectionMetadata::default(),
            signature,
            short_circuited: false,
            analyzed_at: Utc::now(),
            error: None,
        }
    }

    /// Negative verdict produced by the early-exit filter
    pub fn short_circuited(signature: PageSignature) -> Self {
        Self {
            short_circuited: true,
            ..Self::negative(signature)
        }
    }

    /// Negative verdict carrying the reason analysis failed
    pub fn failed(signature: PageSignature, error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::negative(signature)
        }
    }
}

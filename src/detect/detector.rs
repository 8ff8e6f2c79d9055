//! Main detection engine
//!
//! Runs the early-exit filter, evaluates every signal, applies the verdict
//! rule and caches the result by page signature.

use super::{
    matched_phrases, ClassificationResult, DetectionMetadata, DocumentType, ExclusionFilter,
    Indicators, SignalInput, SignalSet,
};
use crate::error::ScanError;
use crate::page::{PageSignature, PageView};
use crate::text::{last_updated, sanitize, word_count};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, info};

/// How the final verdict is derived from confidence and indicators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum VerdictRule {
    /// Positive iff (confidence ≥ `url_threshold` and the URL matched) or
    /// (confidence ≥ `title_structure_threshold` and both title and structure matched)
    DualThreshold {
        url_threshold: f64,
        title_structure_threshold: f64,
    },
    /// Positive iff confidence ≥ `threshold`
    SingleThreshold { threshold: f64 },
}

impl VerdictRule {
    pub fn dual() -> Self {
        VerdictRule::DualThreshold {
            url_threshold: 0.6,
            title_structure_threshold: 0.5,
        }
    }

    pub fn single() -> Self {
        VerdictRule::SingleThreshold { threshold: 0.3 }
    }

    pub fn is_positive(&self, confidence: f64, indicators: &Indicators) -> bool {
        match *self {
            VerdictRule::DualThreshold {
                url_threshold,
                title_structure_threshold,
            } => {
                (confidence >= url_threshold && indicators.url_match)
                    || (confidence >= title_structure_threshold
                        && indicators.title_match
                        && indicators.structural_match)
            }
            VerdictRule::SingleThreshold { threshold } => confidence >= threshold,
        }
    }

    fn thresholds(&self) -> Vec<f64> {
        match *self {
            VerdictRule::DualThreshold {
                url_threshold,
                title_structure_threshold,
            } => vec![url_threshold, title_structure_threshold],
            VerdictRule::SingleThreshold { threshold } => vec![threshold],
        }
    }
}

impl Default for VerdictRule {
    fn default() -> Self {
        Self::dual()
    }
}

/// Configuration for detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub url_weight: f64,
    pub title_weight: f64,
    pub content_weight: f64,
    pub structure_weight: f64,
    /// Texts longer than this need `long_document_min_phrases`
    pub long_document_chars: usize,
    pub long_document_min_phrases: usize,
    pub short_document_min_phrases: usize,
    /// Shorter texts never fire the content signal
    pub min_content_chars: usize,
    pub min_structure_headings: usize,
    pub min_numbered_headings: usize,
    pub min_legal_section_headings: usize,
    /// Skip the scan for pages the exclusion filter rejects
    pub early_exit: bool,
    pub verdict: VerdictRule,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            url_weight: 0.4,
            title_weight: 0.3,
            content_weight: 0.2,
            structure_weight: 0.1,
            long_document_chars: 2000,
            long_document_min_phrases: 4,
            short_document_min_phrases: 2,
            min_content_chars: 100,
            min_structure_headings: 5,
            min_numbered_headings: 3,
            min_legal_section_headings: 2,
            early_exit: true,
            verdict: VerdictRule::default(),
        }
    }
}

impl DetectorConfig {
    /// Reject weights and thresholds outside [0, 1]
    pub fn validate(&self) -> Result<(), ScanError> {
        let weights = [
            ("url_weight", self.url_weight),
            ("title_weight", self.title_weight),
            ("content_weight", self.content_weight),
            ("structure_weight", self.structure_weight),
        ];
        for (name, weight) in weights {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ScanError::InvalidOptions(format!(
                    "{name} must be within [0, 1], got {weight}"
                )));
            }
        }

        if self
            .verdict
            .thresholds()
            .iter()
            .any(|t| !(0.0..=1.0).contains(t))
        {
            return Err(ScanError::InvalidOptions(
                "verdict thresholds must be within [0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}

/// Round to 6 decimals so boundary comparisons are exact
fn round_confidence(value: f64) -> f64 {
    (value.clamp(0.0, 1.0) * 1_000_000.0).round() / 1_000_000.0
}

/// Legal document detector with its own result cache
pub struct Detector {
    config: DetectorConfig,
    signals: SignalSet,
    exclusion: ExclusionFilter,
    cache: HashMap<PageSignature, ClassificationResult>,
    last: Option<ClassificationResult>,
}

impl Detector {
    /// Create a new detector with default configuration
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            signals: SignalSet::new(&config),
            exclusion: ExclusionFilter::new(),
            config,
            cache: HashMap::new(),
            last: None,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classify a page, serving repeated signatures from the cache
    ///
    /// Never fails: analysis errors become a negative result carrying the
    /// message, and are not cached.
    pub fn classify(&mut self, page: &PageView) -> ClassificationResult {
        let signature = page.signature();

        if let Some(cached) = self.cache.get(&signature) {
            debug!(domain = %signature.domain, title = %signature.title, "Classification cache hit");
            self.last = Some(cached.clone());
            return cached.clone();
        }

        match self.analyze(page) {
            Ok(result) => {
                self.cache.insert(signature, result.clone());
                self.last = Some(result.clone());
                result
            }
            Err(e) => {
                error!(url = %page.url(), "Classification failed: {}", e);
                ClassificationResult::failed(signature, &e.to_string())
            }
        }
    }

    /// Run the full analysis without touching the cache
    pub fn analyze(&self, page: &PageView) -> Result<ClassificationResult, ScanError> {
        let start = Instant::now();
        self.config.validate()?;

        let signature = page.signature();
        let url_path = page.url_path();

        // a legal URL is always scanned, whatever host serves it
        let legal_url = self.signals.url.matching_rule(&url_path).is_some();
        if self.config.early_exit && !legal_url {
            if let Some(reason) = self.exclusion.check(page.url(), page.title()) {
                debug!(url = %page.url(), reason, "Early exit");
                return Ok(ClassificationResult::short_circuited(signature));
            }
        }

        let content = page.isolate();
        let headings = page.headings();
        let input = SignalInput {
            url_path,
            title: page.title().to_string(),
            text: sanitize(&content.raw_text),
            has_table_of_contents: page.has_table_of_contents(),
            headings,
        };

        let mut indicators = Indicators::default();
        let mut score = 0.0;
        let mut hint: Option<DocumentType> = None;

        for hit in self.signals.evaluate(&input) {
            debug!(signal = ?hit.signal, rule = %hit.rule, weight = hit.weight, "Signal fired");
            indicators.set(hit.signal);
            score += hit.weight;
            if hint.is_none() {
                hint = hit.hint;
            }
        }

        let confidence = round_confidence(score);
        let is_legal_document = self.config.verdict.is_positive(confidence, &indicators);
        let document_type =
            is_legal_document.then(|| hint.unwrap_or(DocumentType::LegalDocument));

        let metadata = DetectionMetadata {
            word_count: word_count(&input.text),
            section_count: input.headings.len(),
            has_table_of_contents: input.has_table_of_contents,
            last_updated_text: last_updated(&input.text),
            legal_phrase_count: matched_phrases(&input.text).len(),
        };

        info!(
            url = %page.url(),
            confidence,
            is_legal_document,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Page classified"
        );

        Ok(ClassificationResult {
            is_legal_document,
            confidence,
            document_type,
            indicators,
            metadata,
            signature,
            short_circuited: false,
            analyzed_at: Utc::now(),
            error: None,
        })
    }

    /// Verdict for the page, reusing the last result when it describes the same page
    pub fn is_current_page_legal(&mut self, page: &PageView) -> bool {
        let signature = page.signature();
        match &self.last {
            Some(last) if last.signature == signature => last.is_legal_document,
            _ => self.classify(page).is_legal_document,
        }
    }

    /// Most recent successful classification
    pub fn last_result(&self) -> Option<&ClassificationResult> {
        self.last.as_ref()
    }

    /// Drop every cached verdict and the last result
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.last = None;
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

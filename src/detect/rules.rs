//! Detection signals and their rule tables
//!
//! URL and title signals: ordered `(pattern, weight, type hint)` tables, first match wins
//! Content signal: distinct legal-register phrases against a length-dependent threshold
//! Structure signal: heading count plus numbering, legal section names or a TOC

use super::{DetectorConfig, DocumentType};
use crate::page::HeadingBlock;
use crate::text::char_len;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Legal-register vocabulary scanned in the page body
pub const LEGAL_PHRASES: &[&str] = &[
    "by using this service",
    "by accessing this website",
    "these terms of service",
    "this privacy policy",
    "personal information",
    "data collection",
    "we collect",
    "your rights",
    "binding agreement",
    "legal obligations",
    "intellectual property",
    "limitation of liability",
    "governing law",
    "dispute resolution",
    "data processing",
    "collect information",
    "third parties",
];

/// Heading names typical of legal documents
const LEGAL_SECTION_PATTERNS: &[&str] = &[
    r"acceptance\s+of\s+(?:the\s+)?terms",
    r"use\s+of\s+(?:the\s+)?service",
    r"user\s+conduct",
    r"intellectual\s+property",
    r"privacy\s+and\s+data",
    r"termination",
    r"disclaimer",
    r"limitation\s+of\s+liability",
    r"governing\s+law",
    r"dispute\s+resolution",
    r"indemnif",
    r"changes\s+to\s+(?:these|this|our)\s+(?:terms|policy)",
];

/// Characters that may follow a URL token
const URL_TOKEN_END: &str = r"(?:$|[/?#._-])";

/// One independent check contributing to the confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Url,
    Title,
    Content,
    Structure,
}

/// What a signal rule reports when it fires
#[derive(Debug, Clone, PartialEq)]
pub struct SignalHit {
    pub signal: Signal,
    pub weight: f64,
    pub hint: Option<DocumentType>,
    /// Name of the rule that matched
    pub rule: String,
}

/// Everything a signal may look at
#[derive(Debug, Clone, Default)]
pub struct SignalInput {
    /// Lower-cased URL path
    pub url_path: String,
    pub title: String,
    /// Sanitised main text of the page
    pub text: String,
    pub headings: Vec<HeadingBlock>,
    pub has_table_of_contents: bool,
}

/// Trait for detection signals
pub trait SignalRule: Send + Sync {
    /// Rule name
    fn name(&self) -> &str;

    /// Which signal this rule implements
    fn signal(&self) -> Signal;

    /// Evaluate the rule against a page
    fn evaluate(&self, input: &SignalInput) -> Option<SignalHit>;
}

/// Table entry: a pattern, the weight it contributes and the type it suggests
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub weight: f64,
    pub hint: DocumentType,
}

impl PatternRule {
    fn new(name: &'static str, pattern: &str, weight: f64, hint: DocumentType) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            weight,
            hint,
        }
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.pattern.is_match(haystack)
    }

    fn hit(&self, signal: Signal) -> SignalHit {
        SignalHit {
            signal,
            weight: self.weight,
            hint: Some(self.hint),
            rule: self.name.to_string(),
        }
    }
}

fn url_rule(name: &'static str, token: &str, weight: f64, hint: DocumentType) -> PatternRule {
    PatternRule::new(name, &format!("/(?:{token}){URL_TOKEN_END}"), weight, hint)
}

fn title_rule(name: &'static str, phrase: &str, weight: f64, hint: DocumentType) -> PatternRule {
    PatternRule::new(name, &format!(r"(?i)^\s*(?:{phrase})\b"), weight, hint)
}

// ==================== URL ====================

/// URL path patterns, ordered by type specificity
pub struct UrlSignal {
    rules: Vec<PatternRule>,
}

impl UrlSignal {
    pub fn new(weight: f64) -> Self {
        use DocumentType::*;
        Self {
            rules: vec![
                url_rule(
                    "privacy",
                    r"privacy(?:[-_]?(?:policy|notice|statement|center))?",
                    weight,
                    PrivacyPolicy,
                ),
                url_rule(
                    "terms",
                    r"terms(?:[-_]?(?:of[-_]?)?(?:service|use)|[-_]?(?:and|&)[-_]?conditions)?",
                    weight,
                    TermsOfService,
                ),
                url_rule("tos", r"tos", weight, TermsOfService),
                url_rule(
                    "conditions_of_use",
                    r"conditions[-_]?of[-_]?use",
                    weight,
                    TermsOfService,
                ),
                url_rule("cookie", r"cookie[-_]?policy|cookies", weight, CookiePolicy),
                url_rule(
                    "eula",
                    r"eula|end[-_]?user[-_]?licen[cs]e(?:[-_]?agreement)?",
                    weight,
                    Eula,
                ),
                url_rule(
                    "legal_notice",
                    r"legal(?:[-_]?notice)?|imprint|impressum",
                    weight,
                    LegalNotice,
                ),
                url_rule("user_agreement", r"user[-_]?agreement", weight, LegalDocument),
                url_rule(
                    "acceptable_use",
                    r"acceptable[-_]?use(?:[-_]?policy)?",
                    weight,
                    LegalDocument,
                ),
            ],
        }
    }

    /// First rule matching the path, in specificity order
    pub fn matching_rule(&self, url_path: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.matches(url_path))
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }
}

impl SignalRule for UrlSignal {
    fn name(&self) -> &str {
        "url_pattern"
    }

    fn signal(&self) -> Signal {
        Signal::Url
    }

    fn evaluate(&self, input: &SignalInput) -> Option<SignalHit> {
        self.matching_rule(&input.url_path)
            .map(|rule| rule.hit(Signal::Url))
    }
}

// ==================== Title ====================

/// Title phrases anchored at the start of the title
pub struct TitleSignal {
    rules: Vec<PatternRule>,
}

impl TitleSignal {
    pub fn new(weight: f64) -> Self {
        use DocumentType::*;
        Self {
            rules: vec![
                title_rule(
                    "privacy_policy",
                    r"privacy\s+(?:policy|notice|statement)",
                    weight,
                    PrivacyPolicy,
                ),
                title_rule(
                    "terms_of_service",
                    r"terms\s+(?:of\s+)?(?:service|use)|terms\s+(?:and|&)\s+conditions",
                    weight,
                    TermsOfService,
                ),
                title_rule(
                    "cookie_policy",
                    r"cookie\s+(?:policy|notice)",
                    weight,
                    CookiePolicy,
                ),
                title_rule("user_agreement", r"user\s+agreement", weight, UserAgreement),
                title_rule(
                    "eula",
                    r"end[\s-]+user\s+licen[cs]e|eula",
                    weight,
                    Eula,
                ),
                title_rule(
                    "legal_notice",
                    r"legal\s+(?:notice|disclaimer)",
                    weight,
                    LegalNotice,
                ),
                title_rule(
                    "acceptable_use",
                    r"acceptable\s+use\s+policy",
                    weight,
                    LegalDocument,
                ),
            ],
        }
    }

    pub fn matching_rule(&self, title: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.matches(title))
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }
}

impl SignalRule for TitleSignal {
    fn name(&self) -> &str {
        "title_pattern"
    }

    fn signal(&self) -> Signal {
        Signal::Title
    }

    fn evaluate(&self, input: &SignalInput) -> Option<SignalHit> {
        self.matching_rule(&input.title)
            .map(|rule| rule.hit(Signal::Title))
    }
}

// ==================== Content ====================

/// Distinct legal-register phrases found in `text`
pub fn matched_phrases(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    LEGAL_PHRASES
        .iter()
        .copied()
        .filter(|phrase| lower.contains(phrase))
        .collect()
}

/// Fires when enough distinct legal phrases appear for the document's length
pub struct ContentSignal {
    weight: f64,
    long_document_chars: usize,
    long_document_min_phrases: usize,
    short_document_min_phrases: usize,
    min_content_chars: usize,
}

impl ContentSignal {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            weight: config.content_weight,
            long_document_chars: config.long_document_chars,
            long_document_min_phrases: config.long_document_min_phrases,
            short_document_min_phrases: config.short_document_min_phrases,
            min_content_chars: config.min_content_chars,
        }
    }

    /// Phrases required for a text of `len` characters, `None` if too short to judge
    pub fn required_phrases(&self, len: usize) -> Option<usize> {
        if len > self.long_document_chars {
            Some(self.long_document_min_phrases)
        } else if len >= self.min_content_chars {
            Some(self.short_document_min_phrases)
        } else {
            None
        }
    }
}

impl SignalRule for ContentSignal {
    fn name(&self) -> &str {
        "content_indicators"
    }

    fn signal(&self) -> Signal {
        Signal::Content
    }

    fn evaluate(&self, input: &SignalInput) -> Option<SignalHit> {
        let required = self.required_phrases(char_len(&input.text))?;
        let found = matched_phrases(&input.text).len();

        (found >= required).then(|| SignalHit {
            signal: Signal::Content,
            weight: self.weight,
            hint: None,
            rule: format!("{found} legal phrases"),
        })
    }
}

// ==================== Structure ====================

/// Fires for long, sectioned documents that look like contracts or policies
pub struct StructureSignal {
    weight: f64,
    min_headings: usize,
    min_numbered: usize,
    min_legal_sections: usize,
    numbered: Regex,
    legal_sections: Vec<Regex>,
}

impl StructureSignal {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            weight: config.structure_weight,
            min_headings: config.min_structure_headings,
            min_numbered: config.min_numbered_headings,
            min_legal_sections: config.min_legal_section_headings,
            numbered: Regex::new(r"^\s*(?:(?i:section|article)\s+)?\d+(?:\.\d+)*[.)]").unwrap(),
            legal_sections: LEGAL_SECTION_PATTERNS
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
                .collect(),
        }
    }

    pub fn numbered_headings(&self, headings: &[HeadingBlock]) -> usize {
        headings
            .iter()
            .filter(|h| self.numbered.is_match(&h.text))
            .count()
    }

    pub fn legal_section_headings(&self, headings: &[HeadingBlock]) -> usize {
        headings
            .iter()
            .filter(|h| self.legal_sections.iter().any(|p| p.is_match(&h.text)))
            .count()
    }
}

impl SignalRule for StructureSignal {
    fn name(&self) -> &str {
        "legal_structure"
    }

    fn signal(&self) -> Signal {
        Signal::Structure
    }

    fn evaluate(&self, input: &SignalInput) -> Option<SignalHit> {
        if input.headings.len() < self.min_headings {
            return None;
        }

        let numbered = self.numbered_headings(&input.headings);
        let legal = self.legal_section_headings(&input.headings);

        let fires = numbered >= self.min_numbered
            || legal >= self.min_legal_sections
            || input.has_table_of_contents;

        fires.then(|| SignalHit {
            signal: Signal::Structure,
            weight: self.weight,
            hint: None,
            rule: format!("{} headings ({numbered} numbered, {legal} legal)", input.headings.len()),
        })
    }
}

// ==================== Signal set ====================

/// The four signals, evaluated in order
pub struct SignalSet {
    pub url: UrlSignal,
    pub title: TitleSignal,
    pub content: ContentSignal,
    pub structure: StructureSignal,
}

impl SignalSet {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            url: UrlSignal::new(config.url_weight),
            title: TitleSignal::new(config.title_weight),
            content: ContentSignal::new(config),
            structure: StructureSignal::new(config),
        }
    }

    pub fn rules(&self) -> [&dyn SignalRule; 4] {
        [&self.url, &self.title, &self.content, &self.structure]
    }

    /// Evaluate every signal; none suppresses another
    pub fn evaluate(&self, input: &SignalInput) -> Vec<SignalHit> {
        self.rules()
            .into_iter()
            .filter_map(|rule| rule.evaluate(input))
            .collect()
    }
}

// ==================== Early exit ====================

/// Cheap URL/title filter for pages that are a priori not legal documents
pub struct ExclusionFilter {
    host: Regex,
    path: Regex,
    query: Regex,
    title: Regex,
}

impl ExclusionFilter {
    pub fn new() -> Self {
        Self {
            host: Regex::new(
                r"(?:^|\.)(?:google\.[a-z.]+|bing\.com|duckduckgo\.com|search\.yahoo\.com|yandex\.[a-z]+|baidu\.com|facebook\.com|twitter\.com|x\.com|instagram\.com|tiktok\.com|linkedin\.com|pinterest\.com|youtube\.com|reddit\.com|amazon\.[a-z.]+|ebay\.[a-z.]+|etsy\.com|aliexpress\.com|medium\.com|substack\.com)$",
            )
            .unwrap(),
            path: Regex::new(
                r"(?:^|/)(?:search|results|blog|blogs|news|shop|store|cart|checkout|products?)(?:/|$)",
            )
            .unwrap(),
            query: Regex::new(r"(?:^|&)(?:q|query|search)=").unwrap(),
            title: Regex::new(r"(?i)(?:search results|\bshopping cart\b|[-|] youtube$)").unwrap(),
        }
    }

    /// Reason the page is excluded, if it is
    pub fn check(&self, url: &str, title: &str) -> Option<&'static str> {
        if let Ok(parsed) = Url::parse(url) {
            let host = parsed.host_str().unwrap_or("").to_lowercase();
            if self.host.is_match(&host) {
                return Some("excluded domain");
            }
            if self.path.is_match(&parsed.path().to_lowercase()) {
                return Some("excluded path");
            }
            if parsed.query().is_some_and(|q| self.query.is_match(q)) {
                return Some("search query");
            }
        }

        if self.title.is_match(title) {
            return Some("excluded title");
        }

        None
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::SourcePosition;

    fn urls() -> UrlSignal {
        UrlSignal::new(0.4)
    }

    fn titles() -> TitleSignal {
        TitleSignal::new(0.3)
    }

    fn heading(text: &str) -> HeadingBlock {
        HeadingBlock {
            level: 2,
            text: text.to_string(),
            position: SourcePosition {
                element_index: 0,
                text_offset: 0,
            },
        }
    }

    #[test]
    fn test_url_rule_privacy() {
        let rule = urls().matching_rule("/privacy-policy").map(|r| r.name);
        assert_eq!(rule, Some("privacy"));
        assert!(urls().matching_rule("/legal/privacy").is_some());
    }

    #[test]
    fn test_url_rule_specificity_order() {
        let signal = urls();
        let hint = |path: &str| signal.matching_rule(path).map(|r| r.hint);

        assert_eq!(hint("/legal/privacy-policy"), Some(DocumentType::PrivacyPolicy));
        assert_eq!(hint("/legal/terms-of-service"), Some(DocumentType::TermsOfService));
        assert_eq!(hint("/tos"), Some(DocumentType::TermsOfService));
        assert_eq!(hint("/cookie-policy"), Some(DocumentType::CookiePolicy));
        assert_eq!(hint("/eula.html"), Some(DocumentType::Eula));
        assert_eq!(hint("/legal"), Some(DocumentType::LegalNotice));
        assert_eq!(hint("/user-agreement"), Some(DocumentType::LegalDocument));
    }

    #[test]
    fn test_url_rule_requires_path_boundary() {
        let signal = urls();
        assert!(signal.matching_rule("/stories/tostada-recipes").is_none());
        assert!(signal.matching_rule("/legalzoom-review").is_none());
        assert!(signal.matching_rule("/blog/termsheet-basics").is_none());
        assert!(signal.matching_rule("/photos").is_none());
    }

    #[test]
    fn test_title_rules_anchor_at_start() {
        let signal = titles();
        let hint = |title: &str| signal.matching_rule(title).map(|r| r.hint);

        assert_eq!(hint("Privacy Policy - Acme"), Some(DocumentType::PrivacyPolicy));
        assert_eq!(hint("terms of use"), Some(DocumentType::TermsOfService));
        assert_eq!(hint("Terms and Conditions"), Some(DocumentType::TermsOfService));
        assert_eq!(hint("User Agreement"), Some(DocumentType::UserAgreement));
        assert_eq!(hint("End-User License Agreement"), Some(DocumentType::Eula));
        assert_eq!(hint("Legal Notice"), Some(DocumentType::LegalNotice));
        assert_eq!(hint("Why we rewrote our privacy policy"), None);
    }

    #[test]
    fn test_content_signal_short_document() {
        let signal = ContentSignal::new(&DetectorConfig::default());
        let input = SignalInput {
            text: "By using this service you agree that we collect personal information \
                   about you and share it with partners."
                .to_string(),
            ..Default::default()
        };
        let hit = signal.evaluate(&input).expect("should fire");
        assert_eq!(hit.signal, Signal::Content);
        assert!((hit.weight - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_content_signal_long_document_is_stricter() {
        let signal = ContentSignal::new(&DetectorConfig::default());
        let mut text = "Personal information and third parties are discussed. ".to_string();
        text.push_str(&"Ordinary filler text about the weather. ".repeat(60));

        let input = SignalInput {
            text,
            ..Default::default()
        };
        assert!(signal.evaluate(&input).is_none());
    }

    #[test]
    fn test_content_signal_needs_minimum_text() {
        let signal = ContentSignal::new(&DetectorConfig::default());
        let input = SignalInput {
            text: "we collect your rights".to_string(),
            ..Default::default()
        };
        assert!(signal.evaluate(&input).is_none());
    }

    #[test]
    fn test_structure_signal() {
        let signal = StructureSignal::new(&DetectorConfig::default());

        let legal = SignalInput {
            headings: ["Overview", "Accounts", "Termination", "Governing Law", "Contact"]
                .iter()
                .map(|t| heading(t))
                .collect(),
            ..Default::default()
        };
        assert!(signal.evaluate(&legal).is_some());

        let numbered = SignalInput {
            headings: ["1. One", "2. Two", "3. Three", "Four", "Five"]
                .iter()
                .map(|t| heading(t))
                .collect(),
            ..Default::default()
        };
        assert_eq!(signal.numbered_headings(&numbered.headings), 3);
        assert!(signal.evaluate(&numbered).is_some());

        let too_few = SignalInput {
            headings: ["Termination", "Governing Law"]
                .iter()
                .map(|t| heading(t))
                .collect(),
            has_table_of_contents: true,
            ..Default::default()
        };
        assert!(signal.evaluate(&too_few).is_none());
    }

    #[test]
    fn test_exclusion_filter() {
        let filter = ExclusionFilter::new();
        assert_eq!(
            filter.check("https://example.com/blog/my-post", "10 Tips for Productivity"),
            Some("excluded path")
        );
        assert_eq!(
            filter.check("https://www.google.com/search?q=terms", "terms - Google Search"),
            Some("excluded domain")
        );
        assert_eq!(
            filter.check("https://shop.example/?q=shoes", "Shoes"),
            Some("search query")
        );
        assert_eq!(filter.check("https://acme.com/terms", "Terms of Service"), None);
        assert_eq!(filter.check("https://max.com/terms", "Terms"), None);
    }
}

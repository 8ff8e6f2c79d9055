//! Page snapshots
//!
//! A `PageView` is an owned, read-only snapshot of a rendered page: its URL,
//! its title and the parsed document. The detector and the extractor only ever
//! read from it; content isolation works on a detached copy.

mod dom;

pub use dom::{ContentSnapshot, MATERIAL_CONTENT_CHARS};

use crate::text::sanitize;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;
use url::Url;

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static TOC_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[class*="toc"], [id*="toc"], [class*="table-of-contents"], [id*="table-of-contents"], [class*="contents"]"#,
    )
    .unwrap()
});

/// Identity of a page for caching purposes
///
/// Two signatures are equal iff their domain and title match; the URL is
/// carried along for reporting only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSignature {
    pub url: String,
    pub title: String,
    pub domain: String,
}

impl PartialEq for PageSignature {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.title == other.title
    }
}

impl Eq for PageSignature {}

impl Hash for PageSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.title.hash(state);
    }
}

/// Where an element sits in the source document
///
/// Best-effort only; used for downstream highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Index of the element in document order
    pub element_index: usize,
    /// Character offset of the element's text in the raw text
    pub text_offset: usize,
}

/// A heading found while walking the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingBlock {
    pub level: u8,
    pub text: String,
    pub position: SourcePosition,
}

/// A list found while walking the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBlock {
    pub ordered: bool,
    pub items: Vec<String>,
    pub position: SourcePosition,
}

/// A table found while walking the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    pub header_cells: Vec<String>,
    pub row_count: usize,
    pub position: SourcePosition,
}

/// One unit of the document-order block stream
///
/// List and table blocks mark where the structure starts; their text also
/// appears as following `Text` blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Heading(HeadingBlock),
    Text(String),
    List(ListBlock),
    Table(TableBlock),
}

/// Read-only snapshot of a rendered page
#[derive(Debug, Clone)]
pub struct PageView {
    url: String,
    title: String,
    document: Html,
}

impl PageView {
    /// Parse an HTML snapshot of the page at `url`
    pub fn parse(url: &str, html: &str) -> Self {
        let document = Html::parse_document(html);
        let title = document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| sanitize(&t.text().collect::<String>()))
            .unwrap_or_default();

        Self {
            url: url.to_string(),
            title,
            document,
        }
    }

    /// Override the title read from `<title>`
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = sanitize(title);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Host part of the URL, empty if the URL does not parse
    pub fn domain(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn signature(&self) -> PageSignature {
        PageSignature {
            url: self.url.clone(),
            title: self.title.clone(),
            domain: self.domain(),
        }
    }

    /// Lower-cased URL path, or the whole lower-cased URL if it does not parse
    pub fn url_path(&self) -> String {
        match Url::parse(&self.url) {
            Ok(u) => u.path().to_lowercase(),
            Err(_) => self.url.to_lowercase(),
        }
    }

    /// Whether the page is served from a local or test location
    pub fn is_local(&self) -> bool {
        is_local_url(&self.url)
    }

    /// Walk the whole body (scripts and styles skipped)
    pub fn snapshot(&self) -> ContentSnapshot {
        dom::snapshot(&self.document)
    }

    /// Isolate the main content on a detached copy of the document
    pub fn isolate(&self) -> ContentSnapshot {
        dom::isolate(&self.document)
    }

    /// All headings of the document in order
    pub fn headings(&self) -> Vec<HeadingBlock> {
        self.snapshot().headings().cloned().collect()
    }

    pub fn has_table_of_contents(&self) -> bool {
        self.document.select(&TOC_SELECTOR).next().is_some()
    }
}

/// Local, file and test-fixture URLs get relaxed length thresholds
pub fn is_local_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        let lower = raw.to_lowercase();
        return lower.contains("localhost") || lower.contains("test");
    };

    if url.scheme() == "file" {
        return true;
    }

    let local_host = url.host_str().is_some_and(|host| {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        host == "localhost"
            || host == "127.0.0.1"
            || host == "::1"
            || host.ends_with(".localhost")
            || host.ends_with(".test")
            || host.ends_with(".local")
            || is_test_subdomain(host)
    });

    local_host
        || url
            .path_segments()
            .is_some_and(|mut segments| segments.any(|s| s.to_ascii_lowercase().starts_with("test")))
}

/// A subdomain label such as `test`, `testing` or `staging-test`
///
/// The registrable domain itself is not considered, so `testify.com` stays remote.
fn is_test_subdomain(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 3 || host.parse::<std::net::IpAddr>().is_ok() {
        return false;
    }

    labels[..labels.len() - 2].iter().any(|label| {
        label
            .to_ascii_lowercase()
            .split(['-', '_'])
            .any(|part| part.starts_with("test"))
    })
}

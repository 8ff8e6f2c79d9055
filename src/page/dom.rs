//! Document walking and main-content isolation

use super::{Block, HeadingBlock, ListBlock, SourcePosition, TableBlock};
use crate::text::sanitize;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// A main-content candidate must carry more text than this to be chosen
pub const MATERIAL_CONTENT_CHARS: usize = 500;

/// Elements that never carry readable content
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

/// Elements removed before isolating the main content
const NOISE_TAGS: &str = "script, style, noscript, template, iframe, nav, header, footer, aside";

/// class/id tokens naming a non-content container, matched exactly or as a `-`/`_` prefix
const NOISE_TOKEN_PREFIXES: &[&str] = &["ad", "ads", "nav", "menu"];

/// class/id fragments naming a non-content container, matched anywhere
const NOISE_TOKEN_FRAGMENTS: &[&str] = &[
    "navigation",
    "navbar",
    "sidebar",
    "advert",
    "cookie-banner",
    "cookie-consent",
    "cookie-notice",
    "cookiebanner",
    "popup",
    "modal",
];

/// Containers never removed by the class/id heuristics
const PROTECTED_TAGS: &[&str] = &["html", "body", "main", "article"];

/// Main-content candidates, probed in order
const MAIN_CANDIDATES: &[&str] = &[
    "main",
    r#"[role="main"]"#,
    ".main-content",
    ".content",
    ".post-content",
    "#content",
    "#main",
    "article",
    ".legal-content",
    ".terms-content",
    ".policy-content",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "form",
    "li", "main", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead",
    "tr", "ul",
];

static NOISE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse(NOISE_TAGS).unwrap());
static MAIN_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    MAIN_CANDIDATES
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static LI_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static TH_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());

/// Text and block stream of one content root
#[derive(Debug, Clone, Default)]
pub struct ContentSnapshot {
    /// Text of the root with a line break after every block element
    pub raw_text: String,
    /// Document-order blocks
    pub blocks: Vec<Block>,
    /// Which candidate was chosen as the content root
    pub root: String,
}

impl ContentSnapshot {
    pub fn headings(&self) -> impl Iterator<Item = &HeadingBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading(h) => Some(h),
            _ => None,
        })
    }

    pub fn lists(&self) -> impl Iterator<Item = &ListBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::List(l) => Some(l),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Raw text length in characters, ignoring surrounding whitespace
    pub fn text_chars(&self) -> usize {
        self.raw_text.trim().chars().count()
    }
}

/// Walk the body of the document as-is
pub fn snapshot(document: &Html) -> ContentSnapshot {
    let root = body_or_root(document);
    walk(root, "body")
}

/// Strip non-content elements from a copy of `document` and walk the main content
pub fn isolate(document: &Html) -> ContentSnapshot {
    let mut copy = document.clone();

    let doomed: Vec<_> = copy
        .select(&NOISE_SELECTOR)
        .chain(
            copy.root_element()
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|el| is_noise_container(el)),
        )
        .map(|el| el.id())
        .collect();

    for id in doomed {
        if let Some(mut node) = copy.tree.get_mut(id) {
            node.detach();
        }
    }

    for (candidate, selector) in MAIN_CANDIDATES.iter().zip(MAIN_SELECTORS.iter()) {
        if let Some(el) = copy.select(selector).next() {
            if element_text_chars(&el) > MATERIAL_CONTENT_CHARS {
                return walk(el, candidate);
            }
        }
    }

    walk(body_or_root(&copy), "body")
}

fn body_or_root(document: &Html) -> ElementRef<'_> {
    document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element())
}

fn element_text_chars(el: &ElementRef<'_>) -> usize {
    el.text().map(|t| t.chars().count()).sum()
}

fn is_noise_container(el: &ElementRef<'_>) -> bool {
    let element = el.value();
    if PROTECTED_TAGS.contains(&element.name()) {
        return false;
    }

    let class_tokens = element.classes();
    let id_token = element.id();

    class_tokens.chain(id_token).any(|token| {
        let token = token.to_ascii_lowercase();
        NOISE_TOKEN_PREFIXES.iter().any(|prefix| {
            token == *prefix
                || token.starts_with(&format!("{prefix}-"))
                || token.starts_with(&format!("{prefix}_"))
        }) || NOISE_TOKEN_FRAGMENTS.iter().any(|frag| token.contains(frag))
    })
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn walk(root: ElementRef<'_>, root_name: &str) -> ContentSnapshot {
    let mut walker = Walker::default();
    walker.run(root);
    walker.flush();

    ContentSnapshot {
        raw_text: walker.raw,
        blocks: walker.blocks,
        root: root_name.to_string(),
    }
}

/// Pending work of the document walk, kept on an explicit stack so nesting depth
/// never grows the call stack
enum Step<'a> {
    Open(ElementRef<'a>),
    Text(&'a str),
    Close(&'a str),
}

#[derive(Default)]
struct Walker {
    raw: String,
    raw_chars: usize,
    blocks: Vec<Block>,
    pending: String,
    element_index: usize,
}

impl Walker {
    fn run(&mut self, root: ElementRef<'_>) {
        let mut stack = vec![Step::Open(root)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Open(el) => self.open(el, &mut stack),
                Step::Text(text) => self.text(text),
                Step::Close(name) => {
                    if BLOCK_TAGS.contains(&name) {
                        self.line_break();
                    }
                }
            }
        }
    }

    fn open<'a>(&mut self, el: ElementRef<'a>, stack: &mut Vec<Step<'a>>) {
        let name = el.value().name();
        let position = self.position();
        self.element_index += 1;

        if SKIPPED_TAGS.contains(&name) {
            return;
        }

        if let Some(level) = heading_level(name) {
            self.line_break();
            let text = sanitize(&el.text().collect::<String>());
            if !text.is_empty() {
                self.push_raw(&text);
                self.line_break();
                self.blocks.push(Block::Heading(HeadingBlock {
                    level,
                    text,
                    position,
                }));
            }
            return;
        }

        match name {
            "br" => {
                self.line_break();
                return;
            }
            "ul" | "ol" => {
                self.line_break();
                let items = el
                    .select(&LI_SELECTOR)
                    .map(|li| sanitize(&li.text().collect::<String>()))
                    .filter(|item| !item.is_empty())
                    .collect();
                self.blocks.push(Block::List(ListBlock {
                    ordered: name == "ol",
                    items,
                    position,
                }));
            }
            "table" => {
                self.line_break();
                let header_cells = el
                    .select(&TH_SELECTOR)
                    .map(|th| sanitize(&th.text().collect::<String>()))
                    .collect();
                let row_count = el.select(&TR_SELECTOR).count();
                self.blocks.push(Block::Table(TableBlock {
                    header_cells,
                    row_count,
                    position,
                }));
            }
            _ => {}
        }

        // children are popped in document order, then the close marker
        stack.push(Step::Close(name));
        let children: Vec<_> = el.children().collect();
        for child in children.into_iter().rev() {
            if let Some(child_el) = ElementRef::wrap(child) {
                stack.push(Step::Open(child_el));
            } else if let Some(text) = child.value().as_text() {
                stack.push(Step::Text(text));
            }
        }
    }

    fn text(&mut self, text: &str) {
        if text.trim().is_empty() {
            // formatting whitespace between tags
            if !self.raw.is_empty() && !self.raw.ends_with(char::is_whitespace) {
                self.push_raw(" ");
                self.pending.push(' ');
            }
        } else {
            self.push_raw(text);
            self.pending.push_str(text);
        }
    }

    fn position(&self) -> SourcePosition {
        SourcePosition {
            element_index: self.element_index,
            text_offset: self.raw_chars,
        }
    }

    fn push_raw(&mut self, text: &str) {
        self.raw.push_str(text);
        self.raw_chars += text.chars().count();
    }

    fn line_break(&mut self) {
        self.flush();
        if !self.raw.is_empty() && !self.raw.ends_with('\n') {
            self.push_raw("\n");
        }
    }

    /// Emit accumulated inline text as one `Text` block
    fn flush(&mut self) {
        let text = sanitize(&self.pending);
        self.pending.clear();
        if !text.is_empty() {
            self.blocks.push(Block::Text(text));
        }
    }
}

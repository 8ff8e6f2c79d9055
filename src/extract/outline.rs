//! Outline and section derivation
//!
//! Both read the document-order block stream in one linear pass; a section
//! owns every text block between its heading and the next one.

use super::{Heading, List, ListKind, Section, StructuralOutline, Table};
use crate::page::Block;
use crate::text::{char_len, clean, truncate_chars};

/// Title of the section holding text that precedes the first heading
pub const INTRODUCTION_TITLE: &str = "Introduction";

/// Title of the single section of a document without headings
pub const MAIN_CONTENT_TITLE: &str = "Main Content";

/// Collect headings, lists and tables with sequential ids
pub fn build_outline(blocks: &[Block]) -> StructuralOutline {
    let mut outline = StructuralOutline::default();

    for block in blocks {
        match block {
            Block::Heading(h) => outline.headings.push(Heading {
                id: format!("heading_{}", outline.headings.len()),
                level: h.level,
                text: h.text.clone(),
                position: h.position,
            }),
            Block::List(l) => outline.lists.push(List {
                id: format!("list_{}", outline.lists.len()),
                kind: if l.ordered {
                    ListKind::Ordered
                } else {
                    ListKind::Unordered
                },
                items: l.items.clone(),
                position: l.position,
            }),
            Block::Table(t) => outline.tables.push(Table {
                id: format!("table_{}", outline.tables.len()),
                header_cells: t.header_cells.clone(),
                row_count: t.row_count,
                position: t.position,
            }),
            Block::Text(_) => {}
        }
    }

    outline
}

struct Draft {
    title: String,
    level: u8,
    parts: Vec<String>,
}

impl Draft {
    fn new(title: &str, level: u8) -> Self {
        Self {
            title: title.to_string(),
            level,
            parts: Vec::new(),
        }
    }

    fn content(&self, clean_text: bool) -> String {
        let joined = self.parts.join("\n");
        if clean_text {
            clean(&joined)
        } else {
            joined
        }
    }
}

/// Pair each heading with the text up to the next heading
pub fn build_sections(blocks: &[Block], clean_text: bool) -> Vec<Section> {
    let has_headings = blocks.iter().any(|b| matches!(b, Block::Heading(_)));
    let mut drafts = Vec::new();
    let mut current = if has_headings {
        Draft::new(INTRODUCTION_TITLE, 0)
    } else {
        Draft::new(MAIN_CONTENT_TITLE, 1)
    };

    for block in blocks {
        match block {
            Block::Heading(h) => {
                let next = Draft::new(&h.text, h.level);
                let done = std::mem::replace(&mut current, next);
                // the introduction only exists when something precedes the first heading
                if done.level > 0 || !done.parts.is_empty() {
                    drafts.push(done);
                }
            }
            Block::Text(text) => current.parts.push(text.clone()),
            Block::List(_) | Block::Table(_) => {}
        }
    }
    if current.level > 0 || !current.parts.is_empty() {
        drafts.push(current);
    }

    drafts
        .into_iter()
        .map(|draft| Section {
            content: draft.content(clean_text),
            title: draft.title,
            heading_level: draft.level,
        })
        .collect()
}

/// Drop section text that lies past the first `kept` characters of `full`
///
/// Sections are located in `full` one after another. The section straddling
/// the cut keeps its surviving prefix and later sections are dropped, so
/// every remaining section body is a slice of the truncated text. A section
/// that cannot be found verbatim is limited by the characters left instead.
pub fn limit_sections(sections: Vec<Section>, full: &str, kept: usize) -> Vec<Section> {
    let cut = full
        .char_indices()
        .nth(kept)
        .map_or(full.len(), |(byte_idx, _)| byte_idx);
    let mut cursor = 0;
    let mut spent = 0;
    let mut limited = Vec::with_capacity(sections.len());

    for mut section in sections {
        if cursor >= cut || spent >= kept {
            break;
        }
        if section.content.is_empty() {
            limited.push(section);
            continue;
        }

        match full[cursor..].find(&section.content) {
            Some(offset) => {
                let start = cursor + offset;
                let end = start + section.content.len();
                if start >= cut {
                    break;
                }
                if end > cut {
                    section.content = full[start..cut].trim_end().to_string();
                    if !section.content.is_empty() {
                        limited.push(section);
                    }
                    break;
                }
                spent += char_len(&full[cursor..end]);
                cursor = end;
                limited.push(section);
            }
            None => {
                let remaining = kept - spent;
                if let Some(prefix) = truncate_chars(&section.content, remaining) {
                    section.content = prefix.trim_end().to_string();
                    limited.push(section);
                    break;
                }
                spent += char_len(&section.content) + 1;
                limited.push(section);
            }
        }
    }

    limited
}

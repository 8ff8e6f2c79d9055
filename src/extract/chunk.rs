//! Chunking
//!
//! Two strategies:
//! - structure-aware: one chunk per section, oversized sections split into windows
//! - sentence-based: greedy sentence accumulation with a trailing sentence overlap
//!
//! Every chunk declares how many leading characters it repeats from its
//! predecessor, so joining the fresh parts gives back the source text.

use super::{Chunk, ChunkConfig, ChunkKind, Section};
use crate::text::{char_len, split_sentences};

/// Chunk the cleaned text, preferring section boundaries when the outline is rich enough
pub fn chunk_document(
    text: &str,
    sections: &[Section],
    heading_count: usize,
    config: &ChunkConfig,
) -> Vec<Chunk> {
    if heading_count > config.structure_heading_threshold {
        let chunks = chunk_by_structure(sections, config);
        if !chunks.is_empty() {
            return chunks;
        }
    }
    chunk_by_sentences(text, config)
}

/// One chunk per section; sections over `max_chunk_size` become `SectionPart` windows
pub fn chunk_by_structure(sections: &[Section], config: &ChunkConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    for (section_index, section) in sections.iter().enumerate() {
        if section.content.is_empty() {
            continue;
        }

        if char_len(&section.content) <= config.max_chunk_size {
            chunks.push(Chunk {
                id: format!("chunk_section_{section_index}"),
                index: chunks.len(),
                kind: ChunkKind::Section,
                title: Some(section.title.clone()),
                text: section.content.clone(),
                overlap: 0,
                section_index: Some(section_index),
                part: None,
            });
            continue;
        }

        let windows = split_windows(&section.content, config.max_chunk_size, config.overlap_size);
        for (part, window) in windows.into_iter().enumerate() {
            chunks.push(Chunk {
                id: format!("chunk_section_{section_index}_{part}"),
                index: chunks.len(),
                kind: ChunkKind::SectionPart,
                title: Some(format!("{} (Part {})", section.title, part + 1)),
                text: window.text.to_string(),
                overlap: window.overlap,
                section_index: Some(section_index),
                part: Some(part + 1),
            });
        }
    }

    chunks
}

/// Running buffer of sentences; the first `overlap` of them repeat the previous chunk
struct SentenceBuffer<'a> {
    sentences: Vec<&'a str>,
    overlap: usize,
    len: usize,
}

impl<'a> SentenceBuffer<'a> {
    fn new() -> Self {
        Self {
            sentences: Vec::new(),
            overlap: 0,
            len: 0,
        }
    }

    fn seeded(tail: Vec<&'a str>) -> Self {
        let mut buffer = Self::new();
        for sentence in tail {
            buffer.push(sentence);
        }
        buffer.overlap = buffer.sentences.len();
        buffer
    }

    fn len_with(&self, sentence: &str) -> usize {
        if self.sentences.is_empty() {
            char_len(sentence)
        } else {
            self.len + 1 + char_len(sentence)
        }
    }

    fn push(&mut self, sentence: &'a str) {
        self.len = self.len_with(sentence);
        self.sentences.push(sentence);
    }

    fn has_fresh(&self) -> bool {
        self.sentences.len() > self.overlap
    }

    /// Characters taken by the overlap sentences and their separator
    fn overlap_chars(&self) -> usize {
        if self.overlap == 0 {
            return 0;
        }
        let overlap: usize = self.sentences[..self.overlap]
            .iter()
            .map(|s| char_len(s))
            .sum();
        overlap + self.overlap
    }

    /// Longest run of trailing sentences fitting in `budget` characters
    fn tail(&self, budget: usize) -> Vec<&'a str> {
        let mut taken = Vec::new();
        let mut used = 0;
        for sentence in self.sentences.iter().rev() {
            let needed = if taken.is_empty() {
                char_len(sentence)
            } else {
                used + 1 + char_len(sentence)
            };
            if needed > budget {
                break;
            }
            used = needed;
            taken.push(*sentence);
        }
        taken.reverse();
        taken
    }
}

/// Greedy sentence accumulation
///
/// A chunk closes when the next sentence would push it past `max_chunk_size`
/// and it already holds `min_chunk_size` characters; the next chunk starts
/// with the closed chunk's trailing sentences that fit in `overlap_size`.
/// A sentence is never split, so one longer than `max_chunk_size` yields an
/// oversized chunk.
pub fn chunk_by_sentences(text: &str, config: &ChunkConfig) -> Vec<Chunk> {
    let sentences = split_sentences(text, config.min_sentence_chars);
    let mut chunks = Vec::new();
    let mut buffer = SentenceBuffer::new();

    for sentence in sentences {
        if buffer.sentences.is_empty() || buffer.len_with(sentence) <= config.max_chunk_size {
            buffer.push(sentence);
            continue;
        }

        if buffer.len < config.min_chunk_size {
            // too small to close, grow past the limit instead
            buffer.push(sentence);
            continue;
        }

        let tail = buffer.tail(config.overlap_size);
        chunks.push(semantic_chunk(&buffer, chunks.len()));

        let mut next = SentenceBuffer::seeded(tail);
        if next.len_with(sentence) > config.max_chunk_size {
            next = SentenceBuffer::new();
        }
        next.push(sentence);
        buffer = next;
    }

    if buffer.has_fresh() {
        chunks.push(semantic_chunk(&buffer, chunks.len()));
    }

    chunks
}

fn semantic_chunk(buffer: &SentenceBuffer<'_>, index: usize) -> Chunk {
    Chunk {
        id: format!("chunk_{index}"),
        index,
        kind: ChunkKind::Semantic,
        title: None,
        text: buffer.sentences.join(" "),
        overlap: buffer.overlap_chars(),
        section_index: None,
        part: None,
    }
}

/// A slice of text produced by `split_windows`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window<'a> {
    pub text: &'a str,
    /// Leading characters shared with the previous window
    pub overlap: usize,
}

/// Split `text` into windows of at most `max_chars` characters
///
/// A window ends at the last sentence end past its midpoint, else at the last
/// whitespace past its midpoint, else it is cut hard. The next window starts
/// `overlap` characters before the cut, moved forward to a word start.
pub fn split_windows(text: &str, max_chars: usize, overlap: usize) -> Vec<Window<'_>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let total = chars.len();
    let byte_at = |i: usize| if i >= total { text.len() } else { chars[i].0 };
    let is_space = |i: usize| chars[i].1.is_whitespace();

    if total <= max_chars {
        return vec![Window { text, overlap: 0 }];
    }

    let mut windows = Vec::new();
    let mut start = 0;
    let mut prev_end: usize = 0;

    while start < total {
        let shared = prev_end.saturating_sub(start);

        if total - start <= max_chars {
            windows.push(Window {
                text: &text[byte_at(start)..],
                overlap: shared,
            });
            break;
        }

        let hard_end = start + max_chars;
        let half = start + max_chars / 2;
        let sentence_end = (half + 1..=hard_end)
            .rev()
            .find(|&i| is_space(i) && matches!(chars[i - 1].1, '.' | '!' | '?'));
        let space = (half + 1..=hard_end).rev().find(|&i| is_space(i));
        let end = sentence_end.or(space).unwrap_or(hard_end);

        windows.push(Window {
            text: &text[byte_at(start)..byte_at(end)],
            overlap: shared,
        });

        let mut next = end.saturating_sub(overlap).max(start + 1);
        while next < end && !(is_space(next - 1) && !is_space(next)) {
            next += 1;
        }
        while next < total && is_space(next) {
            next += 1;
        }

        prev_end = end;
        start = next;
    }

    windows
}

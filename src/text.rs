//! Text normalisation helpers
//!
//! Shared by the detector and the extractor:
//! - sanitising short fragments (headings, list items, cells)
//! - cleaning whole documents before chunking
//! - sentence splitting
//! - cheap document metadata (words, reading time, language, last update)

use regex::Regex;
use std::sync::LazyLock;

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&[a-zA-Z0-9#]+;").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F]").unwrap());
static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[•·▪◦‣●○■□►*\-]+|\(?[a-zA-Z]\)|\((?:[ivxIVX]{1,4})\))\s+").unwrap()
});
static STRAY_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s[•·▪◦‣●○■□►]+\s").unwrap());
static SENTENCE_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([.!?])([A-Z])").unwrap());
static CAMEL_JOIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());

static LAST_UPDATED_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)last\s+updated:?\s*([^.\n]+)",
        r"(?i)effective\s+date:?\s*([^.\n]+)",
        r"(?i)revised:?\s*([^.\n]+)",
        r"(?i)updated\s+on:?\s*([^.\n]+)",
        r"(?i)last\s+modified:?\s*([^.\n]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static DATE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}|\d{1,2}(?:st|nd|rd|th)?\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?,?\s+\d{4}|\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{2,4})",
    )
    .unwrap()
});

const COMMON_ENGLISH_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Words per minute used for the reading time estimate
pub const WORDS_PER_MINUTE: usize = 200;

const MAX_LAST_UPDATED_CHARS: usize = 60;

/// Sanitise a short fragment: drop entities and control characters, collapse whitespace
pub fn sanitize(text: &str) -> String {
    let text = ENTITY_RE.replace_all(text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    CONTROL_RE.replace_all(&text, "").trim().to_string()
}

/// Clean a whole document for chunking
///
/// Lines are stripped of leading list markers and joined into a single
/// space-separated paragraph. Missing spaces after sentence ends and inside
/// camelCase joins (left behind by tag stripping) are restored.
pub fn clean(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let joined = raw
        .lines()
        .map(|line| LIST_MARKER_RE.replace(line.trim(), "").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let text = WHITESPACE_RE.replace_all(&joined, " ");
    let text = STRAY_BULLET_RE.replace_all(&text, " ");
    let text = SENTENCE_GAP_RE.replace_all(&text, "${1} ${2}");
    let text = CAMEL_JOIN_RE.replace_all(&text, "${1} ${2}");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Length in characters
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Cut `text` to at most `max_chars` characters, or `None` if it already fits
pub fn truncate_chars(text: &str, max_chars: usize) -> Option<&str> {
    text.char_indices()
        .nth(max_chars)
        .map(|(byte_idx, _)| &text[..byte_idx])
}

/// Split text into sentences
///
/// A boundary is a run of `.`, `!` or `?` (plus closing quotes/brackets)
/// followed by whitespace or the end of the text. Fragments shorter than
/// `min_chars` are folded into the following sentence (or the previous one at
/// the end of the text), so joining the result with single spaces reproduces
/// single-spaced input exactly.
pub fn split_sentences(text: &str, min_chars: usize) -> Vec<&str> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }

        let mut end = idx + c.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if is_terminator(next) || is_closer(next) {
                end = next_idx + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            spans.push((start, end));
            start = end;
        }
    }
    if start < text.len() {
        spans.push((start, text.len()));
    }

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    let mut pending: Option<usize> = None;
    for (span_start, span_end) in spans {
        let span_start = pending.take().unwrap_or(span_start);
        if char_len(text[span_start..span_end].trim()) < min_chars {
            pending = Some(span_start);
        } else {
            merged.push((span_start, span_end));
        }
    }
    if let Some(fragment_start) = pending {
        match merged.last_mut() {
            Some(last) => last.1 = text.len(),
            None => merged.push((fragment_start, text.len())),
        }
    }

    merged
        .into_iter()
        .map(|(s, e)| text[s..e].trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '”' | '’')
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Reading time in minutes, rounded up
pub fn reading_time_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE)
}

/// Guess the document language: `en` when common English words exceed 2%
pub fn detect_language(text: &str) -> String {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if words.is_empty() {
        return "unknown".to_string();
    }

    let english = words
        .iter()
        .filter(|w| COMMON_ENGLISH_WORDS.contains(&w.as_str()))
        .count();

    if english as f64 / words.len() as f64 > 0.02 {
        "en".to_string()
    } else {
        "unknown".to_string()
    }
}

/// Find a "last updated" style marker and return the text that follows it
pub fn last_updated(text: &str) -> Option<String> {
    for pattern in LAST_UPDATED_RES.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let tail = caps[1].trim();
        if tail.is_empty() {
            continue;
        }

        if let Some(date) = DATE_PREFIX_RE.find(tail) {
            return Some(date.as_str().to_string());
        }

        let value = match truncate_chars(tail, MAX_LAST_UPDATED_CHARS) {
            Some(cut) => cut.rsplit_once(' ').map_or(cut, |(head, _)| head),
            None => tail,
        };
        return Some(value.trim().to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  Terms&nbsp;of \n\t Service "), "Terms of Service");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_clean_joins_lines_and_strips_markers() {
        let raw = "Privacy Policy\n\n• We collect data.\n•   We share it.\n a) Never sold.";
        assert_eq!(
            clean(raw),
            "Privacy Policy We collect data. We share it. Never sold."
        );
    }

    #[test]
    fn test_clean_restores_missing_spaces() {
        assert_eq!(clean("End of one.Start of two"), "End of one. Start of two");
        assert_eq!(clean("IntroductionThe service"), "Introduction The service");
    }

    #[test]
    fn test_clean_keeps_clause_numbers() {
        assert_eq!(clean("1. Acceptance of Terms"), "1. Acceptance of Terms");
    }

    #[test]
    fn test_split_sentences_keeps_terminators() {
        let text = "We collect your data. We never sell it! Do you agree? Yes.";
        let sentences = split_sentences(text, 10);
        assert_eq!(
            sentences,
            vec!["We collect your data.", "We never sell it!", "Do you agree? Yes."]
        );
        assert_eq!(sentences.join(" "), text);
    }

    #[test]
    fn test_split_sentences_ignores_inner_dots() {
        let text = "Version 2.5 applies to e.g.users worldwide. Nothing else changes here.";
        let sentences = split_sentences(text, 10);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "Version 2.5 applies to e.g.users worldwide.");
    }

    #[test]
    fn test_split_sentences_folds_leading_fragment() {
        let text = "Hi. This sentence is long enough to stand.";
        let sentences = split_sentences(text, 10);
        assert_eq!(sentences, vec![text]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo world", 5), Some("héllo"));
        assert_eq!(truncate_chars("short", 10), None);
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes(0), 0);
        assert_eq!(reading_time_minutes(1), 1);
        assert_eq!(reading_time_minutes(401), 3);
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("the terms of the service and the policy"), "en");
        assert_eq!(detect_language("datenschutz erklärung gilt"), "unknown");
        assert_eq!(detect_language(""), "unknown");
    }

    #[test]
    fn test_last_updated_prefers_date() {
        let text = "Last updated: March 3, 2024 Welcome to Acme and our services";
        assert_eq!(last_updated(text).as_deref(), Some("March 3, 2024"));

        let text = "Effective date: 2023-11-01. These terms apply.";
        assert_eq!(last_updated(text).as_deref(), Some("2023-11-01"));
    }

    #[test]
    fn test_last_updated_missing() {
        assert_eq!(last_updated("No dates anywhere in here"), None);
    }
}

// Text Processing Service
// Rule-based word tokenization and sentence splitting

use regex::{Matches, Regex};
use std::sync::OnceLock;

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z]+(?:'[A-Za-z]+)?").expect("word regex"))
}

fn sentence_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence break regex"))
}

/// Lowercase word tokens: letter runs with at most one internal apostrophe
/// join ("don't"). Digits and punctuation are dropped.
pub fn tokenize_words(text: &str) -> Vec<String> {
    word_re()
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

/// Number of word tokens without allocating them.
pub fn count_words(text: &str) -> usize {
    word_re().find_iter(text).count()
}

/// Lazy sentence iterator over a borrowed text.
///
/// Breaks right after `.`, `!` or `?` when whitespace follows; pieces are
/// trimmed and empty ones skipped. Abbreviations, decimals and quotes are
/// not special-cased.
pub struct Sentences<'a> {
    text: &'a str,
    breaks: Matches<'static, 'a>,
    cursor: usize,
    done: bool,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let piece = match self.breaks.next() {
                Some(m) => {
                    // Terminator is ASCII, so +1 stays on a char boundary.
                    let piece = &self.text[self.cursor..m.start() + 1];
                    self.cursor = m.end();
                    piece
                }
                None => {
                    self.done = true;
                    &self.text[self.cursor..]
                }
            };
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
        None
    }
}

pub fn sentences(text: &str) -> Sentences<'_> {
    Sentences {
        text,
        breaks: sentence_break_re().find_iter(text),
        cursor: 0,
        done: false,
    }
}

/// Simple sentence splitting
pub fn split_sentences(text: &str) -> Vec<String> {
    sentences(text).map(str::to_string).collect()
}

/// First `max_chars` characters of `text`, and whether anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Words and sentences of one text, computed once per analysis.
#[derive(Debug, Clone, Default)]
pub struct SegmentedText {
    pub words: Vec<String>,
    pub sentences: Vec<String>,
}

impl SegmentedText {
    pub fn new(text: &str) -> Self {
        Self {
            words: tokenize_words(text),
            sentences: split_sentences(text),
        }
    }

    /// Word-token count of each sentence, in order.
    pub fn sentence_lengths(&self) -> Vec<usize> {
        self.sentences.iter().map(|s| count_words(s)).collect()
    }
}

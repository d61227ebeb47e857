// Feature Extraction
// Text-only document signals: lexical diversity, repetition, burstiness

use std::collections::{HashMap, HashSet};

use crate::models::{RawSignals, SentenceStats};
use crate::services::text_processor::SegmentedText;

/// Below this many tokens lexical diversity reports the 0.0 sentinel.
pub const MIN_WORDS_LEXICAL: usize = 20;
/// Below this many tokens repetition reports the 0.0 sentinel.
pub const MIN_WORDS_REPETITION: usize = 30;
/// How many of the most frequent words count toward repetition.
pub const REPETITION_TOP_K: usize = 10;

pub fn lexical_diversity(text: &str) -> f64 {
    lexical_diversity_of(&SegmentedText::new(text).words)
}

pub fn repetition_score(text: &str) -> f64 {
    repetition_of(&SegmentedText::new(text).words)
}

pub fn sentence_stats(text: &str) -> SentenceStats {
    sentence_stats_of(&SegmentedText::new(text))
}

/// Sentence-length variation relative to the mean (std / mean).
pub fn burstiness_score(text: &str) -> f64 {
    burstiness_of(&sentence_stats(text))
}

/// Unique / total tokens, or 0.0 when there are fewer than 20 tokens.
pub fn lexical_diversity_of(words: &[String]) -> f64 {
    if words.len() < MIN_WORDS_LEXICAL {
        return 0.0;
    }
    let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
    unique.len() as f64 / words.len() as f64
}

/// Share of tokens taken by the ten most frequent words, or 0.0 when there
/// are fewer than 30 tokens.
pub fn repetition_of(words: &[String]) -> f64 {
    if words.len() < MIN_WORDS_REPETITION {
        return 0.0;
    }
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for w in words {
        *freq.entry(w.as_str()).or_insert(0) += 1;
    }
    let mut counts: Vec<usize> = freq.into_values().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));
    let top: usize = counts.iter().take(REPETITION_TOP_K).sum();
    top as f64 / words.len() as f64
}

pub fn sentence_stats_of(segmented: &SegmentedText) -> SentenceStats {
    let lengths = segmented.sentence_lengths();
    if lengths.is_empty() {
        return SentenceStats::default();
    }
    let n = lengths.len() as f64;
    let mean = lengths.iter().sum::<usize>() as f64 / n;
    let variance = lengths
        .iter()
        .map(|&l| (l as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    SentenceStats {
        sentences: lengths.len(),
        avg_len: mean,
        std_len: variance.sqrt(),
    }
}

pub fn burstiness_of(stats: &SentenceStats) -> f64 {
    if stats.avg_len <= 0.0 {
        return 0.0;
    }
    stats.std_len / stats.avg_len
}

/// Assemble the raw signal record from a segmented text and its perplexity.
pub fn extract_raw_signals(segmented: &SegmentedText, perplexity: f64) -> RawSignals {
    let sentence_stats = sentence_stats_of(segmented);
    RawSignals {
        perplexity,
        lexical_diversity: lexical_diversity_of(&segmented.words),
        repetition: repetition_of(&segmented.words),
        burstiness: burstiness_of(&sentence_stats),
        sentence_stats,
    }
}

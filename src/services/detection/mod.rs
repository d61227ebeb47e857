// Detection Module
// AI text detection core logic organized into specialized submodules:
// - features: text-only signals (lexical diversity, repetition, burstiness)
// - normalization: linear-clamp curves onto [0,1] AI-likeness
// - scoring: weighted fusion, percentage, label and confidence band
// - explainer: threshold reasons from raw signals
// - sentence_flagger: per-sentence perplexity flags
// - engine: orchestrates one document analysis

pub mod features;
pub mod normalization;
pub mod scoring;
pub mod explainer;
pub mod sentence_flagger;
pub mod engine;

// Re-export commonly used functions
pub use features::{
    burstiness_score,
    extract_raw_signals,
    lexical_diversity,
    repetition_score,
    sentence_stats,
};
pub use normalization::{
    normalize_burstiness,
    normalize_lexical,
    normalize_perplexity,
    normalize_repetition,
};
pub use scoring::{build_verdict, classify_percent, combine_score, to_percent};
pub use explainer::explain;
pub use sentence_flagger::{candidate_sentences, flag_sentences};
pub use engine::{Analyzer, Document, EMPTY_INPUT_MESSAGE};

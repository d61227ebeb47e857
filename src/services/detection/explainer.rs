// Explainer
// Threshold checks on raw signals producing human-readable reasons

use crate::models::RawSignals;

pub const PPL_LOW: f64 = 45.0;
pub const PPL_HIGH: f64 = 90.0;
pub const LEXICAL_LOW: f64 = 0.35;
pub const LEXICAL_HIGH: f64 = 0.55;
pub const REPETITION_HIGH: f64 = 0.18;
pub const REPETITION_LOW: f64 = 0.12;
pub const BURSTINESS_LOW: f64 = 0.12;
pub const BURSTINESS_HIGH: f64 = 0.22;
/// Fewer sentences than this adds the short-input caveat.
pub const MIN_RELIABLE_SENTENCES: usize = 3;

pub const REASON_LOW_PERPLEXITY: &str =
    "Low perplexity: text is highly predictable (often seen in LLM outputs).";
pub const REASON_HIGH_PERPLEXITY: &str =
    "High perplexity: text is less predictable, often closer to human writing.";
pub const REASON_LOW_LEXICAL: &str = "Low lexical diversity: limited vocabulary variety.";
pub const REASON_HIGH_LEXICAL: &str = "High lexical diversity: broader vocabulary usage.";
pub const REASON_HIGH_REPETITION: &str =
    "High repetition score: frequent reuse of common words/phrases.";
pub const REASON_LOW_REPETITION: &str = "Low repetition score: less repetitive word usage.";
pub const REASON_LOW_BURSTINESS: &str =
    "Low burstiness: sentence lengths are very uniform (common in generated text).";
pub const REASON_HIGH_BURSTINESS: &str =
    "High burstiness: sentence length varies more (common in human writing).";
pub const REASON_SHORT_INPUT: &str =
    "Very short input: detection confidence can be unreliable on short text.";
pub const REASON_MIXED: &str =
    "Signals are mixed; model relies on combined statistical indicators.";

/// Reasons justifying a verdict, in check order. Never empty.
///
/// The low-side lexical and repetition checks skip an exact 0.0, which is
/// the short-text sentinel rather than a measurement.
pub fn explain(signals: &RawSignals) -> Vec<String> {
    let mut reasons: Vec<&'static str> = Vec::new();

    let ppl = signals.perplexity;
    if ppl < PPL_LOW {
        reasons.push(REASON_LOW_PERPLEXITY);
    } else if ppl > PPL_HIGH {
        reasons.push(REASON_HIGH_PERPLEXITY);
    }

    let lex = signals.lexical_diversity;
    if lex > 0.0 && lex < LEXICAL_LOW {
        reasons.push(REASON_LOW_LEXICAL);
    } else if lex >= LEXICAL_HIGH {
        reasons.push(REASON_HIGH_LEXICAL);
    }

    let rep = signals.repetition;
    if rep > REPETITION_HIGH {
        reasons.push(REASON_HIGH_REPETITION);
    } else if rep > 0.0 && rep < REPETITION_LOW {
        reasons.push(REASON_LOW_REPETITION);
    }

    let burst = signals.burstiness;
    if burst < BURSTINESS_LOW {
        reasons.push(REASON_LOW_BURSTINESS);
    } else if burst > BURSTINESS_HIGH {
        reasons.push(REASON_HIGH_BURSTINESS);
    }

    if signals.sentence_stats.sentences < MIN_RELIABLE_SENTENCES {
        reasons.push(REASON_SHORT_INPUT);
    }

    if reasons.is_empty() {
        reasons.push(REASON_MIXED);
    }

    reasons.into_iter().map(str::to_string).collect()
}

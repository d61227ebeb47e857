// Fusion & Classification
// Weighted fusion of normalized signals into a percentage, label and confidence band

use crate::models::{Classification, Confidence, NormalizedSignals, Verdict};

use super::normalization::clamp01;

/// Fusion weights; perplexity dominates. Sum is 1.0.
pub const WEIGHT_PERPLEXITY: f64 = 0.45;
pub const WEIGHT_LEXICAL: f64 = 0.20;
pub const WEIGHT_REPETITION: f64 = 0.20;
pub const WEIGHT_BURSTINESS: f64 = 0.15;

/// At or above: "AI Generated", high confidence.
pub const AI_PERCENT_MIN: u8 = 75;
/// At or above (and below `AI_PERCENT_MIN`): "Mixed / Possibly AI".
pub const MIXED_PERCENT_MIN: u8 = 55;
/// Human-side confidence drops to medium at or above this.
pub const HUMAN_MEDIUM_MIN: u8 = 35;

/// Weighted AI-likeness in [0,1].
pub fn combine_score(signals: &NormalizedSignals) -> f64 {
    clamp01(
        WEIGHT_PERPLEXITY * signals.perplexity
            + WEIGHT_LEXICAL * signals.lexical_diversity
            + WEIGHT_REPETITION * signals.repetition
            + WEIGHT_BURSTINESS * signals.burstiness,
    )
}

/// Ties round to even, so 0.625 gives 62.
pub fn to_percent(score01: f64) -> u8 {
    (clamp01(score01) * 100.0).round_ties_even() as u8
}

/// Label and confidence band for an AI percentage. Confidence is highest at
/// both extremes.
pub fn classify_percent(ai_percent: u8) -> (Classification, Confidence) {
    if ai_percent >= AI_PERCENT_MIN {
        (Classification::AiGenerated, Confidence::High)
    } else if ai_percent >= MIXED_PERCENT_MIN {
        (Classification::Mixed, Confidence::Medium)
    } else if ai_percent >= HUMAN_MEDIUM_MIN {
        (Classification::HumanWritten, Confidence::Medium)
    } else {
        (Classification::HumanWritten, Confidence::High)
    }
}

/// Build the verdict for a percentage and its explanation.
pub fn build_verdict(ai_percent: u8, reasons: Vec<String>) -> Verdict {
    let ai_percentage = ai_percent.min(100);
    let (classification, confidence) = classify_percent(ai_percentage);
    Verdict {
        ai_percentage,
        human_percentage: 100u8.saturating_sub(ai_percentage),
        classification,
        confidence,
        reasons,
    }
}

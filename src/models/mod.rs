// authorship-lens Data Models
// Signal records and the analysis result shape consumed by front ends

use serde::{Deserialize, Serialize};

// ============ Raw Signals ============

/// Sentence-length statistics, measured in word tokens per sentence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SentenceStats {
    pub sentences: usize,
    pub avg_len: f64,
    /// Population standard deviation.
    pub std_len: f64,
}

/// Unnormalized document signals.
///
/// `lexical_diversity` and `repetition` are exactly `0.0` when the text is
/// too short to measure them; that zero means "insufficient evidence" and is
/// excluded from the explainer's low-side checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RawSignals {
    pub perplexity: f64,
    pub lexical_diversity: f64,
    pub repetition: f64,
    pub burstiness: f64,
    pub sentence_stats: SentenceStats,
}

/// Per-signal AI-likeness in [0,1]; higher means more AI-like.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NormalizedSignals {
    pub perplexity: f64,
    pub lexical_diversity: f64,
    pub repetition: f64,
    pub burstiness: f64,
}

// ============ Verdict ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "AI Generated")]
    AiGenerated,
    #[serde(rename = "Mixed / Possibly AI")]
    Mixed,
    #[serde(rename = "Human Written")]
    HumanWritten,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AiGenerated => "AI Generated",
            Self::Mixed => "Mixed / Possibly AI",
            Self::HumanWritten => "Human Written",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub ai_percentage: u8,
    pub human_percentage: u8,
    pub classification: Classification,
    pub confidence: Confidence,
    pub reasons: Vec<String>,
}

// ============ Sentence Flags ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceVerdict {
    pub text: String,
    /// Rounded to 2 decimal places.
    pub perplexity: f64,
    pub ai_like: bool,
}

// ============ Analysis Result ============

/// Display metrics: raw signals rounded for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub perplexity: f64,
    pub lexical_diversity: f64,
    pub repetition_score: f64,
    pub burstiness: f64,
    pub sentences: usize,
    pub avg_sentence_length: f64,
    pub std_sentence_length: f64,
}

impl Metrics {
    pub fn from_signals(signals: &RawSignals) -> Self {
        Self {
            perplexity: round_to(signals.perplexity, 2),
            lexical_diversity: round_to(signals.lexical_diversity, 4),
            repetition_score: round_to(signals.repetition, 4),
            burstiness: round_to(signals.burstiness, 2),
            sentences: signals.sentence_stats.sentences,
            avg_sentence_length: round_to(signals.sentence_stats.avg_len, 2),
            std_sentence_length: round_to(signals.sentence_stats.std_len, 2),
        }
    }
}

/// Body of a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub truncated: bool,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub metrics: Metrics,
    pub sentences: Vec<SentenceVerdict>,
}

/// Result record for one analysis request.
///
/// Serializes flat: `{ok, error?, truncated, ai_percentage, human_percentage,
/// classification, confidence, metrics, reasons, sentences}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub report: Option<AnalysisReport>,
}

impl AnalysisResult {
    pub fn success(report: AnalysisReport) -> Self {
        Self {
            ok: true,
            error: None,
            report: Some(report),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            report: None,
        }
    }
}

/// Round to `places` decimal places.
///
/// Rounds the exact binary value through its decimal rendering, so 2.675
/// (stored just below) gives 2.67 rather than 2.68.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

// Analysis Engine
// Runs one document through features, fusion, explanation and sentence flagging

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::{AnalysisReport, AnalysisResult, Metrics, NormalizedSignals};
use crate::services::config_store::{AppConfig, DEFAULT_MAX_CHARS};
use crate::services::oracle::{validate_perplexity, OracleError, PerplexityOracle, DEFAULT_MAX_TOKENS};
use crate::services::text_processor::{truncate_chars, SegmentedText};

use super::explainer::explain;
use super::features::extract_raw_signals;
use super::scoring::{build_verdict, combine_score, to_percent};
use super::sentence_flagger::flag_sentences;

pub const EMPTY_INPUT_MESSAGE: &str = "Empty text provided.";

/// The text one analysis works on.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    pub raw: &'a str,
    /// First `max_chars` characters of `raw`.
    pub text: &'a str,
    pub truncated: bool,
}

impl<'a> Document<'a> {
    pub fn prepare(raw: &'a str, max_chars: usize) -> Self {
        let (text, truncated) = truncate_chars(raw, max_chars);
        Self { raw, text, truncated }
    }
}

/// Document analyzer bound to one oracle.
///
/// Holds no per-request state; one analyzer can serve any number of calls.
pub struct Analyzer<'o, O: PerplexityOracle> {
    oracle: &'o O,
    max_chars: usize,
    max_tokens: usize,
}

impl<'o, O: PerplexityOracle> Analyzer<'o, O> {
    pub fn new(oracle: &'o O) -> Self {
        Self {
            oracle,
            max_chars: DEFAULT_MAX_CHARS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn from_config(oracle: &'o O, config: &AppConfig) -> Self {
        Self {
            oracle,
            max_chars: config.analysis.max_chars,
            max_tokens: config.oracle.max_tokens,
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Analyze one text.
    ///
    /// Blank input gives `ok = false`; oracle failures are returned as `Err`.
    pub async fn analyze(&self, raw_text: &str) -> Result<AnalysisResult, OracleError> {
        if raw_text.trim().is_empty() {
            warn!("analysis.empty_input");
            return Ok(AnalysisResult::failure(EMPTY_INPUT_MESSAGE));
        }

        let span = info_span!("analysis", request_id = %Uuid::new_v4());
        self.run(Document::prepare(raw_text, self.max_chars))
            .instrument(span)
            .await
    }

    async fn run(&self, doc: Document<'_>) -> Result<AnalysisResult, OracleError> {
        info!(
            raw_chars = doc.raw.chars().count(),
            truncated = doc.truncated,
            "analysis.start"
        );

        // Document-level signals
        let segmented = SegmentedText::new(doc.text);
        let perplexity = validate_perplexity(self.oracle.score(doc.text, self.max_tokens).await?)?;
        let signals = extract_raw_signals(&segmented, perplexity);

        let normalized = NormalizedSignals::from_raw(&signals);
        let ai_percent = to_percent(combine_score(&normalized));
        let verdict = build_verdict(ai_percent, explain(&signals));

        // Sentence-level flags
        let sentences = flag_sentences(self.oracle, doc.text, self.max_tokens).await?;

        info!(
            ai_percentage = verdict.ai_percentage,
            classification = verdict.classification.label(),
            confidence = verdict.confidence.label(),
            sentences_scored = sentences.len(),
            "analysis.done"
        );

        Ok(AnalysisResult::success(AnalysisReport {
            truncated: doc.truncated,
            verdict,
            metrics: Metrics::from_signals(&signals),
            sentences,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, Confidence};
    use crate::services::detection::explainer::{REASON_LOW_PERPLEXITY, REASON_SHORT_INPUT};
    use crate::services::detection::scoring::classify_percent;
    use crate::services::oracle::HeuristicOracle;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns a fixed perplexity and records what it was asked to score.
    struct RecordingOracle {
        ppl: f64,
        calls: AtomicUsize,
        longest: Mutex<usize>,
    }

    impl RecordingOracle {
        fn new(ppl: f64) -> Self {
            Self {
                ppl,
                calls: AtomicUsize::new(0),
                longest: Mutex::new(0),
            }
        }
    }

    impl PerplexityOracle for RecordingOracle {
        async fn score(&self, text: &str, _max_tokens: usize) -> Result<f64, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut longest = self.longest.lock().unwrap();
            *longest = (*longest).max(text.chars().count());
            Ok(self.ppl)
        }
    }

    struct BrokenOracle;

    impl PerplexityOracle for BrokenOracle {
        async fn score(&self, _text: &str, _max_tokens: usize) -> Result<f64, OracleError> {
            Err(OracleError::ServiceError {
                status: 503,
                message: "model not loaded".to_string(),
            })
        }
    }

    const ESSAY: &str = "Rain fell on the harbor all night. The fishermen waited, \
        mending nets and arguing about the price of diesel. By dawn it calmed. \
        Nobody spoke when the first boat finally slipped its mooring and \
        headed out past the breakwater into a grey, uncertain sea.";

    fn report(result: &AnalysisResult) -> &AnalysisReport {
        result.report.as_ref().expect("successful analysis")
    }

    #[tokio::test]
    async fn test_blank_input_fails_without_scoring() {
        let oracle = RecordingOracle::new(30.0);
        let analyzer = Analyzer::new(&oracle);
        for input in ["", "   ", "\n\t  \n"] {
            let result = analyzer.analyze(input).await.unwrap();
            assert!(!result.ok);
            assert_eq!(result.error.as_deref(), Some(EMPTY_INPUT_MESSAGE));
            assert!(result.report.is_none());
        }
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_example() {
        let oracle = RecordingOracle::new(60.0);
        let result = Analyzer::new(&oracle)
            .analyze("The quick brown fox jumps. The lazy dog sleeps.")
            .await
            .unwrap();
        assert!(result.ok);
        let r = report(&result);
        assert!(!r.truncated);
        assert_eq!(r.metrics.sentences, 2);
        assert_eq!(r.metrics.lexical_diversity, 0.0);
        assert_eq!(r.metrics.repetition_score, 0.0);
        assert!(r.verdict.reasons.iter().any(|s| s == REASON_SHORT_INPUT));
        // Neither sentence reaches six words.
        assert!(r.sentences.is_empty());
        // Only the document itself was scored.
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_word_sentinel() {
        let oracle = RecordingOracle::new(60.0);
        let result = Analyzer::new(&oracle)
            .analyze("the the the the the the the the the the cat sat")
            .await
            .unwrap();
        assert_eq!(report(&result).metrics.repetition_score, 0.0);
    }

    #[tokio::test]
    async fn test_fused_percentage_for_known_signals() {
        // ppl 65 -> 0.5; lexical sentinel 0 -> 1.0; repetition sentinel 0 -> 0.0;
        // burstiness of two sentences (5 and 4 words) = 0.111.. -> 0.8444..
        // 0.45*0.5 + 0.20*1.0 + 0.15*0.8444 = 0.5517 -> 55
        let oracle = RecordingOracle::new(65.0);
        let result = Analyzer::new(&oracle)
            .analyze("The quick brown fox jumps. The lazy dog sleeps.")
            .await
            .unwrap();
        let r = report(&result);
        assert_eq!(r.verdict.ai_percentage, 55);
        assert_eq!(r.verdict.human_percentage, 45);
        assert_eq!(r.verdict.classification, Classification::Mixed);
        assert_eq!(r.verdict.confidence, Confidence::Medium);
    }

    #[tokio::test]
    async fn test_truncates_long_input() {
        let sentence = "Every sentence here carries exactly eight words. ";
        let text = sentence.repeat(7000 / sentence.len() + 1);
        let text = &text[..7000];
        assert_eq!(text.chars().count(), 7000);

        let oracle = RecordingOracle::new(80.0);
        let result = Analyzer::new(&oracle).analyze(text).await.unwrap();
        let r = report(&result);
        assert!(r.truncated);
        assert!(*oracle.longest.lock().unwrap() <= 6000);

        let head_only = RecordingOracle::new(80.0);
        let expected = Analyzer::new(&head_only).analyze(&text[..6000]).await.unwrap();
        let e = report(&expected);
        assert!(!e.truncated);
        assert_eq!(r.metrics, e.metrics);
        assert_eq!(r.sentences, e.sentences);
        assert_eq!(r.verdict, e.verdict);
    }

    #[tokio::test]
    async fn test_exactly_max_chars_not_truncated() {
        let text = "a".repeat(6000);
        let oracle = RecordingOracle::new(80.0);
        let result = Analyzer::new(&oracle).analyze(&text).await.unwrap();
        assert!(!report(&result).truncated);
    }

    #[tokio::test]
    async fn test_sentences_under_six_words_never_listed() {
        let oracle = RecordingOracle::new(30.0);
        let result = Analyzer::new(&oracle).analyze(ESSAY).await.unwrap();
        let r = report(&result);
        assert!(!r.sentences.is_empty());
        for s in &r.sentences {
            assert!(s.text.split_whitespace().count() >= 6);
            assert!(s.ai_like);
        }
        assert!(!r.sentences.iter().any(|s| s.text == "By dawn it calmed."));
        assert!(r.verdict.reasons.iter().any(|s| s == REASON_LOW_PERPLEXITY));
    }

    #[tokio::test]
    async fn test_result_invariants_over_perplexity_range() {
        for ppl in [1.0, 10.0, 44.9, 45.0, 65.0, 90.0, 90.1, 120.0, 400.0] {
            let oracle = RecordingOracle::new(ppl);
            let result = Analyzer::new(&oracle).analyze(ESSAY).await.unwrap();
            let v = &report(&result).verdict;
            assert!(v.ai_percentage <= 100);
            assert_eq!(v.human_percentage, 100 - v.ai_percentage);
            assert!(!v.reasons.is_empty());
            assert_eq!((v.classification, v.confidence), classify_percent(v.ai_percentage));
        }
    }

    #[tokio::test]
    async fn test_oracle_failure_is_error() {
        let result = Analyzer::new(&BrokenOracle).analyze(ESSAY).await;
        assert!(matches!(result, Err(OracleError::ServiceError { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_invalid_oracle_values_are_errors() {
        for ppl in [f64::NAN, f64::INFINITY, -1.0, 0.0] {
            let oracle = RecordingOracle::new(ppl);
            let result = Analyzer::new(&oracle)
                .analyze("The quick brown fox jumps over the lazy dog today. Another sentence here.")
                .await;
            assert!(matches!(result, Err(OracleError::InvalidValue(_))), "ppl {}", ppl);
        }
    }

    #[tokio::test]
    async fn test_idempotent_with_deterministic_oracle() {
        let oracle = HeuristicOracle;
        let analyzer = Analyzer::new(&oracle);
        let first = analyzer.analyze(ESSAY).await.unwrap();
        let second = analyzer.analyze(ESSAY).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_config_limits_apply() {
        let mut config = AppConfig::default();
        config.analysis.max_chars = 20;
        let oracle = RecordingOracle::new(80.0);
        let analyzer = Analyzer::from_config(&oracle, &config);
        assert_eq!(analyzer.max_chars(), 20);
        let result = analyzer.analyze(ESSAY).await.unwrap();
        assert!(report(&result).truncated);
        assert!(*oracle.longest.lock().unwrap() <= 20);
    }
}

// Sentence Flagger
// Per-sentence perplexity and AI-like flags

use tracing::debug;

use crate::models::{round_to, SentenceVerdict};
use crate::services::oracle::{validate_perplexity, OracleError, PerplexityOracle};
use crate::services::text_processor::sentences;

/// Sentences with fewer whitespace-delimited words are not scored.
pub const MIN_SENTENCE_WORDS: usize = 6;
/// Sentence perplexity below this is flagged AI-like.
pub const SENTENCE_AI_PERPLEXITY: f64 = 50.0;

/// Sentences long enough to score, lazily and in document order.
pub fn candidate_sentences(text: &str) -> impl Iterator<Item = &str> + '_ {
    sentences(text).filter(|s| s.split_whitespace().count() >= MIN_SENTENCE_WORDS)
}

/// Score each candidate sentence once, in order.
pub async fn flag_sentences<O: PerplexityOracle>(
    oracle: &O,
    text: &str,
    max_tokens: usize,
) -> Result<Vec<SentenceVerdict>, OracleError> {
    let mut results = Vec::new();
    for sentence in candidate_sentences(text) {
        let ppl = validate_perplexity(oracle.score(sentence, max_tokens).await?)?;
        results.push(SentenceVerdict {
            text: sentence.to_string(),
            perplexity: round_to(ppl, 2),
            ai_like: ppl < SENTENCE_AI_PERPLEXITY,
        });
    }
    debug!(
        flagged = results.iter().filter(|r| r.ai_like).count(),
        scored = results.len(),
        "sentences.flagged"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::oracle::DEFAULT_MAX_TOKENS;

    /// Perplexity equals ten times the word count.
    struct WordCountOracle;

    impl PerplexityOracle for WordCountOracle {
        async fn score(&self, text: &str, _max_tokens: usize) -> Result<f64, OracleError> {
            Ok(text.split_whitespace().count() as f64 * 10.0)
        }
    }

    #[test]
    fn test_candidates_skip_short_sentences() {
        let text = "Too short here. This one has exactly six words. Tiny! Another sentence that is long enough to count.";
        let found: Vec<&str> = candidate_sentences(text).collect();
        assert_eq!(
            found,
            vec![
                "This one has exactly six words.",
                "Another sentence that is long enough to count.",
            ]
        );
    }

    #[tokio::test]
    async fn test_each_candidate_scored_in_order() {
        let text = "One two three four five six. One two three four five six seven eight nine ten.";
        let flags = flag_sentences(&WordCountOracle, text, DEFAULT_MAX_TOKENS).await.unwrap();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].perplexity, 60.0);
        assert!(!flags[0].ai_like);
        assert_eq!(flags[1].perplexity, 100.0);
        assert!(!flags[1].ai_like);
    }

    #[tokio::test]
    async fn test_flags_low_perplexity_sentences() {
        struct Fixed(f64);
        impl PerplexityOracle for Fixed {
            async fn score(&self, _text: &str, _max_tokens: usize) -> Result<f64, OracleError> {
                Ok(self.0)
            }
        }
        let text = "The model writes this sentence very smoothly indeed.";
        let low = flag_sentences(&Fixed(49.999), text, DEFAULT_MAX_TOKENS).await.unwrap();
        assert!(low[0].ai_like);
        assert_eq!(low[0].perplexity, 50.0);
        let edge = flag_sentences(&Fixed(50.0), text, DEFAULT_MAX_TOKENS).await.unwrap();
        assert!(!edge[0].ai_like);
    }

    #[tokio::test]
    async fn test_oracle_failure_propagates() {
        struct Failing;
        impl PerplexityOracle for Failing {
            async fn score(&self, _text: &str, _max_tokens: usize) -> Result<f64, OracleError> {
                Err(OracleError::InvalidValue(f64::NAN))
            }
        }
        let text = "This sentence is long enough to be scored by the oracle.";
        assert!(flag_sentences(&Failing, text, DEFAULT_MAX_TOKENS).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_non_positive_sentence_perplexity() {
        struct Negative;
        impl PerplexityOracle for Negative {
            async fn score(&self, _text: &str, _max_tokens: usize) -> Result<f64, OracleError> {
                Ok(-1.0)
            }
        }
        let text = "This sentence is long enough to be scored by the oracle.";
        let result = flag_sentences(&Negative, text, DEFAULT_MAX_TOKENS).await;
        assert!(matches!(result, Err(OracleError::InvalidValue(_))));
    }
}

// Perplexity Oracle Service
// Language-model perplexity scoring: HTTP scoring service client and offline heuristic

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use crate::services::config_store::{OracleBackend, OracleConfig};

/// Default token budget per scoring call.
pub const DEFAULT_MAX_TOKENS: usize = 1024;
/// Scoring service URL
pub const DEFAULT_ORACLE_URL: &str = "http://127.0.0.1:8790";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Scoring service error: {status} - {message}")]
    ServiceError { status: u16, message: String },
    #[error("Invalid perplexity value: {0}")]
    InvalidValue(f64),
}

/// Scores how predictable a text is to a language model. Lower is more
/// predictable.
///
/// Implementations truncate to `max_tokens` themselves and must tolerate
/// repeated and concurrent calls.
pub trait PerplexityOracle: Send + Sync {
    fn score(
        &self,
        text: &str,
        max_tokens: usize,
    ) -> impl Future<Output = Result<f64, OracleError>> + Send;
}

/// Reject values outside the oracle contract (finite and positive).
pub fn validate_perplexity(value: f64) -> Result<f64, OracleError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(OracleError::InvalidValue(value))
    }
}

// ============================================================================
// HTTP scoring service
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreRequest<'a> {
    text: &'a str,
    max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    perplexity: f64,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Client for a perplexity scoring service.
///
/// `POST {base}/perplexity` with `{"text","maxTokens"}` returns
/// `{"perplexity": f64}`; `GET {base}/health` returns `{"status":"ok"}`.
pub struct HttpPerplexityOracle {
    client: Client,
    base_url: String,
}

impl Default for HttpPerplexityOracle {
    fn default() -> Self {
        Self::new(DEFAULT_ORACLE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl HttpPerplexityOracle {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check whether the service answers its health probe
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => match resp.json::<HealthResponse>().await {
                Ok(health) => health.status == "ok",
                Err(_) => false,
            },
            Err(_) => false,
        }
    }
}

impl PerplexityOracle for HttpPerplexityOracle {
    async fn score(&self, text: &str, max_tokens: usize) -> Result<f64, OracleError> {
        let url = format!("{}/perplexity", self.base_url);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&ScoreRequest { text, max_tokens })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ScoreResponse = response.json().await?;
        debug!(
            chars = text.chars().count(),
            latency_ms = started.elapsed().as_millis() as u64,
            perplexity = body.perplexity,
            "oracle.http.score"
        );
        validate_perplexity(body.perplexity)
    }
}

// ============================================================================
// Offline heuristic
// ============================================================================

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9_]+|[\u{4e00}-\u{9fff}]").expect("token regex"))
}

/// Deterministic perplexity estimate from unigram entropy and vocabulary
/// spread, for use without a language model. Output lies in [20, 300].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicOracle;

impl HeuristicOracle {
    pub fn estimate(&self, text: &str, max_tokens: usize) -> f64 {
        let matches: Vec<regex::Match<'_>> = token_re().find_iter(text).take(max_tokens).collect();
        let Some(last) = matches.last() else {
            return 120.0;
        };
        let covered_chars = text[..last.end()].chars().count() as f64;

        // Ordered map keeps the float summation order stable across runs.
        let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
        for m in &matches {
            *freq.entry(m.as_str()).or_insert(0) += 1;
        }

        let total = matches.len() as f64;
        let entropy = -freq
            .values()
            .map(|&c| {
                let p = c as f64 / total;
                p * (p + 1e-12).ln()
            })
            .sum::<f64>();

        let ppl_uni = entropy.exp();
        let ppl_scaled = 20.0 + ((ppl_uni - 1.0) * 22.5).min(280.0);
        let diversity = freq.len() as f64 / total;
        let base = 120.0 - diversity * 60.0 + covered_chars / 500.0;
        let val = 0.5 * ppl_scaled + 0.5 * base;
        (val.clamp(20.0, 300.0) * 100.0).round() / 100.0
    }
}

impl PerplexityOracle for HeuristicOracle {
    async fn score(&self, text: &str, max_tokens: usize) -> Result<f64, OracleError> {
        validate_perplexity(self.estimate(text, max_tokens))
    }
}

// ============================================================================
// Configured backend
// ============================================================================

/// Oracle selected from configuration.
pub enum ConfiguredOracle {
    Http(HttpPerplexityOracle),
    Heuristic(HeuristicOracle),
}

impl ConfiguredOracle {
    pub fn from_config(config: &OracleConfig) -> Self {
        match config.backend {
            OracleBackend::Http => Self::Http(HttpPerplexityOracle::new(
                &config.base_url,
                Duration::from_secs(config.timeout_secs),
            )),
            OracleBackend::Heuristic => Self::Heuristic(HeuristicOracle),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(o) => format!("http ({})", o.base_url()),
            Self::Heuristic(_) => "heuristic".to_string(),
        }
    }
}

impl PerplexityOracle for ConfiguredOracle {
    async fn score(&self, text: &str, max_tokens: usize) -> Result<f64, OracleError> {
        match self {
            Self::Http(o) => o.score(text, max_tokens).await,
            Self::Heuristic(o) => o.score(text, max_tokens).await,
        }
    }
}

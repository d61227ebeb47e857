// Signal Normalization
// Fixed linear-clamp curves mapping raw signals onto [0,1] AI-likeness

use crate::models::{NormalizedSignals, RawSignals};

// Calibration bands: (AI end, human end) of the linear region for each signal.

/// Perplexity 10 is fully AI-like, 120 fully human-like.
pub const PERPLEXITY_BAND: (f64, f64) = (10.0, 120.0);
/// Lexical diversity 0.20 is fully AI-like, 0.55 fully human-like.
pub const LEXICAL_BAND: (f64, f64) = (0.20, 0.55);
/// Repetition 0.28 is fully AI-like, 0.10 fully human-like.
pub const REPETITION_BAND: (f64, f64) = (0.28, 0.10);
/// Burstiness 0.08 is fully AI-like, 0.28 fully human-like.
pub const BURSTINESS_BAND: (f64, f64) = (0.08, 0.28);

#[inline]
pub fn clamp01(x: f64) -> f64 {
    x.max(0.0).min(1.0)
}

/// Affine map sending `human` to 0 and `ai` to 1, clamped.
#[inline]
fn band_score(x: f64, (ai, human): (f64, f64)) -> f64 {
    clamp01((human - x) / (human - ai))
}

pub fn normalize_perplexity(ppl: f64) -> f64 {
    band_score(ppl, PERPLEXITY_BAND)
}

pub fn normalize_lexical(lex: f64) -> f64 {
    band_score(lex, LEXICAL_BAND)
}

pub fn normalize_repetition(rep: f64) -> f64 {
    band_score(rep, REPETITION_BAND)
}

pub fn normalize_burstiness(burst: f64) -> f64 {
    band_score(burst, BURSTINESS_BAND)
}

impl NormalizedSignals {
    /// Sentinel zeros are normalized like any other value.
    pub fn from_raw(raw: &RawSignals) -> Self {
        Self {
            perplexity: normalize_perplexity(raw.perplexity),
            lexical_diversity: normalize_lexical(raw.lexical_diversity),
            repetition: normalize_repetition(raw.repetition),
            burstiness: normalize_burstiness(raw.burstiness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perplexity_curve() {
        assert_eq!(normalize_perplexity(10.0), 1.0);
        assert_eq!(normalize_perplexity(120.0), 0.0);
        assert_eq!(normalize_perplexity(2.0), 1.0);
        assert_eq!(normalize_perplexity(500.0), 0.0);
        assert!(close(normalize_perplexity(65.0), 0.5));
    }

    #[test]
    fn test_lexical_curve() {
        assert!(close(normalize_lexical(0.20), 1.0));
        assert!(close(normalize_lexical(0.55), 0.0));
        assert!(close(normalize_lexical(0.375), 0.5));
        // The short-text sentinel saturates toward AI-like.
        assert_eq!(normalize_lexical(0.0), 1.0);
    }

    #[test]
    fn test_repetition_curve() {
        assert!(close(normalize_repetition(0.28), 1.0));
        assert!(close(normalize_repetition(0.10), 0.0));
        assert!(close(normalize_repetition(0.19), 0.5));
        assert_eq!(normalize_repetition(0.0), 0.0);
    }

    #[test]
    fn test_burstiness_curve() {
        assert!(close(normalize_burstiness(0.08), 1.0));
        assert!(close(normalize_burstiness(0.28), 0.0));
        assert!(close(normalize_burstiness(0.18), 0.5));
        assert_eq!(normalize_burstiness(0.0), 1.0);
        assert_eq!(normalize_burstiness(1.5), 0.0);
    }

    #[test]
    fn test_from_raw() {
        let raw = RawSignals {
            perplexity: 65.0,
            lexical_diversity: 0.0,
            repetition: 0.0,
            burstiness: 0.18,
            ..Default::default()
        };
        let n = NormalizedSignals::from_raw(&raw);
        assert!(close(n.perplexity, 0.5));
        assert_eq!(n.lexical_diversity, 1.0);
        assert_eq!(n.repetition, 0.0);
        assert!(close(n.burstiness, 0.5));
    }
}

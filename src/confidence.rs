//! Confidence scoring for a merged profile.
//!
//! score = base(total words) × penalties + min(bonuses, bonus_cap),
//! clamped to [0, ceiling] and rounded to two decimals.
//!
//! Base is piecewise linear inside each word-volume bracket (monotonic,
//! continuous at the bracket edges). Penalties and the advanced-analysis bonus
//! come from external detectors; nothing here looks at merged values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::{ConfidenceConfig, FusionConfig};
use crate::source_weights::{effective_word_count, WeightedSource};

/// Batch-level signals supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySignals {
    #[serde(default)]
    pub advanced_analysis_succeeded: bool,
}

impl QualitySignals {
    pub fn advanced() -> Self {
        Self {
            advanced_analysis_succeeded: true,
        }
    }
}

/// `(from_words, to_words, from_score, to_score)`; below the first bracket the
/// score is 0.20, from the last `to_words` on it saturates at 0.92.
const VOLUME_BANDS: [(u64, u64, f64, f64); 6] = [
    (100, 500, 0.20, 0.35),
    (500, 1500, 0.35, 0.55),
    (1500, 3000, 0.55, 0.70),
    (3000, 5000, 0.70, 0.80),
    (5000, 10_000, 0.80, 0.88),
    (10_000, 30_000, 0.88, 0.92),
];

const MIN_BASE: f64 = 0.20;
const MAX_BASE: f64 = 0.92;

/// Base confidence from total word volume.
pub fn base_from_volume(total_words: u64) -> f64 {
    if total_words < VOLUME_BANDS[0].0 {
        return MIN_BASE;
    }
    for (lo, hi, from, to) in VOLUME_BANDS {
        if total_words < hi {
            let t = (total_words - lo) as f64 / (hi - lo) as f64;
            return from + (to - from) * t;
        }
    }
    MAX_BASE
}

/// Minimum vocabulary diversity expected from a source of `words` words.
pub fn diversity_minimum(words: u64, cfg: &ConfidenceConfig) -> f64 {
    cfg.diversity_bands
        .iter()
        .find(|b| words < b.below_words)
        .map_or(cfg.diversity_floor, |b| b.minimum)
}

/// Every intermediate of the confidence computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceBreakdown {
    pub total_words: u64,
    pub base: f64,
    pub spam_penalty: bool,
    pub diversity_penalty: bool,
    pub bonus: f64,
    pub score: f64,
}

pub fn breakdown(sources: &[WeightedSource<'_>], signals: &QualitySignals, cfg: &FusionConfig) -> ConfidenceBreakdown {
    let c = &cfg.confidence;
    if sources.is_empty() {
        return ConfidenceBreakdown {
            total_words: 0,
            base: c.default_confidence,
            spam_penalty: false,
            diversity_penalty: false,
            bonus: 0.0,
            score: c.default_confidence,
        };
    }

    // 1) Base from volume
    let words: Vec<u64> = sources
        .iter()
        .map(|s| effective_word_count(s.source.word_count, &cfg.quantity))
        .collect();
    let total_words = words.iter().fold(0u64, |acc, w| acc.saturating_add(*w));
    let base = base_from_volume(total_words);

    // 2) Penalties (each applied at most once)
    let spam_penalty = sources.iter().any(|s| {
        s.source
            .signals
            .duplicate_sentence_ratio
            .is_some_and(|r| r >= c.duplicate_ratio_threshold)
    });
    let diversity_penalty = sources.iter().zip(&words).any(|(s, &w)| {
        s.source
            .signals
            .vocabulary_diversity
            .is_some_and(|d| d < diversity_minimum(w, c))
    });
    let mut score = base;
    if spam_penalty {
        score *= c.duplicate_penalty;
    }
    if diversity_penalty {
        score *= c.diversity_penalty;
    }

    // 3) Bonuses, capped
    let distinct_types: BTreeSet<_> = sources.iter().map(|s| &s.source.source_type).collect();
    let mut bonus = 0.0;
    if distinct_types.len() >= 2 {
        bonus += c.distinct_types_bonus;
    }
    if sources.len() >= 2 {
        bonus += c.redundancy_bonus;
    }
    if signals.advanced_analysis_succeeded {
        bonus += c.advanced_analysis_bonus;
    }
    let bonus = bonus.min(c.bonus_cap);
    score += bonus;

    // 4) Cap and round
    let score = round2(score.clamp(0.0, c.ceiling));

    ConfidenceBreakdown {
        total_words,
        base,
        spam_penalty,
        diversity_penalty,
        bonus,
        score,
    }
}

pub fn compute_confidence(sources: &[WeightedSource<'_>], signals: &QualitySignals, cfg: &FusionConfig) -> f64 {
    breakdown(sources, signals, cfg).score
}

#[inline]
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

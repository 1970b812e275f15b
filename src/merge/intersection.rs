//! Weighted intersection for avoidance lists.
//!
//! Order of preference:
//! 1) terms listed by at least `avoidance_share_threshold` of the sources (by count)
//! 2) terms whose total weight exceeds `avoidance_weight_fallback`
//! 3) the sentinel `["none"]`
//!
//! Capped at `avoidance_cap`, heaviest total weight first.

use super::union::{collect_terms, into_attribute, rank, TermScore};
use super::{score_key, MergedAttribute, SetAttribute};
use crate::config::MergeConfig;
use crate::source_weights::WeightedSource;

/// Sentinel meaning "nothing in particular is avoided".
pub const NONE_SENTINEL: &str = "none";

pub fn weighted_intersection(sources: &[WeightedSource<'_>], cfg: &MergeConfig) -> SetAttribute {
    let mut scores = collect_terms(sources, |ws| ws.source.avoidance, |t| t != NONE_SENTINEL);
    let share_min = cfg.avoidance_share_threshold * sources.len() as f64;
    let meets_share = |t: &TermScore<'_>| t.contributors.len() as f64 >= share_min;

    if scores.iter().any(meets_share) {
        scores.retain(meets_share);
    } else {
        let floor = score_key(cfg.avoidance_weight_fallback);
        scores.retain(|t| score_key(t.score) > floor);
    }

    rank(&mut scores);
    scores.truncate(cfg.avoidance_cap);
    if scores.is_empty() {
        return none_sentinel();
    }
    into_attribute(sources, &scores)
}

fn none_sentinel() -> SetAttribute {
    MergedAttribute {
        value: vec![NONE_SENTINEL.to_string()],
        contributions: Vec::new(),
        warnings: Vec::new(),
    }
}

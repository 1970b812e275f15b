//! Weighted voting over a closed categorical enumeration.
//!
//! Tally = Σ normalized weight per value. Highest tally wins; on a tie the value
//! backed by the single highest-quality source wins, then the one backed by the
//! heaviest raw weight, then the one seen first.

use tracing::warn;

use super::{percent, score_key, Contribution, MergedAttribute};
use crate::assessment::{Category, ValidAssessment};
use crate::profile::MergeWarning;
use crate::source_weights::WeightedSource;

#[derive(Debug)]
struct Tally<T> {
    value: T,
    total: f64,
    best_quality: f64,
    best_raw: f64,
    first_seen: usize,
    members: Vec<usize>,
}

impl<T> Tally<T> {
    /// Strict "wins over" relation used to pick the winner.
    fn beats(&self, other: &Self) -> bool {
        let (a, b) = (score_key(self.total), score_key(other.total));
        if a != b {
            return a > b;
        }
        let (a, b) = (score_key(self.best_quality), score_key(other.best_quality));
        if a != b {
            return a > b;
        }
        let (a, b) = (score_key(self.best_raw), score_key(other.best_raw));
        if a != b {
            return a > b;
        }
        self.first_seen < other.first_seen
    }
}

/// Vote on one categorical attribute. `field` picks the raw value off each source.
pub fn vote<'a, T, F>(sources: &[WeightedSource<'a>], field: F) -> MergedAttribute<T>
where
    T: Category,
    F: Fn(&ValidAssessment<'a>) -> &'a str,
{
    let mut warnings = Vec::new();
    let mut tallies: Vec<Tally<T>> = Vec::new();

    for (idx, ws) in sources.iter().enumerate() {
        let raw = field(&ws.source);
        let (value, coerced) = T::coerce(raw);
        if coerced {
            let attribute = T::ATTRIBUTE.as_str();
            warn!(
                target: "fusion",
                attribute,
                source_type = %ws.source.source_type,
                raw,
                coerced_to = value.as_str(),
                "unrecognized categorical value"
            );
            metrics::counter!("style_fusion_values_coerced_total", "attribute" => attribute).increment(1);
            warnings.push(MergeWarning::coerced(&ws.source.source_type, T::ATTRIBUTE, raw, value.as_str()));
        }

        match tallies.iter_mut().find(|t| t.value == value) {
            Some(t) => {
                t.total += ws.normalized_weight;
                t.best_quality = t.best_quality.max(ws.quality);
                t.best_raw = t.best_raw.max(ws.raw_weight);
                t.members.push(idx);
            }
            None => tallies.push(Tally {
                value,
                total: ws.normalized_weight,
                best_quality: ws.quality,
                best_raw: ws.raw_weight,
                first_seen: idx,
                members: vec![idx],
            }),
        }
    }

    let mut winner: Option<&Tally<T>> = None;
    for t in &tallies {
        if winner.map_or(true, |w| t.beats(w)) {
            winner = Some(t);
        }
    }

    match winner {
        Some(w) => MergedAttribute {
            value: w.value,
            contributions: w
                .members
                .iter()
                .map(|&i| Contribution {
                    source_type: sources[i].source.source_type.clone(),
                    percentage: percent(sources[i].normalized_weight, w.total),
                })
                .collect(),
            warnings,
        },
        None => MergedAttribute {
            value: T::FALLBACK,
            contributions: Vec::new(),
            warnings,
        },
    }
}

//! Formality averaging: casual=0, balanced=1, formal=2, weighted mean, then back
//! to a category. Averaging blends rather than selects, so every source is
//! attributed by its normalized weight.

use tracing::warn;

use super::{percent, Contribution, MergedAttribute};
use crate::assessment::{Category, Formality};
use crate::profile::MergeWarning;
use crate::source_weights::WeightedSource;

/// Weighted mean score on the formality axis. `None` for an empty batch.
pub fn weighted_mean(sources: &[WeightedSource<'_>]) -> Option<f64> {
    let total: f64 = sources.iter().map(|s| s.normalized_weight).sum();
    if sources.is_empty() || !(total > 0.0) {
        return None;
    }
    let acc: f64 = sources
        .iter()
        .map(|s| Formality::coerce(s.source.formality).0.score() * s.normalized_weight)
        .sum();
    Some(acc / total)
}

pub fn average_formality(sources: &[WeightedSource<'_>]) -> MergedAttribute<Formality> {
    let mut warnings = Vec::new();
    for ws in sources {
        let raw = ws.source.formality;
        let (value, coerced) = Formality::coerce(raw);
        if coerced {
            warn!(
                target: "fusion",
                attribute = "formality",
                source_type = %ws.source.source_type,
                raw,
                coerced_to = value.as_str(),
                "unrecognized categorical value"
            );
            metrics::counter!("style_fusion_values_coerced_total", "attribute" => "formality").increment(1);
            warnings.push(MergeWarning::coerced(
                &ws.source.source_type,
                Formality::ATTRIBUTE,
                raw,
                value.as_str(),
            ));
        }
    }

    let value = weighted_mean(sources).map_or(Formality::FALLBACK, Formality::from_mean);
    let total: f64 = sources.iter().map(|s| s.normalized_weight).sum();

    MergedAttribute {
        value,
        contributions: sources
            .iter()
            .map(|s| Contribution {
                source_type: s.source.source_type.clone(),
                percentage: percent(s.normalized_weight, total),
            })
            .collect(),
        warnings,
    }
}

// src/merge/mod.rs
//! Attribute mergers: five independent strategies over one immutable
//! weighted-source snapshot.
//!
//! - `categorical`  : weighted voting (tone, sentence length)
//! - `numeric`      : weighted mean on an ordinal axis (formality)
//! - `union`        : weighted union, top-N (vocabulary)
//! - `intersection` : occurrence/weight thresholds, top-N (avoidance)

pub mod categorical;
pub mod intersection;
pub mod numeric;
pub mod union;

use serde::{Deserialize, Serialize};

use crate::assessment::{Formality, SentenceLength, Tone};
use crate::config::MergeConfig;
use crate::profile::MergeWarning;
use crate::source_weights::{SourceType, WeightedSource};

/// One source's share of a merged value, as an integer percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub source_type: SourceType,
    pub percentage: u8,
}

/// Contributions behind one term of a set-valued attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermContribution {
    pub term: String,
    pub contributions: Vec<Contribution>,
}

/// Output of one merger for one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedAttribute<V, C = Vec<Contribution>> {
    pub value: V,
    pub contributions: C,
    /// Non-fatal substitutions made while reading source values.
    pub warnings: Vec<MergeWarning>,
}

pub type SetAttribute = MergedAttribute<Vec<String>, Vec<TermContribution>>;

/// Join point of the five mergers.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMerges {
    pub tone: MergedAttribute<Tone>,
    pub formality: MergedAttribute<Formality>,
    pub sentence_length: MergedAttribute<SentenceLength>,
    pub vocabulary: SetAttribute,
    pub avoidance: SetAttribute,
}

impl AttributeMerges {
    /// All warnings in attribute order.
    pub fn warnings(&self) -> impl Iterator<Item = &MergeWarning> {
        self.tone
            .warnings
            .iter()
            .chain(&self.formality.warnings)
            .chain(&self.sentence_length.warnings)
            .chain(&self.vocabulary.warnings)
            .chain(&self.avoidance.warnings)
    }
}

/// Run the five mergers one after another.
pub fn merge_sequential(sources: &[WeightedSource<'_>], cfg: &MergeConfig) -> AttributeMerges {
    AttributeMerges {
        tone: categorical::vote::<Tone, _>(sources, |s| s.tone),
        formality: numeric::average_formality(sources),
        sentence_length: categorical::vote::<SentenceLength, _>(sources, |s| s.sentence_length),
        vocabulary: union::weighted_union(sources, cfg.vocabulary_cap),
        avoidance: intersection::weighted_intersection(sources, cfg),
    }
}

/// Fork the five mergers over the same snapshot and join before returning.
/// Yields exactly the same result as [`merge_sequential`].
pub fn merge_parallel(sources: &[WeightedSource<'_>], cfg: &MergeConfig) -> AttributeMerges {
    let ((tone, sentence_length), (formality, (vocabulary, avoidance))) = rayon::join(
        || {
            rayon::join(
                || categorical::vote::<Tone, _>(sources, |s| s.tone),
                || categorical::vote::<SentenceLength, _>(sources, |s| s.sentence_length),
            )
        },
        || {
            rayon::join(
                || numeric::average_formality(sources),
                || {
                    rayon::join(
                        || union::weighted_union(sources, cfg.vocabulary_cap),
                        || intersection::weighted_intersection(sources, cfg),
                    )
                },
            )
        },
    );

    AttributeMerges {
        tone,
        formality,
        sentence_length,
        vocabulary,
        avoidance,
    }
}

/// Integer percentage of `part` in `whole`; 0 when `whole` is not positive.
pub(crate) fn percent(part: f64, whole: f64) -> u8 {
    if !(whole > 0.0) {
        return 0;
    }
    (part / whole * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Quantized score for ordering; sums equal up to 1e-9 compare as ties.
pub(crate) fn score_key(score: f64) -> i64 {
    (score * 1e9).round() as i64
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn percent_rounds_and_guards_zero() {
        assert_eq!(percent(1.0, 3.0), 33);
        assert_eq!(percent(2.0, 3.0), 67);
        assert_eq!(percent(0.5, 0.0), 0);
        assert_eq!(percent(1.0, 1.0), 100);
    }

    #[test]
    fn score_key_absorbs_float_noise() {
        assert_eq!(score_key(0.1 + 0.2), score_key(0.3));
        assert!(score_key(0.31) > score_key(0.3));
    }

    #[test]
    fn parallel_matches_sequential() {
        let a = assessment("CorrespondenceSource")
            .tone("conversational")
            .formality("casual")
            .vocabulary(["honestly", "ship it"])
            .avoidance(["emojis"]);
        let b = assessment("ArticleSource")
            .tone("professional")
            .formality("formal")
            .sentence_length("long")
            .vocabulary(["furthermore", "honestly"])
            .avoidance(["emojis", "slang"]);
        let c = assessment("docs-site").tone("whimsical");
        let sources = vec![weighted(&a, 0.5), weighted(&b, 0.3), weighted(&c, 0.2)];
        let cfg = MergeConfig::default();

        assert_eq!(merge_parallel(&sources, &cfg), merge_sequential(&sources, &cfg));
    }
}

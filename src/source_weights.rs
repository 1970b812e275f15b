//! # Source Weights
//!
//! Maps each style source to a scalar influence weight and rescales a
//! batch of weights so they sum to `1.0`.
//!
//! - `SourceType` is a closed set of known channels plus `Other(tag)`.
//! - Tags are resolved case-insensitively with punctuation/dash normalization.
//! - Aliases map alternative spellings ("email", "github", "blog") to canonical types.
//! - Raw weight = quality weight (by type) × quantity factor (by word count).
//! - Normalization falls back to an equal split when the raw sum is zero.
//!
//! Designed to be simple, testable, and resilient to noisy input.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

use crate::assessment::ValidAssessment;
use crate::config::{FusionConfig, QualityConfig, QuantityConfig};

/// One independent channel of text evidence about a person's writing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceType {
    Correspondence,
    ExistingProfile,
    FreeText,
    Repository,
    Article,
    /// Unrecognized tag, kept verbatim. Weighted with the default quality.
    Other(String),
}

impl SourceType {
    /// Resolve a raw tag via the built-in alias table.
    /// Never fails: unknown tags become `Other(tag)`.
    pub fn parse(raw: &str) -> Self {
        let key = normalize(raw);
        match BUILTIN_ALIASES.get(key.as_str()) {
            Some(st) => st.clone(),
            None => SourceType::Other(raw.trim().to_string()),
        }
    }

    /// Canonical tag, as it appears in attribution output.
    pub fn as_tag(&self) -> &str {
        match self {
            SourceType::Correspondence => "CorrespondenceSource",
            SourceType::ExistingProfile => "ExistingProfileSource",
            SourceType::FreeText => "FreeTextSource",
            SourceType::Repository => "RepositorySource",
            SourceType::Article => "ArticleSource",
            SourceType::Other(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, SourceType::Other(_))
    }
}

impl Default for SourceType {
    fn default() -> Self {
        SourceType::Other("unknown".to_string())
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl From<String> for SourceType {
    fn from(s: String) -> Self {
        SourceType::parse(&s)
    }
}

impl From<&str> for SourceType {
    fn from(s: &str) -> Self {
        SourceType::parse(s)
    }
}

impl From<SourceType> for String {
    fn from(st: SourceType) -> Self {
        st.as_tag().to_string()
    }
}

/// Built-in alias table, keyed by normalized tag.
static BUILTIN_ALIASES: Lazy<HashMap<&'static str, SourceType>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (alias, st) in [
        ("correspondencesource", SourceType::Correspondence),
        ("correspondence", SourceType::Correspondence),
        ("email", SourceType::Correspondence),
        ("emails", SourceType::Correspondence),
        ("gmail", SourceType::Correspondence),
        ("mail", SourceType::Correspondence),
        ("letters", SourceType::Correspondence),
        ("existingprofilesource", SourceType::ExistingProfile),
        ("existingprofile", SourceType::ExistingProfile),
        ("existing profile", SourceType::ExistingProfile),
        ("existing", SourceType::ExistingProfile),
        ("profile", SourceType::ExistingProfile),
        ("prior profile", SourceType::ExistingProfile),
        ("freetextsource", SourceType::FreeText),
        ("free text", SourceType::FreeText),
        ("freetext", SourceType::FreeText),
        ("text", SourceType::FreeText),
        ("writing samples", SourceType::FreeText),
        ("writing sample", SourceType::FreeText),
        ("samples", SourceType::FreeText),
        ("repositorysource", SourceType::Repository),
        ("repository", SourceType::Repository),
        ("repo", SourceType::Repository),
        ("github", SourceType::Repository),
        ("gitlab", SourceType::Repository),
        ("articlesource", SourceType::Article),
        ("article", SourceType::Article),
        ("articles", SourceType::Article),
        ("blog", SourceType::Article),
        ("medium", SourceType::Article),
        ("substack", SourceType::Article),
    ] {
        m.insert(alias, st);
    }
    m
});

/// Resolve `Other(tag)` through configured aliases (alias → canonical tag).
/// Recognized types pass through untouched. When several configured aliases
/// normalize to the same key, the lexicographically smallest alias wins.
pub fn resolve_with_aliases(st: SourceType, aliases: &HashMap<String, String>) -> SourceType {
    let key = match &st {
        SourceType::Other(tag) => normalize(tag),
        _ => return st,
    };
    let canon = aliases
        .iter()
        .filter(|(alias, _)| normalize(alias) == key)
        .map(|(alias, canon)| (alias, SourceType::parse(canon)))
        .filter(|(_, resolved)| resolved.is_recognized())
        .min_by(|a, b| a.0.cmp(b.0))
        .map(|(_, resolved)| resolved);
    canon.unwrap_or(st)
}

/// Quality weight by source type. Unrecognized types get `default_weight`.
pub fn quality_weight(st: &SourceType, q: &QualityConfig) -> f64 {
    let w = match st {
        SourceType::Correspondence => q.correspondence,
        SourceType::ExistingProfile => q.existing_profile,
        SourceType::FreeText => q.free_text,
        SourceType::Repository => q.repository,
        SourceType::Article => q.article,
        SourceType::Other(_) => q.default_weight,
    };
    w.max(0.0)
}

/// Word count used for weighting and volume: missing → `missing_word_count`,
/// zero → `zero_word_count`.
pub fn effective_word_count(word_count: Option<u64>, q: &QuantityConfig) -> u64 {
    match word_count {
        None => q.missing_word_count,
        Some(0) => q.zero_word_count,
        Some(n) => n,
    }
}

/// Quantity factor by word-count bucket.
pub fn quantity_factor(word_count: Option<u64>, q: &QuantityConfig) -> f64 {
    let n = effective_word_count(word_count, q);
    if n < q.low_threshold {
        q.low_factor
    } else if n < q.high_threshold {
        q.mid_factor
    } else {
        q.high_factor
    }
}

/// `quality × quantity`. Unbounded; normalization bounds it.
pub fn raw_weight(source: &ValidAssessment<'_>, cfg: &FusionConfig) -> f64 {
    quality_weight(&source.source_type, &cfg.quality) * quantity_factor(source.word_count, &cfg.quantity)
}

/// Rescale weights to sum to 1.0. Zero (or non-finite) sum → equal split `1/n`.
pub fn normalize_weights(raw: &[f64]) -> Vec<f64> {
    let n = raw.len();
    if n == 0 {
        return Vec::new();
    }
    let sum: f64 = raw.iter().sum();
    if !(sum.is_finite() && sum > 0.0) {
        return vec![1.0 / n as f64; n];
    }
    if n == 1 {
        return vec![1.0];
    }
    raw.iter().map(|w| w / sum).collect()
}

/// A validated assessment annotated with its weights. Lives for one merge call.
#[derive(Debug, Clone)]
pub struct WeightedSource<'a> {
    pub source: ValidAssessment<'a>,
    /// Quality weight of the source type; used for tie-breaks.
    pub quality: f64,
    pub raw_weight: f64,
    pub normalized_weight: f64,
}

/// Weigh and normalize a whole batch once. The result is the immutable
/// snapshot every merger and the confidence calculator read from.
pub fn weigh_batch<'a>(sources: Vec<ValidAssessment<'a>>, cfg: &FusionConfig) -> Vec<WeightedSource<'a>> {
    let raw: Vec<f64> = sources.iter().map(|s| raw_weight(s, cfg)).collect();
    let normalized = normalize_weights(&raw);

    sources
        .into_iter()
        .zip(raw)
        .zip(normalized)
        .map(|((source, raw_weight), normalized_weight)| WeightedSource {
            quality: quality_weight(&source.source_type, &cfg.quality),
            source,
            raw_weight,
            normalized_weight,
        })
        .collect()
}

/// Normalize input string: lowercase, replace punctuation/dashes with spaces,
/// collapse multiple spaces into one.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();

    // Replace common separators with spaces.
    for ch in ['—', '–', '-', '_', '/', '\\'] {
        out = out.replace(ch, " ");
    }

    // Replace disruptive punctuation/whitespace with spaces.
    out = out.replace(['\n', '\r', '\t', '.', ',', '’', '\''], " ");

    // Collapse multiple spaces.
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> FusionConfig {
        FusionConfig::default()
    }

    #[test]
    fn canonical_tags_round_trip() {
        for st in [
            SourceType::Correspondence,
            SourceType::ExistingProfile,
            SourceType::FreeText,
            SourceType::Repository,
            SourceType::Article,
        ] {
            assert_eq!(SourceType::parse(st.as_tag()), st);
        }
    }

    #[test]
    fn alias_and_case_insensitive_lookup() {
        assert_eq!(SourceType::parse("GMAIL"), SourceType::Correspondence);
        assert_eq!(SourceType::parse("writing_samples"), SourceType::FreeText);
        assert_eq!(SourceType::parse("Git-Hub"), SourceType::Other("Git-Hub".into()));
        assert_eq!(SourceType::parse(" github "), SourceType::Repository);
        assert_eq!(SourceType::parse("Blog"), SourceType::Article);
    }

    #[test]
    fn unknown_tag_kept_verbatim() {
        let st = SourceType::parse("Carrier Pigeon");
        assert_eq!(st, SourceType::Other("Carrier Pigeon".into()));
        assert_eq!(st.to_string(), "Carrier Pigeon");
    }

    #[test]
    fn configured_alias_resolves_other() {
        let mut aliases = HashMap::new();
        aliases.insert("slack".to_string(), "CorrespondenceSource".to_string());
        let st = resolve_with_aliases(SourceType::parse("Slack"), &aliases);
        assert_eq!(st, SourceType::Correspondence);

        let untouched = resolve_with_aliases(SourceType::parse("Fax"), &aliases);
        assert_eq!(untouched, SourceType::Other("Fax".into()));
    }

    #[test]
    fn colliding_aliases_resolve_the_same_way_every_time() {
        for _ in 0..32 {
            // fresh map each round so hash iteration order varies
            let mut aliases = HashMap::new();
            aliases.insert("slack".to_string(), "CorrespondenceSource".to_string());
            aliases.insert("Slack".to_string(), "ArticleSource".to_string());
            aliases.insert("SLACK".to_string(), "not-a-type".to_string());
            let st = resolve_with_aliases(SourceType::parse("sLaCk"), &aliases);
            // "SLACK" < "Slack" < "slack", but "SLACK" maps to nothing recognized
            assert_eq!(st, SourceType::Article);
        }
    }

    #[test]
    fn variant_names_resolve_without_suffix() {
        assert_eq!(SourceType::parse("ExistingProfile"), SourceType::ExistingProfile);
        assert_eq!(SourceType::parse("FreeText"), SourceType::FreeText);
        assert_eq!(SourceType::parse("Correspondence"), SourceType::Correspondence);
        assert_eq!(SourceType::parse("Repository"), SourceType::Repository);
        assert_eq!(SourceType::parse("Article"), SourceType::Article);
    }

    #[test]
    fn quality_order_and_default() {
        let q = &cfg().quality;
        let order = [
            SourceType::Correspondence,
            SourceType::ExistingProfile,
            SourceType::FreeText,
            SourceType::Repository,
            SourceType::Article,
        ];
        for pair in order.windows(2) {
            assert!(quality_weight(&pair[0], q) > quality_weight(&pair[1], q));
        }
        assert!((quality_weight(&SourceType::parse("???"), q) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn quantity_buckets() {
        let q = &cfg().quantity;
        assert_eq!(quantity_factor(Some(499), q), 0.5);
        assert_eq!(quantity_factor(Some(500), q), 1.0);
        assert_eq!(quantity_factor(Some(1499), q), 1.0);
        assert_eq!(quantity_factor(Some(1500), q), 1.5);
        assert_eq!(quantity_factor(None, q), 1.0);
        assert_eq!(quantity_factor(Some(0), q), 0.5);
    }

    #[test]
    fn normalize_sums_to_one() {
        let w = normalize_weights(&[1.5, 0.85, 0.65]);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(w[0] > w[1] && w[1] > w[2]);
    }

    #[test]
    fn normalize_zero_sum_splits_equally() {
        let w = normalize_weights(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(w, vec![0.25; 4]);
    }

    #[test]
    fn normalize_single_is_exactly_one() {
        assert_eq!(normalize_weights(&[0.325]), vec![1.0]);
    }
}

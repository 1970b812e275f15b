//! # Fusion Engine
//! Pure, testable orchestration that maps a batch of per-source assessments to
//! one `MergedProfile`. No I/O, no shared state between calls.
//!
//! Pipeline: validate → weigh → normalize → merge (×5) → score → assemble.
//! The engine never fails: an empty or fully invalid batch yields the degraded
//! default profile.

use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::assessment::{SourceAssessment, ValidAssessment};
use crate::attribution::assemble;
use crate::confidence::{breakdown, QualitySignals};
use crate::config::FusionConfig;
use crate::merge::{merge_parallel, merge_sequential};
use crate::profile::{MergeWarning, MergedProfile};
use crate::source_weights::weigh_batch;

static DEFAULT_CONFIG: Lazy<FusionConfig> = Lazy::new(|| FusionConfig::default().sanitized());

/// Merge with built-in defaults and no external quality signals.
pub fn merge_profile(sources: &[SourceAssessment]) -> MergedProfile {
    merge_sanitized(sources, &QualitySignals::default(), &DEFAULT_CONFIG)
}

/// Full entry point. `cfg` is sanitized first, so a hand-built config cannot
/// push the profile outside its documented ranges.
pub fn merge_profile_with(
    sources: &[SourceAssessment],
    signals: &QualitySignals,
    cfg: &FusionConfig,
) -> MergedProfile {
    let cfg = cfg.clone().sanitized();
    merge_sanitized(sources, signals, &cfg)
}

fn merge_sanitized(sources: &[SourceAssessment], signals: &QualitySignals, cfg: &FusionConfig) -> MergedProfile {
    metrics::counter!("style_fusion_merges_total").increment(1);

    // 1) Validate
    let (valid, mut warnings) = validate_batch(sources, cfg);
    if valid.is_empty() {
        debug!(target: "fusion", submitted = sources.len(), "no valid sources; returning default profile");
        return MergedProfile::degraded(cfg.confidence.default_confidence).with_warnings(warnings);
    }

    // 2) Weigh + normalize once; every later step reads this snapshot.
    let weighted = weigh_batch(valid, cfg);
    debug!(
        target: "fusion",
        sources = weighted.len(),
        weights = ?weighted.iter().map(|w| w.normalized_weight).collect::<Vec<_>>(),
        "normalized source weights"
    );

    // 3) Merge
    let merges = if cfg.parallel_mergers {
        merge_parallel(&weighted, &cfg.merge)
    } else {
        merge_sequential(&weighted, &cfg.merge)
    };
    warnings.extend(merges.warnings().cloned());

    // 4) Score
    let conf = breakdown(&weighted, signals, cfg);
    debug!(
        target: "fusion",
        total_words = conf.total_words,
        base = conf.base,
        spam_penalty = conf.spam_penalty,
        diversity_penalty = conf.diversity_penalty,
        bonus = conf.bonus,
        confidence = conf.score,
        "confidence computed"
    );

    // 5) Assemble
    MergedProfile {
        attribution: assemble(&merges),
        tone: merges.tone.value,
        formality: merges.formality.value,
        sentence_length: merges.sentence_length.value,
        vocabulary: merges.vocabulary.value,
        avoidance: merges.avoidance.value,
        confidence: conf.score,
        sources_used: weighted.len(),
        warnings,
    }
}

/// Same merge, run on tokio's blocking pool for callers inside a runtime.
/// A panicked task degrades to the default profile instead of propagating.
pub async fn merge_profile_async(
    sources: Vec<SourceAssessment>,
    signals: QualitySignals,
    cfg: Arc<FusionConfig>,
) -> MergedProfile {
    let fallback = cfg.confidence.default_confidence;
    match tokio::task::spawn_blocking(move || merge_profile_with(&sources, &signals, &cfg)).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(target: "fusion", error = ?e, "merge task failed; returning default profile");
            MergedProfile::degraded(fallback)
        }
    }
}

/// Drop invalid assessments, resolving configured source aliases on the rest.
fn validate_batch<'a>(
    sources: &'a [SourceAssessment],
    cfg: &FusionConfig,
) -> (Vec<ValidAssessment<'a>>, Vec<MergeWarning>) {
    let mut valid = Vec::with_capacity(sources.len());
    let mut warnings = Vec::new();

    for src in sources {
        match src.validate() {
            Ok(mut v) => {
                v.source_type = cfg.resolve_source_type(v.source_type);
                valid.push(v);
            }
            Err(missing) => {
                let names: Vec<&str> = missing.iter().map(|a| a.as_str()).collect();
                warn!(
                    target: "fusion",
                    source_type = %src.source_type,
                    missing = ?names,
                    "dropping source assessment with missing fields"
                );
                metrics::counter!("style_fusion_sources_dropped_total").increment(1);
                warnings.push(MergeWarning::dropped(&src.source_type, missing));
            }
        }
    }
    (valid, warnings)
}

// src/config.rs
//! Fusion tunables. Defaults reproduce the documented weighting model; a config
//! file only needs to name the values it overrides.
//!
//! TOML shape (every key optional):
//! ```toml
//! parallel_mergers = false
//!
//! [quality]
//! correspondence = 1.0
//! default_weight = 0.5
//!
//! [aliases]
//! slack = "CorrespondenceSource"
//!
//! [quantity]
//! low_threshold = 500
//! high_threshold = 1500
//!
//! [merge]
//! vocabulary_cap = 4
//!
//! [confidence]
//! ceiling = 0.95
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::source_weights::{resolve_with_aliases, SourceType};

pub const ENV_FUSION_CONFIG_PATH: &str = "STYLE_FUSION_CONFIG_PATH";
pub const DEFAULT_FUSION_CONFIG_TOML: &str = "config/fusion.toml";
pub const DEFAULT_FUSION_CONFIG_JSON: &str = "config/fusion.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub quality: QualityConfig,
    /// Extra alias → canonical source-type tag, on top of the built-in table.
    pub aliases: HashMap<String, String>,
    pub quantity: QuantityConfig,
    pub merge: MergeConfig,
    pub confidence: ConfidenceConfig,
    /// Run the five attribute mergers as a fork/join instead of one after another.
    pub parallel_mergers: bool,
}

/// Quality weight per source type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub correspondence: f64,
    pub existing_profile: f64,
    pub free_text: f64,
    pub repository: f64,
    pub article: f64,
    /// Used for unrecognized source types.
    pub default_weight: f64,
}

/// Word-count buckets: `< low` → low factor, `[low, high)` → mid, `>= high` → high.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantityConfig {
    pub low_threshold: u64,
    pub high_threshold: u64,
    pub low_factor: f64,
    pub mid_factor: f64,
    pub high_factor: f64,
    /// Assumed word count when the producer did not report one.
    pub missing_word_count: u64,
    /// Assumed word count when the producer reported exactly zero.
    pub zero_word_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub vocabulary_cap: usize,
    pub avoidance_cap: usize,
    /// Share of sources (by count) a term must appear in.
    pub avoidance_share_threshold: f64,
    /// Total weight a term must exceed when no term meets the share threshold.
    pub avoidance_weight_fallback: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub ceiling: f64,
    /// Confidence of the degraded profile returned for an empty batch.
    pub default_confidence: f64,
    pub distinct_types_bonus: f64,
    pub redundancy_bonus: f64,
    pub advanced_analysis_bonus: f64,
    pub bonus_cap: f64,
    pub duplicate_ratio_threshold: f64,
    pub duplicate_penalty: f64,
    pub diversity_penalty: f64,
    /// Minimum vocabulary diversity by word count; first band with
    /// `words < below_words` applies, otherwise `diversity_floor`.
    pub diversity_bands: Vec<DiversityBand>,
    pub diversity_floor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversityBand {
    pub below_words: u64,
    pub minimum: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            quality: QualityConfig::default(),
            aliases: HashMap::new(),
            quantity: QuantityConfig::default(),
            merge: MergeConfig::default(),
            confidence: ConfidenceConfig::default(),
            parallel_mergers: false,
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            correspondence: 1.0,
            existing_profile: 0.9,
            free_text: 0.85,
            repository: 0.7,
            article: 0.65,
            default_weight: 0.5,
        }
    }
}

impl Default for QuantityConfig {
    fn default() -> Self {
        Self {
            low_threshold: 500,
            high_threshold: 1500,
            low_factor: 0.5,
            mid_factor: 1.0,
            high_factor: 1.5,
            missing_word_count: 500,
            zero_word_count: 100,
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            vocabulary_cap: 4,
            avoidance_cap: 3,
            avoidance_share_threshold: 0.5,
            avoidance_weight_fallback: 0.6,
        }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            ceiling: 0.95,
            default_confidence: 0.30,
            distinct_types_bonus: 0.03,
            redundancy_bonus: 0.03,
            advanced_analysis_bonus: 0.02,
            bonus_cap: 0.08,
            duplicate_ratio_threshold: 0.70,
            duplicate_penalty: 0.5,
            diversity_penalty: 0.7,
            diversity_bands: vec![
                DiversityBand { below_words: 500, minimum: 0.40 },
                DiversityBand { below_words: 1500, minimum: 0.30 },
                DiversityBand { below_words: 5000, minimum: 0.20 },
            ],
            diversity_floor: 0.12,
        }
    }
}

impl FusionConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading fusion config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing fusion config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $STYLE_FUSION_CONFIG_PATH
    /// 2) config/fusion.toml
    /// 3) config/fusion.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_FUSION_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_FUSION_CONFIG_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from(DEFAULT_FUSION_CONFIG_TOML);
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_FUSION_CONFIG_JSON);
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    /// Clamp out-of-range values into something the engine can always work with.
    pub fn sanitized(mut self) -> Self {
        let q = &mut self.quality;
        for w in [
            &mut q.correspondence,
            &mut q.existing_profile,
            &mut q.free_text,
            &mut q.repository,
            &mut q.article,
            &mut q.default_weight,
        ] {
            *w = non_negative(*w);
        }

        let qt = &mut self.quantity;
        if qt.low_threshold > qt.high_threshold {
            // swap to keep a valid interval
            std::mem::swap(&mut qt.low_threshold, &mut qt.high_threshold);
        }
        for f in [&mut qt.low_factor, &mut qt.mid_factor, &mut qt.high_factor] {
            *f = non_negative(*f);
        }
        if qt.zero_word_count == 0 {
            qt.zero_word_count = QuantityConfig::default().zero_word_count;
        }

        let m = &mut self.merge;
        m.vocabulary_cap = m.vocabulary_cap.max(1);
        m.avoidance_cap = m.avoidance_cap.max(1);
        if !(0.0..=1.0).contains(&m.avoidance_share_threshold) {
            m.avoidance_share_threshold = MergeConfig::default().avoidance_share_threshold;
        }
        m.avoidance_weight_fallback = non_negative(m.avoidance_weight_fallback);

        let c = &mut self.confidence;
        if !(0.0..=1.0).contains(&c.ceiling) {
            c.ceiling = ConfidenceConfig::default().ceiling;
        }
        c.default_confidence = finite_or(c.default_confidence, ConfidenceConfig::default().default_confidence)
            .clamp(0.0, c.ceiling);
        for b in [
            &mut c.distinct_types_bonus,
            &mut c.redundancy_bonus,
            &mut c.advanced_analysis_bonus,
            &mut c.bonus_cap,
        ] {
            *b = non_negative(*b);
        }
        let d = ConfidenceConfig::default();
        c.duplicate_penalty = finite_or(c.duplicate_penalty, d.duplicate_penalty).clamp(0.0, 1.0);
        c.diversity_penalty = finite_or(c.diversity_penalty, d.diversity_penalty).clamp(0.0, 1.0);
        c.diversity_bands.sort_by_key(|b| b.below_words);

        self
    }

    /// Resolve unrecognized source tags through configured aliases.
    pub fn resolve_source_type(&self, st: SourceType) -> SourceType {
        resolve_with_aliases(st, &self.aliases)
    }
}

fn non_negative(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

fn finite_or(x: f64, fallback: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        fallback
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<FusionConfig> {
    // JSON is tried first only when hinted; TOML otherwise.
    if hint_ext == "json" {
        return serde_json::from_str(s).context("invalid JSON fusion config");
    }
    match toml::from_str::<FusionConfig>(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!("unsupported fusion config format: {toml_err}")),
    }
}

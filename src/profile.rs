//! The merged style profile and the non-fatal warnings collected
//! while building it.
//!
//! The profile is the only thing the engine hands back. Values are plain
//! (downstream prompt construction reads them directly); who produced them is
//! kept separately in `attribution`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::assessment::{Attribute, Formality, SentenceLength, Tone};
use crate::attribution::Attribution;
use crate::merge::intersection::NONE_SENTINEL;
use crate::source_weights::SourceType;

/// Something the engine had to work around. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MergeWarning {
    /// Assessment excluded because required fields were missing or empty.
    #[serde(rename_all = "camelCase")]
    DroppedSource {
        source_type: SourceType,
        missing: Vec<Attribute>,
    },
    /// Categorical value outside its enumeration, replaced by the fallback.
    #[serde(rename_all = "camelCase")]
    CoercedValue {
        source_type: SourceType,
        attribute: Attribute,
        raw: String,
        coerced_to: String,
    },
}

impl MergeWarning {
    pub fn dropped(source_type: &SourceType, missing: Vec<Attribute>) -> Self {
        MergeWarning::DroppedSource {
            source_type: source_type.clone(),
            missing,
        }
    }

    pub fn coerced(source_type: &SourceType, attribute: Attribute, raw: &str, coerced_to: &str) -> Self {
        MergeWarning::CoercedValue {
            source_type: source_type.clone(),
            attribute,
            raw: raw.to_string(),
            coerced_to: coerced_to.to_string(),
        }
    }
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeWarning::DroppedSource { source_type, missing } => {
                let names: Vec<&str> = missing.iter().map(|a| a.as_str()).collect();
                write!(f, "dropped {source_type}: missing {}", names.join(", "))
            }
            MergeWarning::CoercedValue {
                source_type,
                attribute,
                raw,
                coerced_to,
            } => write!(f, "{source_type}: {attribute} \"{raw}\" read as \"{coerced_to}\""),
        }
    }
}

/// Fused writing-style profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedProfile {
    pub tone: Tone,
    pub formality: Formality,
    pub sentence_length: SentenceLength,
    pub vocabulary: Vec<String>,
    pub avoidance: Vec<String>,
    /// attribute → contributing sources.
    pub attribution: Attribution,
    /// In [0.0, ceiling], two decimals.
    pub confidence: f64,
    pub sources_used: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<MergeWarning>,
}

impl MergedProfile {
    /// Neutral profile returned when no source survives validation.
    pub fn degraded(confidence: f64) -> Self {
        Self {
            tone: Tone::Neutral,
            formality: Formality::Balanced,
            sentence_length: SentenceLength::Medium,
            vocabulary: Vec::new(),
            avoidance: vec![NONE_SENTINEL.to_string()],
            attribution: Attribution::new(),
            confidence,
            sources_used: 0,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<MergeWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.sources_used == 0
    }
}

impl Default for MergedProfile {
    fn default() -> Self {
        Self::degraded(0.30)
    }
}

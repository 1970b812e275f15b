// src/lib.rs
// Public library surface: the fusion engine and the types it speaks.

pub mod assessment;
pub mod attribution;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod merge;
pub mod profile;
pub mod signals;
pub mod source_weights;

// ---- Re-exports for stable public API ----
pub use crate::assessment::{Attribute, Formality, SentenceLength, SourceAssessment, SourceSignals, Tone};
pub use crate::attribution::{Attribution, AttributionEntry};
pub use crate::confidence::QualitySignals;
pub use crate::config::FusionConfig;
pub use crate::engine::{merge_profile, merge_profile_async, merge_profile_with};
pub use crate::merge::{Contribution, TermContribution};
pub use crate::profile::{MergeWarning, MergedProfile};
pub use crate::source_weights::SourceType;

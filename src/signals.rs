//! Text-quality detectors that produce the per-source `SourceSignals`.
//!
//! These run on the producer side, next to whatever turns raw text into an
//! assessment. The fusion engine itself only reads the resulting numbers.
//!
//! - duplicate sentences: a sentence counts as a duplicate if its normalized
//!   Levenshtein similarity to any of the last `window` sentences is at least
//!   `similarity_threshold`
//! - vocabulary diversity: distinct tokens / total tokens (type-token ratio)

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashSet, VecDeque};

use crate::assessment::SourceSignals;

static SENTENCE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)|\n+").expect("sentence split regex"));
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w+\b").expect("tokenizer regex"));

/// Configuration for duplicate detection.
#[derive(Clone, Debug)]
pub struct DuplicateParams {
    /// How many earlier sentences each sentence is compared against.
    pub window: usize,
    /// Similarity in [0.0, 1.0]. Pairs >= this threshold are duplicates.
    pub similarity_threshold: f64,
}

impl Default for DuplicateParams {
    fn default() -> Self {
        Self {
            window: 128,
            similarity_threshold: 0.90,
        }
    }
}

/// Split into normalized, non-empty sentences.
pub fn sentences(text: &str) -> Vec<String> {
    SENTENCE_SPLIT
        .split(text)
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Fraction of sentences that near-duplicate an earlier one. 0.0 for empty text.
pub fn duplicate_sentence_ratio(text: &str, params: &DuplicateParams) -> f64 {
    let all = sentences(text);
    if all.is_empty() {
        return 0.0;
    }
    let window = params.window.max(1);
    let threshold = params.similarity_threshold.clamp(0.0, 1.0);

    let mut recent: VecDeque<&str> = VecDeque::with_capacity(window);
    let mut dups = 0usize;
    for s in &all {
        let is_dup = recent
            .iter()
            .rev()
            .any(|prev| *prev == s.as_str() || strsim::normalized_levenshtein(prev, s) >= threshold);
        if is_dup {
            dups += 1;
        }
        if recent.len() == window {
            recent.pop_front();
        }
        recent.push_back(s.as_str());
    }
    dups as f64 / all.len() as f64
}

/// Type-token ratio over lowercase word tokens. `None` when there are no tokens.
pub fn vocabulary_diversity(text: &str) -> Option<f64> {
    let mut total = 0usize;
    let mut distinct = HashSet::new();
    for m in TOKEN.find_iter(text) {
        total += 1;
        distinct.insert(m.as_str().to_lowercase());
    }
    (total > 0).then(|| distinct.len() as f64 / total as f64)
}

impl SourceSignals {
    /// Run both detectors with default parameters.
    pub fn from_text(text: &str) -> Self {
        let has_sentences = !sentences(text).is_empty();
        Self {
            duplicate_sentence_ratio: has_sentences
                .then(|| duplicate_sentence_ratio(text, &DuplicateParams::default())),
            vocabulary_diversity: vocabulary_diversity(text),
        }
    }
}

/// Lowercase and collapse whitespace.
fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

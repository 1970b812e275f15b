//! Per-source style assessments as handed over by the upstream analyzer,
//! plus the closed categorical types they are coerced into.
//!
//! Raw categorical fields stay `String` on the wire; the mergers coerce them
//! through [`Category::coerce`] so unrecognized values never pass through silently.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::source_weights::SourceType;

/// Style attribute identity, used for validation reports and attribution keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Tone,
    Formality,
    SentenceLength,
    Vocabulary,
    Avoidance,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Tone,
        Attribute::Formality,
        Attribute::SentenceLength,
        Attribute::Vocabulary,
        Attribute::Avoidance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Tone => "tone",
            Attribute::Formality => "formality",
            Attribute::SentenceLength => "sentenceLength",
            Attribute::Vocabulary => "vocabulary",
            Attribute::Avoidance => "avoidance",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A small closed enumeration with a documented fallback value.
pub trait Category: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const ATTRIBUTE: Attribute;
    /// Substituted for any value outside the enumeration.
    const FALLBACK: Self;

    fn parse(raw: &str) -> Option<Self>;
    fn as_str(self) -> &'static str;

    /// Parse or fall back. The flag is `true` when a substitution happened.
    fn coerce(raw: &str) -> (Self, bool) {
        match Self::parse(raw) {
            Some(v) => (v, false),
            None => (Self::FALLBACK, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Conversational,
    Professional,
    Neutral,
}

impl Category for Tone {
    const ATTRIBUTE: Attribute = Attribute::Tone;
    const FALLBACK: Self = Tone::Neutral;

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "conversational" => Some(Tone::Conversational),
            "professional" => Some(Tone::Professional),
            "neutral" => Some(Tone::Neutral),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Tone::Conversational => "conversational",
            Tone::Professional => "professional",
            Tone::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Casual,
    Balanced,
    Formal,
}

impl Formality {
    /// Position on the casual(0) → formal(2) axis.
    pub fn score(self) -> f64 {
        match self {
            Formality::Casual => 0.0,
            Formality::Balanced => 1.0,
            Formality::Formal => 2.0,
        }
    }

    /// Map a weighted mean back to a category: `<0.5` casual, `[0.5, 1.5]` balanced,
    /// `>1.5` formal.
    pub fn from_mean(mean: f64) -> Self {
        const EPS: f64 = 1e-9;
        if mean < 0.5 - EPS {
            Formality::Casual
        } else if mean > 1.5 + EPS {
            Formality::Formal
        } else {
            Formality::Balanced
        }
    }
}

impl Category for Formality {
    const ATTRIBUTE: Attribute = Attribute::Formality;
    const FALLBACK: Self = Formality::Balanced;

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "casual" => Some(Formality::Casual),
            "balanced" => Some(Formality::Balanced),
            "formal" => Some(Formality::Formal),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Formality::Casual => "casual",
            Formality::Balanced => "balanced",
            Formality::Formal => "formal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentenceLength {
    Short,
    Medium,
    Long,
}

impl Category for SentenceLength {
    const ATTRIBUTE: Attribute = Attribute::SentenceLength;
    const FALLBACK: Self = SentenceLength::Medium;

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "short" => Some(SentenceLength::Short),
            "medium" => Some(SentenceLength::Medium),
            "long" => Some(SentenceLength::Long),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SentenceLength::Short => "short",
            SentenceLength::Medium => "medium",
            SentenceLength::Long => "long",
        }
    }
}

/// Quality signals computed by external detectors over one source's raw text.
/// Consumed only by the confidence penalties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSignals {
    /// Fraction of sentences that duplicate an earlier one, in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_sentence_ratio: Option<f64>,
    /// Distinct tokens / total tokens, in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary_diversity: Option<f64>,
}

/// One source's already-computed style signal, exactly as produced upstream.
/// Every style field is optional on the wire; [`SourceAssessment::validate`]
/// decides whether the source takes part in a merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAssessment {
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub word_count: Option<u64>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub formality: Option<String>,
    #[serde(default)]
    pub sentence_length: Option<String>,
    #[serde(default)]
    pub vocabulary: Option<Vec<String>>,
    #[serde(default)]
    pub avoidance: Option<Vec<String>>,
    #[serde(default)]
    pub signals: SourceSignals,
}

/// Borrowed view of an assessment that passed validation.
#[derive(Debug, Clone)]
pub struct ValidAssessment<'a> {
    pub source_type: SourceType,
    pub word_count: Option<u64>,
    pub tone: &'a str,
    pub formality: &'a str,
    pub sentence_length: &'a str,
    pub vocabulary: &'a [String],
    pub avoidance: &'a [String],
    pub signals: SourceSignals,
}

impl SourceAssessment {
    pub fn new(source_type: impl Into<SourceType>) -> Self {
        Self {
            source_type: source_type.into(),
            ..Self::default()
        }
    }

    pub fn words(mut self, n: u64) -> Self {
        self.word_count = Some(n);
        self
    }

    pub fn tone(mut self, v: impl Into<String>) -> Self {
        self.tone = Some(v.into());
        self
    }

    pub fn formality(mut self, v: impl Into<String>) -> Self {
        self.formality = Some(v.into());
        self
    }

    pub fn sentence_length(mut self, v: impl Into<String>) -> Self {
        self.sentence_length = Some(v.into());
        self
    }

    pub fn vocabulary<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = Some(terms.into_iter().map(Into::into).collect());
        self
    }

    pub fn avoidance<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avoidance = Some(terms.into_iter().map(Into::into).collect());
        self
    }

    pub fn signals(mut self, signals: SourceSignals) -> Self {
        self.signals = signals;
        self
    }

    /// Check that all five style fields are present and non-empty.
    /// On failure returns the missing attributes in declaration order.
    pub fn validate(&self) -> Result<ValidAssessment<'_>, Vec<Attribute>> {
        fn text(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }
        fn list(v: &Option<Vec<String>>) -> Option<&[String]> {
            v.as_deref().filter(|l| l.iter().any(|t| !t.trim().is_empty()))
        }

        let tone = text(&self.tone);
        let formality = text(&self.formality);
        let sentence_length = text(&self.sentence_length);
        let vocabulary = list(&self.vocabulary);
        let avoidance = list(&self.avoidance);

        match (tone, formality, sentence_length, vocabulary, avoidance) {
            (Some(tone), Some(formality), Some(sentence_length), Some(vocabulary), Some(avoidance)) => {
                Ok(ValidAssessment {
                    source_type: self.source_type.clone(),
                    word_count: self.word_count,
                    tone,
                    formality,
                    sentence_length,
                    vocabulary,
                    avoidance,
                    signals: self.signals,
                })
            }
            _ => {
                let present = [
                    tone.is_some(),
                    formality.is_some(),
                    sentence_length.is_some(),
                    vocabulary.is_some(),
                    avoidance.is_some(),
                ];
                Err(Attribute::ALL
                    .into_iter()
                    .zip(present)
                    .filter_map(|(attr, ok)| (!ok).then_some(attr))
                    .collect())
            }
        }
    }
}

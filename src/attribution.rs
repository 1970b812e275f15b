//! Attribution assembly: gathers the per-merger contribution breakdowns into
//! one map keyed by attribute name. Pure packaging, no arithmetic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::assessment::Attribute;
use crate::merge::{AttributeMerges, Contribution, TermContribution};

/// Breakdown for one attribute. Categorical attributes list sources directly;
/// set-valued attributes list sources per returned term.
///
/// Tagged on the wire so an empty breakdown keeps its shape through a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "camelCase")]
pub enum AttributionEntry {
    Sources(Vec<Contribution>),
    Terms(Vec<TermContribution>),
}

impl AttributionEntry {
    /// Source contributions, whether listed directly or per term.
    pub fn contributions(&self) -> Box<dyn Iterator<Item = &Contribution> + '_> {
        match self {
            AttributionEntry::Sources(c) => Box::new(c.iter()),
            AttributionEntry::Terms(t) => Box::new(t.iter().flat_map(|t| t.contributions.iter())),
        }
    }
}

pub type Attribution = BTreeMap<Attribute, AttributionEntry>;

/// Build the attribution map from the five merger outputs.
pub fn assemble(merges: &AttributeMerges) -> Attribution {
    let mut out = Attribution::new();
    out.insert(
        Attribute::Tone,
        AttributionEntry::Sources(merges.tone.contributions.clone()),
    );
    out.insert(
        Attribute::Formality,
        AttributionEntry::Sources(merges.formality.contributions.clone()),
    );
    out.insert(
        Attribute::SentenceLength,
        AttributionEntry::Sources(merges.sentence_length.contributions.clone()),
    );
    out.insert(
        Attribute::Vocabulary,
        AttributionEntry::Terms(merges.vocabulary.contributions.clone()),
    );
    out.insert(
        Attribute::Avoidance,
        AttributionEntry::Terms(merges.avoidance.contributions.clone()),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergeConfig;
    use crate::merge::merge_sequential;
    use crate::merge::test_support::{assessment, weighted};
    use serde_json::json;

    #[test]
    fn keys_every_attribute_and_serializes_flat() {
        let a = assessment("CorrespondenceSource")
            .vocabulary(["cheers"])
            .avoidance(["emojis"]);
        let s = vec![weighted(&a, 1.0)];
        let attr = assemble(&merge_sequential(&s, &MergeConfig::default()));
        assert_eq!(attr.len(), 5);

        let v = serde_json::to_value(&attr).unwrap();
        assert_eq!(
            v["tone"],
            json!({"kind": "sources", "entries": [{"sourceType": "CorrespondenceSource", "percentage": 100}]})
        );
        assert_eq!(
            v["vocabulary"],
            json!({
                "kind": "terms",
                "entries": [{"term": "cheers", "contributions": [{"sourceType": "CorrespondenceSource", "percentage": 100}]}]
            })
        );
        assert!(v.get("sentenceLength").is_some());
    }

    #[test]
    fn empty_term_breakdown_keeps_its_kind() {
        // avoidance fell back to ["none"], so no term carries contributions
        let a = assessment("CorrespondenceSource");
        let s = vec![weighted(&a, 1.0)];
        let attr = assemble(&merge_sequential(&s, &MergeConfig::default()));
        assert_eq!(attr[&Attribute::Avoidance], AttributionEntry::Terms(Vec::new()));

        let v = serde_json::to_value(&attr).unwrap();
        assert_eq!(v["avoidance"], json!({"kind": "terms", "entries": []}));
        let back: Attribution = serde_json::from_value(v).unwrap();
        assert_eq!(back, attr);
    }

    #[test]
    fn contributions_flatten_terms() {
        let entry = AttributionEntry::Terms(vec![
            TermContribution {
                term: "a".into(),
                contributions: vec![Contribution {
                    source_type: crate::source_weights::SourceType::Article,
                    percentage: 100,
                }],
            },
            TermContribution {
                term: "b".into(),
                contributions: Vec::new(),
            },
        ]);
        assert_eq!(entry.contributions().count(), 1);
    }
}

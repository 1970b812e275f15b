//! Weighted union for signature vocabulary.
//!
//! score(term) = Σ normalized weight of every source listing the term.
//! Terms must match byte-for-byte. Output is the top `cap` terms by score,
//! ties resolved by first appearance across sources in input order.

use std::collections::HashMap;

use super::{percent, score_key, Contribution, MergedAttribute, SetAttribute, TermContribution};
use crate::source_weights::WeightedSource;

/// Accumulated evidence for one term. Shared with the intersection merger.
#[derive(Debug)]
pub(crate) struct TermScore<'a> {
    pub term: &'a str,
    pub score: f64,
    pub first_seen: usize,
    /// `(source index, weight)` in input order; one entry per source.
    pub contributors: Vec<(usize, f64)>,
}

/// Collect per-term scores over `terms_of(source)`, skipping terms rejected
/// by `keep` and repeated listings within one source.
pub(crate) fn collect_terms<'a, F, K>(sources: &[WeightedSource<'a>], terms_of: F, keep: K) -> Vec<TermScore<'a>>
where
    F: Fn(&WeightedSource<'a>) -> &'a [String],
    K: Fn(&str) -> bool,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut scores: Vec<TermScore<'a>> = Vec::new();

    for (src_idx, ws) in sources.iter().enumerate() {
        for term in terms_of(ws) {
            let term = term.as_str();
            if term.trim().is_empty() || !keep(term) {
                continue;
            }
            match index.get(term) {
                Some(&i) => {
                    let ts = &mut scores[i];
                    if ts.contributors.last().map(|&(s, _)| s) == Some(src_idx) {
                        continue;
                    }
                    ts.score += ws.normalized_weight;
                    ts.contributors.push((src_idx, ws.normalized_weight));
                }
                None => {
                    index.insert(term, scores.len());
                    let first_seen = scores.len();
                    scores.push(TermScore {
                        term,
                        score: ws.normalized_weight,
                        first_seen,
                        contributors: vec![(src_idx, ws.normalized_weight)],
                    });
                }
            }
        }
    }
    scores
}

/// Sort by descending score, then first appearance.
pub(crate) fn rank(scores: &mut [TermScore<'_>]) {
    scores.sort_by_key(|t| (std::cmp::Reverse(score_key(t.score)), t.first_seen));
}

/// Turn ranked term scores into a set attribute.
pub(crate) fn into_attribute(sources: &[WeightedSource<'_>], selected: &[TermScore<'_>]) -> SetAttribute {
    MergedAttribute {
        value: selected.iter().map(|t| t.term.to_string()).collect(),
        contributions: selected
            .iter()
            .map(|t| TermContribution {
                term: t.term.to_string(),
                contributions: t
                    .contributors
                    .iter()
                    .map(|&(i, w)| Contribution {
                        source_type: sources[i].source.source_type.clone(),
                        percentage: percent(w, t.score),
                    })
                    .collect(),
            })
            .collect(),
        warnings: Vec::new(),
    }
}

pub fn weighted_union(sources: &[WeightedSource<'_>], cap: usize) -> SetAttribute {
    let mut scores = collect_terms(sources, |ws| ws.source.vocabulary, |_| true);
    rank(&mut scores);
    scores.truncate(cap);
    into_attribute(sources, &scores)
}

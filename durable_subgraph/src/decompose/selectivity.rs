use std::cmp::Ordering;

use serde::Serialize;

use crate::graph_index::{GraphIndex, LabelId};
use crate::query::QueryGraph;

/// Selectivity inputs and score of one query label.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: LabelId,
    pub name: String,
    /// Data vertices carrying the label.
    pub candidates: usize,
    /// Distinct neighbor labels in the query.
    pub degree: usize,
    /// `candidates / degree`; infinite when either is zero.
    pub selectivity: f64,
}

impl LabelScore {
    pub const fn is_viable(&self) -> bool {
        self.candidates > 0 && self.degree > 0
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn score_labels(query: &QueryGraph, index: &GraphIndex) -> Vec<LabelScore> {
    query
        .vertices()
        .iter()
        .map(|&label| {
            let candidates = index.candidate_count(label);
            let degree = query.degree(label);
            let selectivity = if candidates == 0 || degree == 0 {
                f64::INFINITY
            } else {
                candidates as f64 / degree as f64
            };
            LabelScore {
                label,
                name: query.name(label).to_string(),
                candidates,
                degree,
                selectivity,
            }
        })
        .collect()
}

/// Most selective first: lower score, then fewer candidates, then label name.
pub fn by_selectivity(a: &LabelScore, b: &LabelScore) -> Ordering {
    a.selectivity
        .total_cmp(&b.selectivity)
        .then(a.candidates.cmp(&b.candidates))
        .then_with(|| a.name.cmp(&b.name))
}

/// The most selective viable label.
pub fn choose_root(scores: &[LabelScore]) -> Option<&LabelScore> {
    scores
        .iter()
        .filter(|s| s.is_viable())
        .min_by(|a, b| by_selectivity(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(name: &str, candidates: usize, degree: usize, selectivity: f64) -> LabelScore {
        LabelScore {
            label: crate::graph_index::LabelTable::new().intern(name),
            name: name.to_string(),
            candidates,
            degree,
            selectivity,
        }
    }

    #[test]
    fn ties_fall_back_to_candidates_then_name() {
        let scores = vec![
            score("C", 4, 2, 2.0),
            score("B", 2, 1, 2.0),
            score("A", 2, 1, 2.0),
        ];
        assert_eq!(choose_root(&scores).map(|s| s.name.as_str()), Some("A"));
    }

    #[test]
    fn labels_without_candidates_are_not_roots() {
        let scores = vec![score("A", 0, 3, f64::INFINITY), score("B", 9, 1, 9.0)];
        assert_eq!(choose_root(&scores).map(|s| s.name.as_str()), Some("B"));
        assert!(choose_root(&scores[..1]).is_none());
    }
}

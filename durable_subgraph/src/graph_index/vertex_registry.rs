use std::collections::{HashMap, HashSet};

use durable_common::VertexId;

use super::{Adjacency, LabelId};

/// Per-vertex facts used by the admission tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexInfo {
    pub label: Option<LabelId>,
    /// Distinct neighbors, both directions.
    pub degree: usize,
    /// Distinct labels among the neighbors.
    pub neighbor_labels: usize,
    /// Distinct timestamps over all incident edges.
    pub duration: usize,
}

#[derive(Clone, Debug, Default)]
pub struct VertexRegistry {
    info: HashMap<VertexId, VertexInfo>,
    by_label: HashMap<LabelId, Vec<VertexId>>,
    unlabeled: usize,
}

impl VertexRegistry {
    pub fn build(adjacency: &Adjacency, label_of: &HashMap<VertexId, LabelId>) -> Self {
        let mut info: HashMap<VertexId, VertexInfo> = HashMap::new();
        let mut by_label: HashMap<LabelId, Vec<VertexId>> = HashMap::new();
        let mut unlabeled = 0;

        for v in adjacency.vertices() {
            let neighbors = adjacency.neighbors(v);
            let neighbor_labels: HashSet<LabelId> = neighbors
                .iter()
                .filter_map(|w| label_of.get(w).copied())
                .collect();
            let timestamps: HashSet<u64> = neighbors
                .iter()
                .filter_map(|&w| adjacency.between(v, w))
                .flat_map(|ts| ts.iter())
                .collect();

            let label = label_of.get(&v).copied();
            match label {
                Some(l) => by_label.entry(l).or_default().push(v),
                None => unlabeled += 1,
            }
            info.insert(
                v,
                VertexInfo {
                    label,
                    degree: neighbors.len(),
                    neighbor_labels: neighbor_labels.len(),
                    duration: timestamps.len(),
                },
            );
        }

        for vs in by_label.values_mut() {
            vs.sort_unstable();
        }

        Self {
            info,
            by_label,
            unlabeled,
        }
    }

    pub fn get(&self, v: VertexId) -> Option<&VertexInfo> {
        self.info.get(&v)
    }

    pub fn of_label(&self, label: LabelId) -> &[VertexId] {
        self.by_label.get(&label).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    pub const fn unlabeled(&self) -> usize {
        self.unlabeled
    }
}

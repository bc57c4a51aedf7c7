use std::collections::{BTreeSet, HashMap};

use durable_common::{EdgeRow, Timestamp, VertexId};
use tracing::debug;

use super::LabelId;
use crate::timestamps::TimestampSet;

/// Undirected neighbor lists, partitioned by neighbor label, plus the
/// timestamp set of every edge.
#[derive(Clone, Debug, Default)]
pub struct Adjacency {
    /// All distinct neighbors, sorted.
    neighbors: HashMap<VertexId, Vec<VertexId>>,
    /// Neighbors of a vertex carrying one label, sorted.
    by_label: HashMap<(VertexId, LabelId), Vec<VertexId>>,
    /// Observations of `(u, v)` exactly as given.
    directed: HashMap<(VertexId, VertexId), TimestampSet>,
    /// Union of both directions, keyed by `(min, max)`.
    undirected: HashMap<(VertexId, VertexId), TimestampSet>,
    /// Rows dropped because `u == v`.
    self_loops: usize,
}

const fn undirected_key(u: VertexId, v: VertexId) -> (VertexId, VertexId) {
    if u <= v { (u, v) } else { (v, u) }
}

impl Adjacency {
    pub fn build(rows: &[EdgeRow], label_of: &HashMap<VertexId, LabelId>) -> Self {
        let mut raw: HashMap<(VertexId, VertexId), Vec<Timestamp>> = HashMap::new();
        let mut self_loops = 0;
        for row in rows {
            if row.u == row.v {
                self_loops += 1;
                continue;
            }
            raw.entry((row.u, row.v)).or_default().push(row.t);
        }

        let directed: HashMap<(VertexId, VertexId), TimestampSet> = raw
            .into_iter()
            .map(|(key, ts)| (key, TimestampSet::from_unsorted(ts)))
            .collect();

        let mut undirected: HashMap<(VertexId, VertexId), TimestampSet> = HashMap::new();
        let mut neighbor_sets: HashMap<VertexId, BTreeSet<VertexId>> = HashMap::new();
        for (&(u, v), ts) in &directed {
            let slot = undirected.entry(undirected_key(u, v)).or_default();
            *slot = slot.union(ts);
            neighbor_sets.entry(u).or_default().insert(v);
            neighbor_sets.entry(v).or_default().insert(u);
        }

        let mut by_label: HashMap<(VertexId, LabelId), Vec<VertexId>> = HashMap::new();
        for (&u, ns) in &neighbor_sets {
            for &w in ns {
                if let Some(&label) = label_of.get(&w) {
                    by_label.entry((u, label)).or_default().push(w);
                }
            }
        }

        let neighbors = neighbor_sets
            .into_iter()
            .map(|(u, ns)| (u, ns.into_iter().collect()))
            .collect();

        debug!(
            "adjacency: {} directed edges, {} undirected edges, {} self loops dropped",
            directed.len(),
            undirected.len(),
            self_loops
        );

        Self {
            neighbors,
            by_label,
            directed,
            undirected,
            self_loops,
        }
    }

    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        self.neighbors.get(&v).map_or(&[], Vec::as_slice)
    }

    pub fn neighbors_with_label(&self, v: VertexId, label: LabelId) -> &[VertexId] {
        self.by_label.get(&(v, label)).map_or(&[], Vec::as_slice)
    }

    pub fn between(&self, u: VertexId, v: VertexId) -> Option<&TimestampSet> {
        self.undirected.get(&undirected_key(u, v))
    }

    pub fn directed(&self, u: VertexId, v: VertexId) -> Option<&TimestampSet> {
        self.directed.get(&(u, v))
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.neighbors.keys().copied()
    }

    pub fn directed_edge_count(&self) -> usize {
        self.directed.len()
    }

    pub fn undirected_edge_count(&self) -> usize {
        self.undirected.len()
    }

    pub const fn self_loops(&self) -> usize {
        self.self_loops
    }
}

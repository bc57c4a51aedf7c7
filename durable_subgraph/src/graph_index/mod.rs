//! Immutable index over the labeled temporal data graph.

mod adjacency;
mod label_table;
mod vertex_registry;

pub use adjacency::Adjacency;
pub use label_table::{LabelId, LabelTable};
pub use vertex_registry::{VertexInfo, VertexRegistry};

use std::collections::HashMap;

use durable_common::{EdgeRow, VertexId};
use serde::Serialize;
use tracing::{info, warn};

use crate::profiling::Timer;
use crate::timestamps::TimestampSet;

/// Counters describing what went into the index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub rows: usize,
    pub vertices: usize,
    pub directed_edges: usize,
    pub undirected_edges: usize,
    pub self_loops: usize,
    pub unlabeled_vertices: usize,
    pub labels: usize,
}

#[derive(Clone, Debug)]
pub struct GraphIndex {
    labels: LabelTable,
    registry: VertexRegistry,
    adjacency: Adjacency,
    stats: IndexStats,
}

impl GraphIndex {
    /// Build the index from raw rows and vertex labels.
    ///
    /// Repeated rows collapse into one timestamp. Self loops are dropped.
    /// Vertices without a label keep their edges but are never candidates.
    /// When a vertex is labeled more than once the first label wins.
    pub fn build(rows: &[EdgeRow], vertex_labels: &[(VertexId, String)]) -> Self {
        // 1. Intern labels
        let mut labels = LabelTable::new();
        let mut label_of: HashMap<VertexId, LabelId> = HashMap::with_capacity(vertex_labels.len());
        for (v, name) in vertex_labels {
            let id = labels.intern(name);
            label_of.entry(*v).or_insert(id);
        }

        // 2. Edges and per-edge timestamps
        let adjacency = Adjacency::build(rows, &label_of);

        // 3. Per-vertex facts and the label partition
        let registry = VertexRegistry::build(&adjacency, &label_of);

        let stats = IndexStats {
            rows: rows.len(),
            vertices: registry.len(),
            directed_edges: adjacency.directed_edge_count(),
            undirected_edges: adjacency.undirected_edge_count(),
            self_loops: adjacency.self_loops(),
            unlabeled_vertices: registry.unlabeled(),
            labels: labels.len(),
        };
        if stats.self_loops > 0 {
            warn!("data graph: skipped {} self-loop rows", stats.self_loops);
        }
        if stats.unlabeled_vertices > 0 {
            warn!(
                "data graph: {} vertices have no label and will never match",
                stats.unlabeled_vertices
            );
        }
        info!(
            "data graph: {} vertices, {} edges ({} directed), {} labels",
            stats.vertices, stats.undirected_edges, stats.directed_edges, stats.labels
        );

        Self {
            labels,
            registry,
            adjacency,
            stats,
        }
    }

    pub const fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub const fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn vertex_count(&self) -> usize {
        self.registry.len()
    }

    // Delegate to vertex registry
    pub fn vertex(&self, v: VertexId) -> Option<&VertexInfo> {
        self.registry.get(v)
    }

    pub fn label_of(&self, v: VertexId) -> Option<LabelId> {
        self.registry.get(v).and_then(|i| i.label)
    }

    /// Sorted data vertices carrying `label`.
    pub fn vertices_with_label(&self, label: LabelId) -> &[VertexId] {
        self.registry.of_label(label)
    }

    pub fn candidate_count(&self, label: LabelId) -> usize {
        self.registry.of_label(label).len()
    }

    pub fn duration(&self, v: VertexId) -> usize {
        self.registry.get(v).map_or(0, |i| i.duration)
    }

    // Delegate to adjacency
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        self.adjacency.neighbors(v)
    }

    /// Sorted neighbors of `v` (either direction) carrying `label`.
    pub fn neighbors_with_label(&self, v: VertexId, label: LabelId) -> &[VertexId] {
        let _t = Timer::new("GraphIndex::neighbors_with_label");
        self.adjacency.neighbors_with_label(v, label)
    }

    /// Timestamps at which `u` and `v` are adjacent in either direction.
    pub fn timestamps_between(&self, u: VertexId, v: VertexId) -> Option<&TimestampSet> {
        let _t = Timer::new("GraphIndex::timestamps_between");
        self.adjacency.between(u, v)
    }

    /// Timestamps of the directed observation `(u, v)` only.
    pub fn edge_timestamps(&self, u: VertexId, v: VertexId) -> Option<&TimestampSet> {
        self.adjacency.directed(u, v)
    }

    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.adjacency.between(u, v).is_some()
    }
}

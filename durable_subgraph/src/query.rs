//! The query graph: labels are vertex identities, edges are undirected.

use std::collections::{BTreeMap, BTreeSet};

use durable_common::QueryEdge;
use tracing::debug;

use crate::graph_index::{LabelId, LabelTable};

#[derive(Clone, Debug)]
pub struct QueryGraph {
    /// The data graph's table extended with labels only the query uses.
    labels: LabelTable,
    /// Query vertices ordered by label name.
    vertices: Vec<LabelId>,
    adjacency: BTreeMap<LabelId, BTreeSet<LabelId>>,
    /// Distinct edges as `(a, b)` in first-seen orientation.
    edges: Vec<(LabelId, LabelId)>,
}

impl QueryGraph {
    /// Build the query over `data_labels`.
    ///
    /// Self loops and repeated edges are ignored here; the file reader
    /// already reports them as input errors.
    pub fn build(edges: &[QueryEdge], data_labels: &LabelTable) -> Self {
        let mut labels = data_labels.clone();
        let mut adjacency: BTreeMap<LabelId, BTreeSet<LabelId>> = BTreeMap::new();
        let mut kept = Vec::with_capacity(edges.len());

        for edge in edges {
            if edge.a == edge.b {
                continue;
            }
            let a = labels.intern(&edge.a);
            let b = labels.intern(&edge.b);
            if adjacency.entry(a).or_default().insert(b) {
                adjacency.entry(b).or_default().insert(a);
                kept.push((a, b));
            }
        }

        let mut vertices: Vec<LabelId> = adjacency.keys().copied().collect();
        vertices.sort_by(|x, y| labels.name(*x).cmp(labels.name(*y)));

        debug!(
            "query graph: {} labels, {} edges",
            vertices.len(),
            kept.len()
        );

        Self {
            labels,
            vertices,
            adjacency,
            edges: kept,
        }
    }

    pub const fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn name(&self, label: LabelId) -> &str {
        self.labels.name(label)
    }

    pub fn vertices(&self) -> &[LabelId] {
        &self.vertices
    }

    pub fn contains(&self, label: LabelId) -> bool {
        self.adjacency.contains_key(&label)
    }

    pub fn neighbors(&self, label: LabelId) -> impl Iterator<Item = LabelId> + '_ {
        self.adjacency.get(&label).into_iter().flatten().copied()
    }

    /// Number of distinct neighbor labels.
    pub fn degree(&self, label: LabelId) -> usize {
        self.adjacency.get(&label).map_or(0, BTreeSet::len)
    }

    pub fn has_edge(&self, a: LabelId, b: LabelId) -> bool {
        self.adjacency.get(&a).is_some_and(|ns| ns.contains(&b))
    }

    pub fn edges(&self) -> &[(LabelId, LabelId)] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_and_reversed_edges_collapse() {
        let edges = vec![
            QueryEdge::new("B", "A"),
            QueryEdge::new("A", "B"),
            QueryEdge::new("C", "C"),
            QueryEdge::new("B", "C"),
        ];
        let q = QueryGraph::build(&edges, &LabelTable::new());
        assert_eq!(q.edges().len(), 2);
        let names: Vec<&str> = q.vertices().iter().map(|l| q.name(*l)).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        let b = q.labels().get("B").unwrap();
        assert_eq!(q.degree(b), 2);

        let a = q.labels().get("A").unwrap();
        let c = q.labels().get("C").unwrap();
        assert!(q.has_edge(a, b) && q.has_edge(b, a));
        assert!(!q.has_edge(a, c));
        assert!(!q.has_edge(c, c));
    }

    #[test]
    fn data_labels_keep_their_ids() {
        let mut data = LabelTable::new();
        let a = data.intern("A");
        let q = QueryGraph::build(&[QueryEdge::new("Z", "A")], &data);
        assert_eq!(q.labels().get("A"), Some(a));
        assert!(q.labels().get("Z").is_some());
    }
}

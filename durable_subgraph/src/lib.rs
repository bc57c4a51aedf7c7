//! Durable temporal subgraph matching.
//!
//! A run goes through five stages, each reading the previous one's output:
//! index the data graph, decompose the query into a rooted spanning tree,
//! grow the TD-tree of candidate blocks, trim it to a fixpoint, then
//! enumerate root-to-leaf paths and join them into matches whose edges
//! share at least `k` timestamps.

pub mod bloom;
pub mod decompose;
pub mod diagnostics;
pub mod enumerate;
pub mod graph_index;
pub mod join;
pub mod profiling;
pub mod query;
pub mod td_tree;
pub mod timestamps;

mod error;

use std::collections::BTreeMap;
use std::time::Instant;

use durable_common::{Config, EdgeRow, QueryEdge, VertexId};
use serde::Serialize;
use tracing::info;

pub use decompose::{Decomposition, NonTreeEdge, NonTreeKind, QueryTree, decompose};
pub use diagnostics::Diagnostics;
pub use error::DecompositionError;
pub use graph_index::{GraphIndex, LabelId};
pub use query::QueryGraph;
pub use td_tree::TdTree;
pub use timestamps::TimestampSet;

use crate::diagnostics::{NodeSummary, NonTreeSummary, StageTimings, millis, timed};
use crate::enumerate::PathSummary;

/// One durable occurrence of the query.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Match {
    /// Query label -> data vertex.
    pub assignment: BTreeMap<String, VertexId>,
    /// Timestamps shared by every matched edge; at least `k` of them.
    pub timestamps: TimestampSet,
}

impl Match {
    pub fn vertex(&self, label: &str) -> Option<VertexId> {
        self.assignment.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }
}

/// The matches of a run plus everything needed to report on it.
#[derive(Clone, Debug)]
pub struct MatchSet {
    pub matches: Vec<Match>,
    pub decomposition: Decomposition,
    pub diagnostics: Diagnostics,
}

impl MatchSet {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Read-only inputs shared by every stage of one run.
#[derive(Clone, Copy, Debug)]
pub struct MatchContext<'a> {
    pub index: &'a GraphIndex,
    pub query: &'a QueryGraph,
    pub tree: &'a QueryTree,
    pub config: &'a Config,
}

pub struct DurableMatcher;

impl DurableMatcher {
    /// Index `rows` and search for `query`.
    ///
    /// # Errors
    ///
    /// Fails only if the query cannot be decomposed.
    #[contracts::debug_requires(config.k >= 1, "the builder clamps k to at least 1")]
    pub fn search_all(
        rows: &[EdgeRow],
        vertex_labels: &[(VertexId, String)],
        query: &[QueryEdge],
        config: &Config,
    ) -> Result<MatchSet, DecompositionError> {
        let (index, index_ms) = timed(|| GraphIndex::build(rows, vertex_labels));
        let mut set = Self::search_with_index(&index, query, config)?;
        set.diagnostics.timings.index_ms = index_ms;
        set.diagnostics.timings.total_ms += index_ms;
        Ok(set)
    }

    /// Search for `query` in an already built index.
    ///
    /// # Errors
    ///
    /// Fails only if the query cannot be decomposed.
    #[contracts::debug_requires(config.k >= 1, "the builder clamps k to at least 1")]
    pub fn search_with_index(
        index: &GraphIndex,
        query: &[QueryEdge],
        config: &Config,
    ) -> Result<MatchSet, DecompositionError> {
        let start = Instant::now();
        let mut timings = StageTimings::default();

        let query = QueryGraph::build(query, index.labels());
        let (decomposition, decompose_ms) = timed(|| decompose(&query, index));
        let decomposition = decomposition?;
        timings.decompose_ms = decompose_ms;

        let ctx = MatchContext {
            index,
            query: &query,
            tree: &decomposition.tree,
            config,
        };
        let mut td = TdTree::new(ctx.tree, config, index.vertex_count());

        let (grow_stats, grow_ms) = timed(|| td_tree::grow(&ctx, &mut td));
        timings.grow_ms = grow_ms;
        let after_growth = td.candidate_counts();

        let mut diagnostics = Diagnostics {
            root: decomposition.root.name.clone(),
            root_selectivity: decomposition.root.selectivity,
            k: config.k,
            bloom_mode: config.bloom_mode,
            index: index.stats().clone(),
            non_tree_edges: decomposition
                .tree
                .non_tree_edges()
                .iter()
                .map(|e| NonTreeSummary {
                    upper: query.name(e.upper).to_string(),
                    lower: query.name(e.lower).to_string(),
                    kind: e.kind,
                })
                .collect(),
            grow: grow_stats,
            ..Diagnostics::default()
        };

        let mut matches = Vec::new();
        if td.is_empty() {
            info!("no root candidates survive growth; skipping trim and join");
        } else {
            let (trim_stats, trim_ms) = timed(|| td_tree::trim(&ctx, &mut td));
            diagnostics.trim = trim_stats;
            timings.trim_ms = trim_ms;

            if !td.is_empty() {
                let paths = decomposition.tree.root_to_leaf_paths();
                let (sets, enumerate_ms) =
                    timed(|| enumerate::enumerate_paths(&ctx, &td, &paths));
                timings.enumerate_ms = enumerate_ms;
                diagnostics.paths = sets
                    .iter()
                    .map(|s| PathSummary {
                        labels: s
                            .labels
                            .iter()
                            .map(|l| query.name(*l).to_string())
                            .collect(),
                        partial_matches: s.len(),
                    })
                    .collect();

                let (joined, join_ms) = timed(|| join::join_all(&ctx, sets));
                timings.join_ms = join_ms;
                matches = joined;
            }
        }

        diagnostics.nodes = NodeSummary::collect(&query, &td, &after_growth);
        diagnostics.matches = matches.len();
        timings.total_ms = millis(start.elapsed());
        diagnostics.timings = timings;
        diagnostics.capture_profile();

        info!(
            "search: {} matches in {:.3} ms",
            matches.len(),
            timings.total_ms
        );

        Ok(MatchSet {
            matches,
            decomposition,
            diagnostics,
        })
    }
}

//! Per-path partial match enumeration over a trimmed TD-tree.

use durable_common::VertexId;
use serde::Serialize;
use tracing::debug;

use crate::MatchContext;
use crate::graph_index::LabelId;
use crate::profiling::Timer;
use crate::td_tree::{NodeId, TdTree};
use crate::timestamps::TimestampSet;

/// An assignment of data vertices to a list of labels, with the timestamps
/// every covered edge shares.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartialMatch {
    /// Aligned with the owning [`PartialMatches::labels`].
    pub vertices: Vec<VertexId>,
    pub timestamps: TimestampSet,
}

/// All partial matches over one label list.
#[derive(Clone, Debug, Default)]
pub struct PartialMatches {
    pub labels: Vec<LabelId>,
    pub rows: Vec<PartialMatch>,
}

impl PartialMatches {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, label: LabelId) -> Option<usize> {
        self.labels.iter().position(|l| *l == label)
    }
}

/// Partial match counts per path, for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathSummary {
    pub labels: Vec<String>,
    pub partial_matches: usize,
}

/// Intersect `ts` with the edge `(u, v)`. `None` if the edge is missing.
pub(crate) fn extend_over_edge(
    ctx: &MatchContext<'_>,
    ts: Option<&TimestampSet>,
    u: VertexId,
    v: VertexId,
) -> Option<TimestampSet> {
    let edge = ctx.index.timestamps_between(u, v)?;
    Some(match ts {
        None => edge.clone(),
        Some(ts) => ts.intersect(edge),
    })
}

/// Enumerate every durable assignment of `path`, a root-to-leaf label path.
///
/// Non-tree edges with both endpoints on the path are checked exactly as
/// soon as their later endpoint is assigned.
pub fn enumerate_path(ctx: &MatchContext<'_>, td: &TdTree, path: &[LabelId]) -> PartialMatches {
    let _t = Timer::new("enumerate::path");
    let k = ctx.config.k;
    let nodes: Vec<NodeId> = path.iter().filter_map(|l| td.node_of(*l)).collect();
    let mut out = PartialMatches {
        labels: path.to_vec(),
        rows: Vec::new(),
    };
    if nodes.len() != path.len() || path.len() < 2 {
        return out;
    }

    // For each position, the earlier positions joined to it by a non-tree edge.
    let back_edges: Vec<Vec<usize>> = path
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            ctx.tree
                .non_tree_partners(label)
                .filter_map(|(p, _)| path[..i].iter().position(|l| *l == p))
                .collect()
        })
        .collect();

    for root in td.root().candidates() {
        let mut stack: Vec<(Vec<VertexId>, Option<TimestampSet>)> = vec![(vec![root], None)];
        while let Some((assigned, ts)) = stack.pop() {
            let depth = assigned.len();
            if depth == path.len() {
                if let Some(ts) = ts.filter(|ts| ts.len() >= k) {
                    out.rows.push(PartialMatch {
                        vertices: assigned,
                        timestamps: ts,
                    });
                }
                continue;
            }

            let parent = assigned[depth - 1];
            let Some(block) = td.block(nodes[depth], parent) else {
                continue;
            };
            'cells: for cell in block.cells() {
                let w = cell.vertex;
                let Some(mut next) = extend_over_edge(ctx, ts.as_ref(), parent, w) else {
                    continue;
                };
                for &j in &back_edges[depth] {
                    match extend_over_edge(ctx, Some(&next), assigned[j], w) {
                        Some(narrowed) => next = narrowed,
                        None => continue 'cells,
                    }
                }
                if next.len() < k {
                    continue;
                }
                let mut extended = assigned.clone();
                extended.push(w);
                stack.push((extended, Some(next)));
            }
        }
    }

    out.rows.sort_unstable();
    debug!(
        "path {}: {} partial matches",
        path.iter()
            .map(|l| ctx.query.name(*l))
            .collect::<Vec<_>>()
            .join("-"),
        out.rows.len()
    );
    out
}

/// Enumerate every root-to-leaf path, in parallel when enabled.
pub fn enumerate_paths(
    ctx: &MatchContext<'_>,
    td: &TdTree,
    paths: &[Vec<LabelId>],
) -> Vec<PartialMatches> {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;

        if ctx.config.parallel {
            return paths
                .par_iter()
                .map(|p| enumerate_path(ctx, td, p))
                .collect();
        }
    }

    paths.iter().map(|p| enumerate_path(ctx, td, p)).collect()
}

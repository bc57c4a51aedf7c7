//! Candidate growth.
//!
//! Root candidates are filled first. Growth then proceeds one tree level at
//! a time from an explicit worklist, so the candidate set of every ancestor
//! is complete before any of its descendants test against it.

use std::collections::HashMap;

use durable_common::VertexId;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::{NodeId, TdTree};
use crate::MatchContext;
use crate::graph_index::LabelId;
use crate::profiling::Timer;
use crate::timestamps::TimestampSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GrowStats {
    pub root_candidates: usize,
    /// Tasks expanded.
    pub tasks: usize,
    /// Tasks skipped because an earlier task already covered them.
    pub covered_tasks: usize,
    /// Distinct cells created.
    pub cells: usize,
}

/// Grow `(node, parent)` with the timestamps inherited from the path above.
/// `None` means unconstrained (children of the root).
#[derive(Clone, Debug)]
struct Task {
    node: NodeId,
    parent: VertexId,
    inherited: Option<TimestampSet>,
}

/// True if every set `narrower` admits is also admitted by `wider`.
fn covers(wider: Option<&TimestampSet>, narrower: Option<&TimestampSet>) -> bool {
    match (wider, narrower) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(w), Some(n)) => n.is_subset(w),
    }
}

/// Structural and durability tests every candidate of `label` must pass.
pub(crate) fn admissible(ctx: &MatchContext<'_>, label: LabelId, v: VertexId) -> bool {
    let Some(info) = ctx.index.vertex(v) else {
        return false;
    };
    let qdeg = ctx.query.degree(label);
    info.degree >= qdeg
        && info.neighbor_labels >= qdeg
        && info.duration >= ctx.config.k
        && ctx
            .query
            .neighbors(label)
            .all(|n| !ctx.index.neighbors_with_label(v, n).is_empty())
}

/// True if `w` has a neighbor in the live candidate set of `partner`.
pub(crate) fn has_partner(
    ctx: &MatchContext<'_>,
    td: &TdTree,
    partner: NodeId,
    w: VertexId,
) -> bool {
    let node = td.node(partner);
    ctx.index
        .neighbors_with_label(w, node.label)
        .iter()
        .any(|&x| node.possibly_contains(x))
}

fn fill_root(ctx: &MatchContext<'_>, td: &mut TdTree) -> usize {
    let label = td.root().label;
    let strict = ctx.config.strict_root_filter;
    let mut inserted = 0;
    for &v in ctx.index.vertices_with_label(label) {
        if strict && !admissible(ctx, label, v) {
            continue;
        }
        if td.node_mut(TdTree::ROOT).insert_root_candidate(v) {
            inserted += 1;
        }
    }
    inserted
}

/// Grow the whole TD-tree.
pub fn grow(ctx: &MatchContext<'_>, td: &mut TdTree) -> GrowStats {
    let _t = Timer::new("td_tree::grow");
    let mut stats = GrowStats {
        root_candidates: fill_root(ctx, td),
        ..GrowStats::default()
    };
    info!(
        "grow: {} root candidates for `{}`",
        stats.root_candidates,
        ctx.query.name(td.root().label)
    );

    let mut level: Vec<Task> = Vec::new();
    for r in td.root().candidates() {
        for &child in &td.root().children {
            level.push(Task {
                node: child,
                parent: r,
                inherited: None,
            });
        }
    }

    let mut seen: HashMap<(NodeId, VertexId), Vec<Option<TimestampSet>>> = HashMap::new();
    let mut depth = 1;
    while !level.is_empty() {
        let mut next_level: Vec<Task> = Vec::new();
        for task in level {
            let history = seen.entry((task.node, task.parent)).or_default();
            if history
                .iter()
                .any(|h| covers(h.as_ref(), task.inherited.as_ref()))
            {
                stats.covered_tasks += 1;
                continue;
            }
            history.retain(|h| !covers(task.inherited.as_ref(), h.as_ref()));
            history.push(task.inherited.clone());

            stats.tasks += 1;
            stats.cells += expand(ctx, td, &task, &mut next_level);
        }
        debug!(
            "grow: depth {depth} done, {} tasks queued for depth {}",
            next_level.len(),
            depth + 1
        );
        level = next_level;
        depth += 1;
    }

    info!(
        "grow: {} tasks expanded ({} covered), {} cells",
        stats.tasks, stats.covered_tasks, stats.cells
    );
    stats
}

/// Admit the children of `task.parent` into `task.node`. Returns the number
/// of new cells.
fn expand(ctx: &MatchContext<'_>, td: &mut TdTree, task: &Task, next: &mut Vec<Task>) -> usize {
    let k = ctx.config.k;
    let node = td.node(task.node);
    let label = node.label;
    let is_leaf = node.is_leaf;
    let children = node.children.clone();
    let ancestors: Vec<NodeId> = ctx
        .tree
        .ancestor_partners(label)
        .filter_map(|a| td.node_of(a))
        .collect();

    let mut created = 0;
    for &w in ctx.index.neighbors_with_label(task.parent, label) {
        if !admissible(ctx, label, w) {
            trace!("reject {w}: degree, neighbor labels or duration");
            continue;
        }
        let Some(edge) = ctx.index.timestamps_between(task.parent, w) else {
            continue;
        };
        if edge.len() < k {
            continue;
        }
        if !ancestors.iter().all(|&a| has_partner(ctx, td, a, w)) {
            trace!("reject {w}: no live non-tree partner");
            continue;
        }
        let ts = match &task.inherited {
            None => edge.clone(),
            Some(inherited) => inherited.intersect(edge),
        };
        if ts.len() < k {
            continue;
        }

        let leaf_ts = is_leaf.then(|| ts.clone());
        if td.node_mut(task.node).insert_cell(task.parent, w, leaf_ts) {
            created += 1;
        }
        for &child in &children {
            next.push(Task {
                node: child,
                parent: w,
                inherited: Some(ts.clone()),
            });
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(v: &[u64]) -> TimestampSet {
        TimestampSet::from_unsorted(v.iter().copied())
    }

    #[test]
    fn unconstrained_covers_everything() {
        assert!(covers(None, None));
        assert!(covers(None, Some(&ts(&[1]))));
        assert!(!covers(Some(&ts(&[1])), None));
        assert!(covers(Some(&ts(&[1, 2, 3])), Some(&ts(&[2, 3]))));
        assert!(!covers(Some(&ts(&[2, 3])), Some(&ts(&[1, 2]))));
    }
}

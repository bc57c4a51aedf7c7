//! Candidate trimming to a global fixpoint.
//!
//! Each pass visits the nodes in preorder and removes a candidate when
//! - some non-tree partner label has no live candidate adjacent to it, or
//! - it sits at an internal node and some child has no live block keyed by it.
//!
//! Removals cascade downward through an explicit worklist. Their effect on
//! ancestors is picked up by the next pass; passes repeat until one removes
//! nothing.

use durable_common::{BloomMode, VertexId};
use serde::Serialize;
use tracing::{debug, info};

use super::grow::has_partner;
use super::{NodeId, TdTree};
use crate::MatchContext;
use crate::profiling::Timer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrimStats {
    /// Full passes run, including the final one that removed nothing.
    pub passes: usize,
    /// Cells and root candidates removed.
    pub removed: usize,
}

#[derive(Clone, Copy, Debug)]
enum Removal {
    /// Every cell of `vertex` at `node`.
    Candidate { node: NodeId, vertex: VertexId },
    /// The block keyed by `parent` at `node`.
    Block { node: NodeId, parent: VertexId },
}

/// Trim `td` until no rule removes anything.
pub fn trim(ctx: &MatchContext<'_>, td: &mut TdTree) -> TrimStats {
    let _t = Timer::new("td_tree::trim");
    let mut stats = TrimStats::default();
    loop {
        stats.passes += 1;
        let removed = pass(ctx, td);
        stats.removed += removed;
        if ctx.config.bloom_mode == BloomMode::Rebuild {
            td.rebuild_blooms();
        }
        debug!("trim: pass {} removed {}", stats.passes, removed);
        if removed == 0 {
            break;
        }
    }
    info!(
        "trim: fixpoint after {} passes, {} removed",
        stats.passes, stats.removed
    );
    stats
}

fn pass(ctx: &MatchContext<'_>, td: &mut TdTree) -> usize {
    let mut removed = 0;
    for id in 0..td.nodes().len() {
        let doomed: Vec<VertexId> = td
            .node(id)
            .candidates()
            .into_iter()
            .filter(|&v| !survives(ctx, td, id, v))
            .collect();
        for v in doomed {
            removed += cascade(td, Removal::Candidate { node: id, vertex: v });
        }
    }
    removed
}

fn survives(ctx: &MatchContext<'_>, td: &TdTree, id: NodeId, v: VertexId) -> bool {
    let node = td.node(id);

    let partners_ok = ctx
        .tree
        .non_tree_partners(node.label)
        .filter_map(|(partner, _)| td.node_of(partner))
        .all(|p| has_partner(ctx, td, p, v));
    if !partners_ok {
        return false;
    }

    node.children
        .iter()
        .all(|&c| td.node(c).has_live_block(v))
}

/// Apply `first` and everything it implies below. Returns the number of
/// cells and root candidates removed.
fn cascade(td: &mut TdTree, first: Removal) -> usize {
    let mut removed = 0;
    let mut work = vec![first];
    while let Some(r) = work.pop() {
        match r {
            Removal::Candidate { node, vertex } => {
                let n = td.node_mut(node);
                let count = if n.is_root {
                    usize::from(n.remove_root_candidate(vertex))
                } else {
                    n.remove_candidate(vertex)
                };
                if count == 0 {
                    continue;
                }
                removed += count;
                for &c in &td.node(node).children {
                    work.push(Removal::Block {
                        node: c,
                        parent: vertex,
                    });
                }
            }
            Removal::Block { node, parent } => {
                let (count, orphaned) = td.node_mut(node).remove_block(parent);
                removed += count;
                for &c in &td.node(node).children {
                    for &v in &orphaned {
                        work.push(Removal::Block { node: c, parent: v });
                    }
                }
            }
        }
    }
    removed
}

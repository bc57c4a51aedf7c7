//! Joining per-path partial matches into full matches.

use std::collections::HashMap;

use durable_common::VertexId;
use itertools::Itertools;
use tracing::{debug, info};

use crate::enumerate::{PartialMatch, PartialMatches, extend_over_edge};
use crate::graph_index::LabelId;
use crate::profiling::Timer;
use crate::timestamps::TimestampSet;
use crate::{Match, MatchContext};

/// Join `sets` smallest first and emit the full matches, sorted.
///
/// An empty input set ends the join early with no matches.
pub fn join_all(ctx: &MatchContext<'_>, mut sets: Vec<PartialMatches>) -> Vec<Match> {
    let _t = Timer::new("join::join_all");
    sets.sort_by_key(PartialMatches::len);

    let mut sets = sets.into_iter();
    let Some(mut acc) = sets.next() else {
        return Vec::new();
    };
    for next in sets {
        if acc.is_empty() {
            break;
        }
        acc = join_pair(ctx, &acc, &next);
        debug!(
            "join: {} labels, {} rows",
            acc.labels.len(),
            acc.rows.len()
        );
    }

    let mut matches: Vec<Match> = acc
        .rows
        .into_iter()
        .filter(|row| row.timestamps.len() >= ctx.config.k)
        .map(|row| Match {
            assignment: acc
                .labels
                .iter()
                .zip(row.vertices)
                .map(|(l, v)| (ctx.query.name(*l).to_string(), v))
                .collect(),
            timestamps: row.timestamps,
        })
        .collect();
    matches.sort_unstable();
    matches.dedup();
    info!("join: {} matches", matches.len());
    matches
}

/// Hash join on the shared labels of `left` and `right`.
///
/// Non-tree edges whose endpoints first meet in the joined row are checked
/// exactly and narrow its timestamps.
pub fn join_pair(
    ctx: &MatchContext<'_>,
    left: &PartialMatches,
    right: &PartialMatches,
) -> PartialMatches {
    let k = ctx.config.k;
    let shared: Vec<(usize, usize)> = left
        .labels
        .iter()
        .enumerate()
        .filter_map(|(i, l)| right.position(*l).map(|j| (i, j)))
        .collect();
    let extra: Vec<usize> = (0..right.labels.len())
        .filter(|j| !shared.iter().any(|(_, s)| s == j))
        .collect();

    let mut labels = left.labels.clone();
    labels.extend(extra.iter().map(|&j| right.labels[j]));

    let position: HashMap<LabelId, usize> = labels.iter().enumerate().map(|(i, l)| (*l, i)).collect();
    let new_edges: Vec<(usize, usize)> = ctx
        .tree
        .non_tree_edges()
        .iter()
        .filter(|e| {
            let in_left = left.position(e.upper).is_some() && left.position(e.lower).is_some();
            let in_right = right.position(e.upper).is_some() && right.position(e.lower).is_some();
            !in_left && !in_right
        })
        .filter_map(|e| Some((*position.get(&e.upper)?, *position.get(&e.lower)?)))
        .collect();

    let mut table: HashMap<Vec<VertexId>, Vec<&PartialMatch>> = HashMap::new();
    for row in &right.rows {
        let key = shared.iter().map(|&(_, j)| row.vertices[j]).collect_vec();
        table.entry(key).or_default().push(row);
    }

    let mut rows = Vec::new();
    for row in &left.rows {
        let key = shared.iter().map(|&(i, _)| row.vertices[i]).collect_vec();
        let Some(partners) = table.get(&key) else {
            continue;
        };
        'partners: for other in partners {
            let mut ts: TimestampSet = row.timestamps.intersect(&other.timestamps);
            if ts.len() < k {
                continue;
            }
            let mut vertices = row.vertices.clone();
            vertices.extend(extra.iter().map(|&j| other.vertices[j]));
            for &(a, b) in &new_edges {
                match extend_over_edge(ctx, Some(&ts), vertices[a], vertices[b]) {
                    Some(narrowed) if narrowed.len() >= k => ts = narrowed,
                    _ => continue 'partners,
                }
            }
            rows.push(PartialMatch {
                vertices,
                timestamps: ts,
            });
        }
    }

    PartialMatches { labels, rows }
}

//! Preparation of raw temporal edge lists.
//!
//! Raw data sets usually carry Unix times and repeated rows. These helpers
//! turn them into the `(u, v, snapshot)` form the matcher expects.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::info;

use crate::{EdgeRow, Timestamp, VertexId};

/// Replace Unix-second times with 1-based snapshot indices of
/// `interval_minutes` width.
///
/// Snapshot 1 starts at the earliest time in `rows`, floored to the interval.
/// An interval of zero minutes is treated as one minute.
#[must_use]
pub fn bucket_unix_times(rows: &[EdgeRow], interval_minutes: u64) -> Vec<EdgeRow> {
    let width = interval_minutes.max(1).saturating_mul(60);
    let Some(earliest) = rows.iter().map(|r| r.t).min() else {
        return Vec::new();
    };
    let base = earliest - earliest % width;

    rows.iter()
        .map(|r| EdgeRow::new(r.u, r.v, (r.t - base) / width + 1))
        .collect()
}

/// Drop repeated `(u, v, t)` rows, keeping first-seen order.
#[must_use]
pub fn dedupe_rows(rows: &[EdgeRow]) -> Vec<EdgeRow> {
    let mut seen: HashSet<EdgeRow> = HashSet::with_capacity(rows.len());
    let out: Vec<EdgeRow> = rows.iter().copied().filter(|r| seen.insert(*r)).collect();
    info!("dedupe: {} rows -> {} rows", rows.len(), out.len());
    out
}

/// Keep only rows of directed edges observed at `min_duration` or more
/// distinct snapshots.
#[must_use]
pub fn filter_durable_edges(rows: &[EdgeRow], min_duration: usize) -> Vec<EdgeRow> {
    let mut observed: HashMap<(VertexId, VertexId), HashSet<Timestamp>> = HashMap::new();
    for r in rows {
        observed.entry((r.u, r.v)).or_default().insert(r.t);
    }
    let out: Vec<EdgeRow> = rows
        .iter()
        .copied()
        .filter(|r| {
            observed
                .get(&(r.u, r.v))
                .is_some_and(|ts| ts.len() >= min_duration)
        })
        .collect();
    info!(
        "durable edge filter (>= {min_duration}): {} rows -> {} rows",
        rows.len(),
        out.len()
    );
    out
}

/// Every distinct snapshot of one directed edge, ascending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EdgeHistory {
    /// Source vertex.
    pub u: VertexId,
    /// Target vertex.
    pub v: VertexId,
    /// Distinct snapshots, sorted.
    pub snapshots: Vec<Timestamp>,
}

impl EdgeHistory {
    /// Length of the longest run of consecutive snapshots.
    #[must_use]
    pub fn longest_run(&self) -> usize {
        let mut best = 0;
        let mut run = 0;
        let mut prev: Option<Timestamp> = None;
        for &t in &self.snapshots {
            run = match prev {
                Some(p) if p.checked_add(1) == Some(t) => run + 1,
                _ => 1,
            };
            best = best.max(run);
            prev = Some(t);
        }
        best
    }

    /// True if two snapshots of this edge are adjacent.
    #[must_use]
    pub fn has_consecutive_snapshots(&self) -> bool {
        self.snapshots
            .windows(2)
            .any(|w| w[0].checked_add(1) == Some(w[1]))
    }
}

impl std::fmt::Display for EdgeHistory {
    /// `u v t1,t2,...`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ", self.u, self.v)?;
        for (i, t) in self.snapshots.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

/// Group rows by directed edge, ordered by `(u, v)`.
#[must_use]
pub fn group_by_edge(rows: &[EdgeRow]) -> Vec<EdgeHistory> {
    let mut grouped: BTreeMap<(VertexId, VertexId), Vec<Timestamp>> = BTreeMap::new();
    for r in rows {
        grouped.entry((r.u, r.v)).or_default().push(r.t);
    }
    grouped
        .into_iter()
        .map(|((u, v), mut snapshots)| {
            snapshots.sort_unstable();
            snapshots.dedup();
            EdgeHistory { u, v, snapshots }
        })
        .collect()
}

/// Summary of a temporal edge list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EdgeListSummary {
    /// Distinct directed edges.
    pub edges: usize,
    /// Edges seen at two adjacent snapshots at least once.
    pub consecutive_edges: usize,
    /// Longest run of adjacent snapshots over all edges.
    pub longest_run: usize,
    /// Distinct snapshots over the whole list.
    pub snapshots: usize,
}

/// Count edges with at least one pair of adjacent snapshots.
#[must_use]
pub fn count_consecutive_edges(history: &[EdgeHistory]) -> usize {
    history
        .iter()
        .filter(|h| h.has_consecutive_snapshots())
        .count()
}

/// Summarize grouped edges.
#[must_use]
pub fn summarize_edges(history: &[EdgeHistory]) -> EdgeListSummary {
    let snapshots: HashSet<Timestamp> = history
        .iter()
        .flat_map(|h| h.snapshots.iter().copied())
        .collect();
    EdgeListSummary {
        edges: history.len(),
        consecutive_edges: count_consecutive_edges(history),
        longest_run: history.iter().map(EdgeHistory::longest_run).max().unwrap_or(0),
        snapshots: snapshots.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucketing_is_one_based_and_floored() {
        let rows = [
            EdgeRow::new(1, 2, 3_600 + 30),
            EdgeRow::new(1, 2, 3_600 + 59),
            EdgeRow::new(2, 3, 3_600 + 125),
        ];
        let out = bucket_unix_times(&rows, 1);
        let ts: Vec<u64> = out.iter().map(|r| r.t).collect();
        assert_eq!(ts, vec![1, 1, 3]);
    }

    #[test]
    fn bucketing_handles_unsorted_rows() {
        let rows = [EdgeRow::new(1, 2, 600), EdgeRow::new(1, 2, 0)];
        let out = bucket_unix_times(&rows, 5);
        assert_eq!(out[0].t, 3);
        assert_eq!(out[1].t, 1);
    }

    #[test]
    fn dedupe_keeps_order() {
        let rows = [
            EdgeRow::new(1, 2, 5),
            EdgeRow::new(3, 4, 1),
            EdgeRow::new(1, 2, 5),
        ];
        assert_eq!(dedupe_rows(&rows), rows[..2].to_vec());
    }

    #[test]
    fn durable_filter_counts_distinct_snapshots() {
        let rows = [
            EdgeRow::new(1, 2, 5),
            EdgeRow::new(1, 2, 5),
            EdgeRow::new(1, 2, 6),
            EdgeRow::new(2, 1, 7),
        ];
        let out = filter_durable_edges(&rows, 2);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.u == 1));
    }

    #[test]
    fn grouping_sorts_and_dedupes_per_directed_edge() {
        let rows = [
            EdgeRow::new(2, 1, 4),
            EdgeRow::new(1, 2, 9),
            EdgeRow::new(1, 2, 3),
            EdgeRow::new(1, 2, 9),
        ];
        let grouped = group_by_edge(&rows);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].to_string(), "1 2 3,9");
        assert_eq!(grouped[1].to_string(), "2 1 4");
    }

    #[test]
    fn consecutive_edges_need_adjacent_snapshots() {
        let rows = [
            EdgeRow::new(1, 2, 3),
            EdgeRow::new(1, 2, 5),
            EdgeRow::new(2, 3, 7),
            EdgeRow::new(2, 3, 8),
            EdgeRow::new(2, 3, 9),
            EdgeRow::new(3, 4, 1),
        ];
        let grouped = group_by_edge(&rows);
        assert_eq!(count_consecutive_edges(&grouped), 1);
        let summary = summarize_edges(&grouped);
        assert_eq!(summary.edges, 3);
        assert_eq!(summary.consecutive_edges, 1);
        assert_eq!(summary.longest_run, 3);
        assert_eq!(summary.snapshots, 6);
    }

    #[test]
    fn empty_list_summarizes_to_zero() {
        assert_eq!(summarize_edges(&group_by_edge(&[])), EdgeListSummary::default());
    }

    mod properties {
        use quickcheck::quickcheck;

        use super::*;

        fn to_rows(raw: &[(u8, u8, u16)]) -> Vec<EdgeRow> {
            raw.iter()
                .map(|&(u, v, t)| EdgeRow::new(u64::from(u), u64::from(v), u64::from(t)))
                .collect()
        }

        quickcheck! {
            fn prop_dedupe_is_idempotent(raw: Vec<(u8, u8, u16)>) -> bool {
                let once = dedupe_rows(&to_rows(&raw));
                dedupe_rows(&once) == once
            }

            fn prop_bucketing_preserves_order(raw: Vec<(u8, u8, u16)>, minutes: u8) -> bool {
                let rows = to_rows(&raw);
                let out = bucket_unix_times(&rows, u64::from(minutes));
                out.len() == rows.len()
                    && out.iter().all(|r| r.t >= 1)
                    && rows.iter().zip(&out).all(|(a, b)| {
                        rows.iter().zip(&out).all(|(c, d)| a.t > c.t || b.t <= d.t)
                    })
            }

            fn prop_filter_keeps_a_subset(raw: Vec<(u8, u8, u16)>, k: u8) -> bool {
                let rows = to_rows(&raw);
                let out = filter_durable_edges(&rows, usize::from(k % 4));
                out.iter().all(|r| rows.contains(r))
            }
        }
    }
}

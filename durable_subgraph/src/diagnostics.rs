//! Counters and timings collected during a run.

use std::time::{Duration, Instant};

use durable_common::BloomMode;
use serde::Serialize;

use crate::decompose::NonTreeKind;
use crate::enumerate::PathSummary;
use crate::graph_index::IndexStats;
use crate::profiling::{self, ProfileRow};
use crate::query::QueryGraph;
use crate::td_tree::{GrowStats, TdTree, TrimStats};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Internal,
    Leaf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub label: String,
    pub parent: Option<String>,
    pub kind: NodeKind,
    pub candidates_after_growth: usize,
    pub candidates_after_trim: usize,
    pub blocks: usize,
    pub cells: usize,
}

impl NodeSummary {
    /// Summaries of every node of `td`, given the candidate counts recorded
    /// right after growth.
    pub fn collect(query: &QueryGraph, td: &TdTree, after_growth: &[usize]) -> Vec<Self> {
        td.nodes()
            .iter()
            .enumerate()
            .map(|(i, n)| Self {
                label: query.name(n.label).to_string(),
                parent: n.parent.map(|p| query.name(td.node(p).label).to_string()),
                kind: if n.is_root {
                    NodeKind::Root
                } else if n.is_leaf {
                    NodeKind::Leaf
                } else {
                    NodeKind::Internal
                },
                candidates_after_growth: after_growth.get(i).copied().unwrap_or(0),
                candidates_after_trim: n.candidate_count(),
                blocks: n.block_count(),
                cells: n.cell_count(),
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NonTreeSummary {
    pub upper: String,
    pub lower: String,
    pub kind: NonTreeKind,
}

/// Wall-clock time per stage, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub index_ms: f64,
    pub decompose_ms: f64,
    pub grow_ms: f64,
    pub trim_ms: f64,
    pub enumerate_ms: f64,
    pub join_ms: f64,
    pub total_ms: f64,
}

/// Runs a closure and returns its result with the elapsed milliseconds.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let out = f();
    (out, millis(start.elapsed()))
}

pub fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub root: String,
    pub root_selectivity: f64,
    pub k: usize,
    pub bloom_mode: BloomMode,
    pub index: IndexStats,
    pub non_tree_edges: Vec<NonTreeSummary>,
    pub nodes: Vec<NodeSummary>,
    pub grow: GrowStats,
    pub trim: TrimStats,
    pub paths: Vec<PathSummary>,
    pub matches: usize,
    pub timings: StageTimings,
    /// Hot-path timers; empty unless built with the `profiling` feature.
    pub profile: Vec<ProfileRow>,
}

impl Diagnostics {
    pub(crate) fn capture_profile(&mut self) {
        self.profile = profiling::snapshot();
    }
}

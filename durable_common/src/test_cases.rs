//! Common test cases for the durable workspace.
//!
//! Each case is a tiny labeled temporal graph, a query, a configuration and
//! the expected outcome. The engine's integration tests and the CLI tests
//! both iterate over [`SCENARIO_TEST_CASES`].

use crate::{Config, EdgeRow, QueryEdge, VertexId};

/// A complete test case definition.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// The name of the test case.
    pub name: &'static str,
    /// Temporal edge rows, possibly with duplicates.
    pub edges: Vec<EdgeRow>,
    /// Vertex labels.
    pub labels: Vec<(VertexId, String)>,
    /// The query graph.
    pub query: Vec<QueryEdge>,
    /// The configuration for the search.
    pub config: Config,
    /// The expected number of matches.
    pub expected_matches: usize,
    /// Interval notation of the first match's timestamps, when checked.
    pub expected_timestamps: Option<&'static str>,
}

fn rows(triples: &[(u64, u64, u64)]) -> Vec<EdgeRow> {
    triples
        .iter()
        .map(|&(u, v, t)| EdgeRow::new(u, v, t))
        .collect()
}

fn labels(pairs: &[(u64, &str)]) -> Vec<(VertexId, String)> {
    pairs.iter().map(|&(v, l)| (v, l.to_string())).collect()
}

fn query(pairs: &[(&str, &str)]) -> Vec<QueryEdge> {
    pairs.iter().map(|&(a, b)| QueryEdge::new(a, b)).collect()
}

// #####################
// SCENARIOS
// #####################
lazy_static::lazy_static! {
    /// Hand-checked scenarios covering durability, join-time verification
    /// and duplicate handling.
    pub static ref SCENARIO_TEST_CASES: Vec<TestCase> = vec![
        TestCase {
            name: "single_edge_k2",
            edges: rows(&[(1, 2, 5), (1, 2, 6), (1, 2, 7)]),
            labels: labels(&[(1, "A"), (2, "B")]),
            query: query(&[("A", "B")]),
            config: Config::builder().k(2).build(),
            expected_matches: 1,
            expected_timestamps: Some("[5-7]"),
        },
        TestCase {
            name: "single_edge_k4",
            edges: rows(&[(1, 2, 5), (1, 2, 6), (1, 2, 7)]),
            labels: labels(&[(1, "A"), (2, "B")]),
            query: query(&[("A", "B")]),
            config: Config::builder().k(4).build(),
            expected_matches: 0,
            expected_timestamps: None,
        },
        TestCase {
            name: "triangle_missing_closing_edge",
            edges: rows(&[(1, 2, 1), (1, 2, 2), (1, 2, 3), (2, 3, 1), (2, 3, 2), (2, 3, 3)]),
            labels: labels(&[(1, "A"), (2, "B"), (3, "C")]),
            query: query(&[("A", "B"), ("B", "C"), ("C", "A")]),
            config: Config::builder().k(2).build(),
            expected_matches: 0,
            expected_timestamps: None,
        },
        TestCase {
            name: "triangle_present",
            edges: rows(&[
                (1, 2, 1), (1, 2, 2), (1, 2, 3),
                (2, 3, 1), (2, 3, 2), (2, 3, 3),
                (3, 1, 1), (3, 1, 2), (3, 1, 3),
            ]),
            labels: labels(&[(1, "A"), (2, "B"), (3, "C")]),
            query: query(&[("A", "B"), ("B", "C"), ("C", "A")]),
            config: Config::builder().k(3).build(),
            expected_matches: 1,
            expected_timestamps: Some("[1-3]"),
        },
        TestCase {
            name: "triangle_closed_only_through_other_vertices",
            edges: rows(&[
                (1, 2, 1), (1, 2, 2), (2, 3, 1), (2, 3, 2), (3, 4, 1), (3, 4, 2),
                (4, 6, 1), (4, 6, 2), (6, 5, 1), (6, 5, 2), (5, 1, 1), (5, 1, 2),
            ]),
            labels: labels(&[(1, "A"), (2, "B"), (3, "C"), (4, "A"), (5, "C"), (6, "B")]),
            query: query(&[("A", "B"), ("B", "C"), ("C", "A")]),
            config: Config::builder().k(2).build(),
            expected_matches: 0,
            expected_timestamps: None,
        },
        TestCase {
            name: "duplicate_row_counts_once",
            edges: rows(&[(1, 2, 5), (1, 2, 5), (1, 2, 6)]),
            labels: labels(&[(1, "A"), (2, "B")]),
            query: query(&[("A", "B")]),
            config: Config::builder().k(2).build(),
            expected_matches: 1,
            expected_timestamps: Some("[5-6]"),
        },
        TestCase {
            name: "duplicate_row_not_double_counted",
            edges: rows(&[(1, 2, 5), (1, 2, 5), (1, 2, 6)]),
            labels: labels(&[(1, "A"), (2, "B")]),
            query: query(&[("A", "B")]),
            config: Config::builder().k(3).build(),
            expected_matches: 0,
            expected_timestamps: None,
        },
        TestCase {
            name: "star_join_intersects_paths",
            edges: rows(&[(1, 2, 1), (1, 2, 2), (1, 2, 3), (1, 3, 2), (1, 3, 3), (1, 3, 4)]),
            labels: labels(&[(1, "A"), (2, "B"), (3, "C")]),
            query: query(&[("A", "B"), ("A", "C")]),
            config: Config::builder().k(2).build(),
            expected_matches: 1,
            expected_timestamps: Some("[2-3]"),
        },
        TestCase {
            name: "star_join_overlap_too_short",
            edges: rows(&[(1, 2, 1), (1, 2, 2), (1, 2, 3), (1, 3, 2), (1, 3, 3), (1, 3, 4)]),
            labels: labels(&[(1, "A"), (2, "B"), (3, "C")]),
            query: query(&[("A", "B"), ("A", "C")]),
            config: Config::builder().k(3).build(),
            expected_matches: 0,
            expected_timestamps: None,
        },
        TestCase {
            name: "reverse_direction_edge",
            edges: rows(&[(2, 1, 8), (2, 1, 9)]),
            labels: labels(&[(1, "A"), (2, "B")]),
            query: query(&[("A", "B")]),
            config: Config::builder().k(2).build(),
            expected_matches: 1,
            expected_timestamps: Some("[8-9]"),
        },
        TestCase {
            name: "two_disjoint_occurrences",
            edges: rows(&[(1, 2, 1), (1, 2, 2), (3, 4, 5), (3, 4, 6), (1, 4, 1)]),
            labels: labels(&[(1, "A"), (2, "B"), (3, "A"), (4, "B")]),
            query: query(&[("A", "B")]),
            config: Config::builder().k(2).build(),
            expected_matches: 2,
            expected_timestamps: None,
        },
    ];
}

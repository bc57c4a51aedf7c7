#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use durable_common::{BloomMode, Config, QueryEdge, SCENARIO_TEST_CASES, TestCase};
use durable_subgraph::td_tree::{grow, trim};
use durable_subgraph::{
    DecompositionError, DurableMatcher, GraphIndex, MatchContext, QueryGraph, TdTree, decompose,
};
use rstest::rstest;

#[macro_use]
mod common;

fn case(name: &str) -> &'static TestCase {
    SCENARIO_TEST_CASES
        .iter()
        .find(|tc| tc.name == name)
        .unwrap_or_else(|| panic!("no scenario named {name}"))
}

fn run_case(tc: &TestCase, config: &Config) -> Result<(), String> {
    let set = DurableMatcher::search_all(&tc.edges, &tc.labels, &tc.query, config)
        .map_err(|e| format!("{}: {e}", tc.name))?;

    if set.len() != tc.expected_matches {
        return Err(format!(
            "scenario '{}' failed: expected {} matches, got {}",
            tc.name,
            tc.expected_matches,
            set.len()
        ));
    }
    if let Some(expected) = tc.expected_timestamps {
        let got = set.matches[0].timestamps.to_string();
        if got != expected {
            return Err(format!(
                "scenario '{}' failed: expected timestamps {expected}, got {got}",
                tc.name
            ));
        }
    }
    Ok(())
}

#[rstest]
#[case::single_edge_k2("single_edge_k2")]
#[case::single_edge_k4("single_edge_k4")]
#[case::triangle_missing_closing_edge("triangle_missing_closing_edge")]
#[case::triangle_present("triangle_present")]
#[case::triangle_closed_only_through_other_vertices("triangle_closed_only_through_other_vertices")]
#[case::duplicate_row_counts_once("duplicate_row_counts_once")]
#[case::duplicate_row_not_double_counted("duplicate_row_not_double_counted")]
#[case::star_join_intersects_paths("star_join_intersects_paths")]
#[case::star_join_overlap_too_short("star_join_overlap_too_short")]
#[case::reverse_direction_edge("reverse_direction_edge")]
#[case::two_disjoint_occurrences("two_disjoint_occurrences")]
fn scenario(#[case] name: &str) {
    common::setup_test_logging();
    let tc = case(name);
    run_case(tc, &tc.config).unwrap();
}

#[rstest]
fn every_scenario_agrees_across_configurations(
    #[values(BloomMode::Stale, BloomMode::Rebuild)] bloom_mode: BloomMode,
    #[values(true, false)] strict_root_filter: bool,
    #[values(true, false)] parallel: bool,
) {
    common::setup_test_logging();
    let failures: Vec<String> = SCENARIO_TEST_CASES
        .iter()
        .filter_map(|tc| {
            let config = Config::builder()
                .k(tc.config.k)
                .bloom_mode(bloom_mode)
                .strict_root_filter(strict_root_filter)
                .parallel(parallel)
                .build();
            run_case(tc, &config).err()
        })
        .collect();
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn scenarios_match_brute_force() {
    for tc in SCENARIO_TEST_CASES.iter() {
        let expected = common::brute_force(&tc.edges, &tc.labels, &tc.query, tc.config.k);
        let got = DurableMatcher::search_all(&tc.edges, &tc.labels, &tc.query, &tc.config)
            .map(|set| set.matches)
            .unwrap_or_default();
        assert_eq!(got, expected, "scenario '{}'", tc.name);
    }
}

#[test]
fn triangle_closing_edge_is_a_non_tree_edge() {
    let tc = case("triangle_present");
    let set = DurableMatcher::search_all(&tc.edges, &tc.labels, &tc.query, &tc.config).unwrap();
    assert_eq!(set.diagnostics.non_tree_edges.len(), 1);
    assert_eq!(set.diagnostics.paths.len(), 1);
    assert_eq!(set.diagnostics.paths[0].labels.len(), 3);
}

#[test]
fn six_cycle_survives_trim_and_fails_exact_verification() {
    // Every candidate has a live partner of each label, so growth and trim
    // keep them all; only the exact C-A check on each path rejects them.
    let tc = case("triangle_closed_only_through_other_vertices");
    let set = DurableMatcher::search_all(&tc.edges, &tc.labels, &tc.query, &tc.config).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.diagnostics.trim.removed, 0);
    assert!(set.diagnostics.nodes.iter().all(|n| n.candidates_after_trim == 2));
    assert_eq!(set.diagnostics.paths.len(), 1);
    assert_eq!(set.diagnostics.paths[0].partial_matches, 0);
}

#[test]
fn unfiltered_roots_still_yield_no_triangle() {
    let tc = case("triangle_missing_closing_edge");
    let config = Config::builder().k(2).strict_root_filter(false).build();
    let set = DurableMatcher::search_all(&tc.edges, &tc.labels, &tc.query, &config).unwrap();
    assert!(set.is_empty());
    assert!(
        set.diagnostics
            .nodes
            .iter()
            .all(|n| n.candidates_after_trim <= n.candidates_after_growth)
    );
}

#[test]
fn disconnected_query_is_reported_once() {
    let tc = case("two_disjoint_occurrences");
    let query = vec![QueryEdge::new("A", "B"), QueryEdge::new("C", "D")];
    let index = GraphIndex::build(&tc.edges, &tc.labels);
    let err = DurableMatcher::search_with_index(&index, &query, &tc.config).unwrap_err();
    assert!(matches!(err, DecompositionError::Disconnected { .. } | DecompositionError::NoViableRoot));
}

#[test]
fn trimmed_trees_are_structurally_consistent() {
    for tc in SCENARIO_TEST_CASES.iter() {
        let index = GraphIndex::build(&tc.edges, &tc.labels);
        let query = QueryGraph::build(&tc.query, index.labels());
        let Ok(d) = decompose(&query, &index) else {
            continue;
        };
        let ctx = MatchContext {
            index: &index,
            query: &query,
            tree: &d.tree,
            config: &tc.config,
        };
        let mut td = TdTree::new(&d.tree, &tc.config, index.vertex_count());
        grow(&ctx, &mut td);
        trim(&ctx, &mut td);

        for node in td.nodes().iter().filter(|n| !n.is_root) {
            let Some(parent) = node.parent.map(|p| td.node(p)) else {
                continue;
            };
            for block in node.blocks() {
                assert_invariant!(parent.contains(block.parent()), "block keyed by a live parent candidate");
                assert_invariant!(!block.is_empty(), "no empty blocks survive");
                for cell in block.cells() {
                    assert_invariant!(
                        node.parents_of(cell.vertex).any(|p| p == block.parent()),
                        "membership records every block holding the vertex"
                    );
                    assert_invariant!(
                        cell.timestamps.is_some() == node.is_leaf,
                        "only leaf cells carry timestamps"
                    );
                }
            }
            for v in node.candidates() {
                assert_invariant!(node.possibly_contains(v), "bloom never drops a live candidate");
            }
        }
    }
}

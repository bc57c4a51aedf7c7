#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use durable_common::{BloomMode, Config, EdgeRow, QueryEdge, VertexId};
use durable_subgraph::td_tree::{grow, trim};
use durable_subgraph::{DurableMatcher, GraphIndex, MatchContext, QueryGraph, TdTree, TimestampSet, decompose};
use quickcheck::{Arbitrary, Gen, quickcheck};

mod common;

const LABELS: &[&str] = &["A", "B", "C"];

/// A small labeled temporal graph, a connected query over its alphabet and
/// a threshold.
#[derive(Clone, Debug)]
struct Instance {
    rows: Vec<EdgeRow>,
    labels: Vec<(VertexId, String)>,
    query: Vec<QueryEdge>,
    k: usize,
}

fn small(g: &mut Gen, bound: u64) -> u64 {
    u64::arbitrary(g) % bound
}

impl Arbitrary for Instance {
    fn arbitrary(g: &mut Gen) -> Self {
        let vertices = 2 + small(g, 7);
        let labels: Vec<(VertexId, String)> = (0..vertices)
            .map(|v| (v, (*g.choose(LABELS).unwrap_or(&"A")).to_string()))
            .collect();

        let row_count = small(g, 40);
        let rows: Vec<EdgeRow> = (0..row_count)
            .map(|_| EdgeRow::new(small(g, vertices), small(g, vertices), 1 + small(g, 6)))
            .collect();

        // A path over two or three labels, optionally closed into a triangle.
        let mut order: Vec<&str> = LABELS.to_vec();
        for i in (1..order.len()).rev() {
            let j = usize::try_from(small(g, i as u64 + 1)).unwrap_or(0);
            order.swap(i, j);
        }
        let width = if bool::arbitrary(g) { 3 } else { 2 };
        let mut query: Vec<QueryEdge> = order[..width]
            .windows(2)
            .map(|w| QueryEdge::new(w[0], w[1]))
            .collect();
        if width == 3 && bool::arbitrary(g) {
            query.push(QueryEdge::new(order[2], order[0]));
        }

        let k = 1 + usize::try_from(small(g, 3)).unwrap_or(0);
        Self {
            rows,
            labels,
            query,
            k,
        }
    }
}

fn config(inst: &Instance, bloom_mode: BloomMode, strict: bool) -> Config {
    Config::builder()
        .k(inst.k)
        .bloom_mode(bloom_mode)
        .strict_root_filter(strict)
        .build()
}

fn agrees_with_brute_force(inst: &Instance, config: &Config) -> bool {
    let expected = common::brute_force(&inst.rows, &inst.labels, &inst.query, inst.k);
    match DurableMatcher::search_all(&inst.rows, &inst.labels, &inst.query, config) {
        Ok(set) => set.matches == expected,
        // No viable root means some query label has no data vertex at all.
        Err(_) => expected.is_empty(),
    }
}

quickcheck! {
    fn prop_matches_equal_brute_force(inst: Instance) -> bool {
        common::setup_test_logging();
        agrees_with_brute_force(&inst, &config(&inst, BloomMode::Stale, true))
    }

    fn prop_matches_equal_brute_force_with_rebuilt_filters(inst: Instance) -> bool {
        agrees_with_brute_force(&inst, &config(&inst, BloomMode::Rebuild, false))
    }

    fn prop_matches_are_durable_and_real(inst: Instance) -> bool {
        let edges = common::edge_table(&inst.rows);
        let Ok(set) = DurableMatcher::search_all(&inst.rows, &inst.labels, &inst.query, &Config::builder().k(inst.k).build()) else {
            return true;
        };
        set.matches.iter().all(|m| {
            m.timestamps.len() >= inst.k
                && inst.query.iter().all(|e| {
                    let (Some(u), Some(v)) = (m.vertex(&e.a), m.vertex(&e.b)) else {
                        return false;
                    };
                    edges
                        .get(&(u.min(v), u.max(v)))
                        .is_some_and(|ts| m.timestamps.is_subset(ts))
                })
        })
    }

    fn prop_trim_is_idempotent_and_monotone(inst: Instance) -> bool {
        let config = config(&inst, BloomMode::Stale, true);
        let index = GraphIndex::build(&inst.rows, &inst.labels);
        let query = QueryGraph::build(&inst.query, index.labels());
        let Ok(d) = decompose(&query, &index) else {
            return true;
        };
        let ctx = MatchContext {
            index: &index,
            query: &query,
            tree: &d.tree,
            config: &config,
        };
        let mut td = TdTree::new(&d.tree, &config, index.vertex_count());
        grow(&ctx, &mut td);
        let grown = td.candidate_counts();

        trim(&ctx, &mut td);
        let trimmed = td.candidate_counts();
        let again = trim(&ctx, &mut td);

        again.removed == 0
            && again.passes == 1
            && td.candidate_counts() == trimmed
            && grown.iter().zip(&trimmed).all(|(g, t)| t <= g)
    }

    fn prop_interval_notation_round_trips(raw: Vec<u16>) -> bool {
        let ts = TimestampSet::from_unsorted(raw.into_iter().map(u64::from));
        ts.to_string().parse::<TimestampSet>() == Ok(ts)
    }
}

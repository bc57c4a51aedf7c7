#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Once;

use durable_common::{EdgeRow, QueryEdge, VertexId};
use durable_subgraph::{Match, TimestampSet};

static INIT: Once = Once::new();

/// Configures logging for the test runner.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Assert that an invariant holds
#[macro_export]
macro_rules! assert_invariant {
    ($cond:expr, $invariant_name:expr) => {
        if !$cond {
            panic!(
                "Invariant violated: {}\nCondition: {}",
                $invariant_name,
                stringify!($cond)
            );
        }
    };
}

/// Undirected timestamp sets straight from the rows, without the index.
pub fn edge_table(rows: &[EdgeRow]) -> HashMap<(VertexId, VertexId), TimestampSet> {
    let mut raw: HashMap<(VertexId, VertexId), Vec<u64>> = HashMap::new();
    for r in rows.iter().filter(|r| r.u != r.v) {
        let key = (r.u.min(r.v), r.u.max(r.v));
        raw.entry(key).or_default().push(r.t);
    }
    raw.into_iter()
        .map(|(k, ts)| (k, TimestampSet::from_unsorted(ts)))
        .collect()
}

/// Every durable embedding, found by trying every label-respecting
/// assignment.
pub fn brute_force(
    rows: &[EdgeRow],
    labels: &[(VertexId, String)],
    query: &[QueryEdge],
    k: usize,
) -> Vec<Match> {
    let edges = edge_table(rows);
    let present: BTreeSet<VertexId> = edges.keys().flat_map(|&(u, v)| [u, v]).collect();

    let mut label_of: HashMap<VertexId, &str> = HashMap::new();
    for (v, l) in labels {
        label_of.entry(*v).or_insert(l.as_str());
    }

    let query_edges: BTreeSet<(String, String)> = query
        .iter()
        .filter(|e| e.a != e.b)
        .map(|e| {
            if e.a < e.b {
                (e.a.clone(), e.b.clone())
            } else {
                (e.b.clone(), e.a.clone())
            }
        })
        .collect();
    let query_labels: Vec<String> = query_edges
        .iter()
        .flat_map(|(a, b)| [a.clone(), b.clone()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let pools: Vec<Vec<VertexId>> = query_labels
        .iter()
        .map(|l| {
            present
                .iter()
                .copied()
                .filter(|v| label_of.get(v) == Some(&l.as_str()))
                .collect()
        })
        .collect();

    let mut out = Vec::new();
    let mut assignment: Vec<VertexId> = Vec::with_capacity(query_labels.len());
    search(&query_labels, &pools, &query_edges, &edges, k, &mut assignment, &mut out);
    out.sort();
    out
}

fn search(
    labels: &[String],
    pools: &[Vec<VertexId>],
    query_edges: &BTreeSet<(String, String)>,
    edges: &HashMap<(VertexId, VertexId), TimestampSet>,
    k: usize,
    assignment: &mut Vec<VertexId>,
    out: &mut Vec<Match>,
) {
    if assignment.len() == labels.len() {
        let position: HashMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();
        let mut ts: Option<TimestampSet> = None;
        for (a, b) in query_edges {
            let (u, v) = (assignment[position[a.as_str()]], assignment[position[b.as_str()]]);
            let Some(edge) = edges.get(&(u.min(v), u.max(v))) else {
                return;
            };
            ts = Some(match ts {
                None => edge.clone(),
                Some(ts) => ts.intersect(edge),
            });
        }
        if let Some(ts) = ts.filter(|ts| ts.len() >= k) {
            let map: BTreeMap<String, VertexId> =
                labels.iter().cloned().zip(assignment.iter().copied()).collect();
            out.push(Match {
                assignment: map,
                timestamps: ts,
            });
        }
        return;
    }
    for &v in &pools[assignment.len()] {
        assignment.push(v);
        search(labels, pools, query_edges, edges, k, assignment, out);
        assignment.pop();
    }
}

//! Rendering of a finished search as text, JSON or CSV.

use std::fmt::Write as _;
use std::io::Write;

use durable_common::BloomMode;
use durable_subgraph::MatchSet;
use durable_subgraph::diagnostics::NodeKind;
use itertools::Itertools;
use serde::Serialize;

use crate::args::FormatArg;

/// What was searched, echoed at the top of every report.
#[derive(Clone, Debug, Serialize)]
pub struct Inputs {
    pub input: String,
    pub query: String,
    pub labels: String,
    pub k: usize,
    pub resident_memory_kb: Option<u64>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    inputs: &'a Inputs,
    diagnostics: &'a durable_subgraph::Diagnostics,
    matches: &'a [durable_subgraph::Match],
}

pub fn render(
    format: FormatArg,
    inputs: &Inputs,
    set: &MatchSet,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        FormatArg::Text => out.write_all(text(inputs, set).as_bytes())?,
        FormatArg::Json => {
            let report = JsonReport {
                inputs,
                diagnostics: &set.diagnostics,
                matches: &set.matches,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        FormatArg::Csv => write_csv(set, out)?,
    }
    Ok(())
}

/// One row per `(match, label)` pair, timestamps in interval notation.
fn write_csv(set: &MatchSet, out: &mut dyn Write) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["match", "label", "vertex", "timestamps"])?;
    for (i, m) in set.matches.iter().enumerate() {
        let ts = m.timestamps.to_string();
        for (label, vertex) in &m.assignment {
            writer.write_record([
                (i + 1).to_string(),
                label.clone(),
                vertex.to_string(),
                ts.clone(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Human readable summary of a run.
pub fn text(inputs: &Inputs, set: &MatchSet) -> String {
    let d = &set.diagnostics;
    let mut s = String::new();

    let _ = writeln!(s, "=== Durable Subgraph Matching (TD-tree + path enumeration) ===");
    let _ = writeln!(s, "Input: {}", inputs.input);
    let _ = writeln!(s, "Query: {}", inputs.query);
    let _ = writeln!(s, "Labels: {}", inputs.labels);
    let _ = writeln!(s, "k = {}", inputs.k);
    let _ = writeln!(
        s,
        "Graph: {} vertices, {} undirected edges, {} rows",
        d.index.vertices, d.index.undirected_edges, d.index.rows
    );
    let _ = writeln!(
        s,
        "Root label: {}  (selectivity = |V({})|/deg({}) = {:.3})",
        d.root, d.root, d.root, d.root_selectivity
    );
    if d.bloom_mode == BloomMode::Stale {
        let _ = writeln!(s, "(Note) Stage-2 trimming without rebuilding Bloom (fast mode)");
    }
    if !d.non_tree_edges.is_empty() {
        let edges = d
            .non_tree_edges
            .iter()
            .map(|e| format!("{}-{}", e.upper, e.lower))
            .join(", ");
        let _ = writeln!(s, "Non-tree edges: {edges}");
    }

    let _ = writeln!(s, "\n[Node summaries]");
    for n in &d.nodes {
        let kind = match n.kind {
            NodeKind::Root => "root",
            NodeKind::Internal => "internal",
            NodeKind::Leaf => "leaf",
        };
        let _ = write!(s, "Node [{}]  type={kind}", n.label);
        if let Some(parent) = &n.parent {
            let _ = write!(s, "  parent={parent}");
        }
        if n.kind == NodeKind::Root {
            let _ = write!(s, "  candidates={}", n.candidates_after_trim);
        } else {
            let _ = write!(s, "  blocks={}  \u{3a3} cells={}", n.blocks, n.cells);
        }
        let _ = writeln!(
            s,
            "  (after growth={}, after trim={})",
            n.candidates_after_growth, n.candidates_after_trim
        );
    }
    let _ = writeln!(
        s,
        "Trim: {} passes, {} removals",
        d.trim.passes, d.trim.removed
    );

    let _ = writeln!(s, "\n[Paths (root->leaf) and enumerated sizes]");
    for p in &d.paths {
        let _ = writeln!(s, "{} : matches={}", p.labels.join("->"), p.partial_matches);
    }

    let _ = writeln!(s, "\n[Final durable matches] count={}", set.len());
    for (i, m) in set.matches.iter().enumerate() {
        let assignment = m
            .assignment
            .iter()
            .map(|(label, v)| format!("{label}->{v}"))
            .join(", ");
        let _ = writeln!(
            s,
            "Match {}: {assignment}  |TS|={}  TS={}",
            i + 1,
            m.timestamps.len(),
            m.timestamps
        );
    }

    let t = &d.timings;
    let _ = writeln!(s, "\n[Timing (ms)]");
    for (stage, ms) in [
        ("index", t.index_ms),
        ("decompose", t.decompose_ms),
        ("grow", t.grow_ms),
        ("trim", t.trim_ms),
        ("enumerate", t.enumerate_ms),
        ("join", t.join_ms),
        ("total", t.total_ms),
    ] {
        let _ = writeln!(s, "{stage:<12}{ms:>12.3}");
    }
    match inputs.resident_memory_kb {
        Some(kb) => {
            let _ = writeln!(s, "RSS: {kb} KB");
        }
        None => {
            let _ = writeln!(s, "RSS: unavailable");
        }
    }
    let _ = writeln!(s, "Done.");
    s
}

/// Resident set size of this process, in KiB.
pub fn resident_memory_kb() -> Option<u64> {
    use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, get_current_pid};

    let pid = get_current_pid().ok()?;
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );
    sys.process(pid).map(|p| p.memory() / 1024)
}

#[cfg(test)]
mod tests {
    use durable_common::{Config, EdgeRow, QueryEdge};
    use durable_subgraph::DurableMatcher;

    use super::*;

    fn sample() -> (Inputs, MatchSet) {
        let rows = vec![
            EdgeRow::new(1, 2, 5),
            EdgeRow::new(1, 2, 6),
            EdgeRow::new(2, 1, 7),
        ];
        let labels = vec![(1, "A".to_string()), (2, "B".to_string())];
        let query = vec![QueryEdge::new("A", "B")];
        let config = Config::builder().k(2).build();
        let set = DurableMatcher::search_all(&rows, &labels, &query, &config).unwrap();
        let inputs = Inputs {
            input: "graph.txt".into(),
            query: "query.txt".into(),
            labels: "labels.txt".into(),
            k: 2,
            resident_memory_kb: None,
        };
        (inputs, set)
    }

    #[test]
    fn text_report_lists_matches() {
        let (inputs, set) = sample();
        let report = text(&inputs, &set);
        assert!(report.starts_with("=== Durable Subgraph Matching"));
        assert!(report.contains("[Final durable matches] count=1"));
        assert!(report.contains("Match 1: A->1, B->2  |TS|=3  TS=[5-7]"));
        assert!(report.contains("(Note) Stage-2 trimming"));
        assert!(report.ends_with("Done.\n"));
    }

    #[test]
    fn csv_report_has_one_row_per_label() {
        let (inputs, set) = sample();
        let mut buf = Vec::new();
        render(FormatArg::Csv, &inputs, &set, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "match,label,vertex,timestamps");
        assert_eq!(lines[1], "1,A,1,[5-7]");
        assert_eq!(lines[2], "1,B,2,[5-7]");
    }

    #[test]
    fn json_report_carries_diagnostics() {
        let (inputs, set) = sample();
        let mut buf = Vec::new();
        render(FormatArg::Json, &inputs, &set, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["inputs"]["k"], 2);
        assert_eq!(value["diagnostics"]["matches"], 1);
        assert_eq!(value["matches"][0]["timestamps"], serde_json::json!([5, 6, 7]));
    }
}

//! `durable analyze`: per-edge snapshot histories and a short summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use durable_common::{
    EdgeHistory, EdgeListSummary, LoadError, group_by_edge, read_temporal_edges, summarize_edges,
};
use tracing::info;

use crate::args::AnalyzeArgs;

pub fn run(args: &AnalyzeArgs) -> Result<(), LoadError> {
    let (rows, report) = read_temporal_edges(&args.input)?;
    info!(
        "read {} rows from {} ({} skipped)",
        report.accepted,
        args.input.display(),
        report.skipped
    );

    let start = Instant::now();
    let history = group_by_edge(&rows);
    let summary = summarize_edges(&history);
    let elapsed = start.elapsed();

    if let Some(path) = &args.output {
        let file = File::create(path).map_err(|e| LoadError::io(path, e))?;
        let mut out = BufWriter::new(file);
        write_history(&history, &mut out).map_err(|e| LoadError::io(path, e))?;
        info!("wrote {} edges to {}", history.len(), path.display());
    }

    print!("{}", render_summary(&summary, elapsed.as_millis()));
    Ok(())
}

fn write_history(history: &[EdgeHistory], out: &mut impl Write) -> std::io::Result<()> {
    for h in history {
        writeln!(out, "{h}")?;
    }
    out.flush()
}

fn render_summary(summary: &EdgeListSummary, millis: u128) -> String {
    format!(
        "Time consumed: {millis} ms\n\
         Total edges: {}\n\
         Edges with consecutive snapshots: {}\n\
         Longest consecutive run: {}\n\
         Distinct snapshots: {}\n",
        summary.edges, summary.consecutive_edges, summary.longest_run, summary.snapshots
    )
}

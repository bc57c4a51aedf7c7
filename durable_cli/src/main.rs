//! Durable subgraph matcher CLI
//!
//! Entry point for the `durable` command-line tool. Loads a temporal edge
//! list and a query pattern, runs the TD-tree matcher and renders the
//! durable matches it finds.

#[global_allocator]
/// Global allocator using jemalloc for better performance in parallel workloads.
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod analyze;
mod args;
mod prepare;
mod report;

use std::fs::File;
use std::io::{BufWriter, Write};

use clap::Parser;
use durable_common::{
    EdgeRow, VertexId, assign_missing_labels, read_query_edges, read_temporal_edges,
    read_vertex_labels,
};
use durable_subgraph::{DurableMatcher, profiling};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::{Cli, Command, MatchArgs};
use report::Inputs;

/// Executes the durable matcher.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging
/// 3. Dispatches to the chosen subcommand
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose))
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Match(args) => run_match(args),
        Command::Prepare(args) => Ok(prepare::run(args)?),
        Command::Analyze(args) => Ok(analyze::run(args)?),
    }
}

fn env_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::from_default_env(),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn run_match(args: &MatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }
    let config = args.to_config();

    info!("Loading temporal graph: {}", args.input.display());
    let (rows, report) = read_temporal_edges(&args.input)?;
    info!("{} rows accepted, {} skipped", report.accepted, report.skipped);

    info!("Loading query: {}", args.query.display());
    let (query, report) = read_query_edges(&args.query)?;
    info!("{} query edges accepted, {} skipped", report.accepted, report.skipped);

    let (labels, label_source) = match &args.labels {
        Some(path) => {
            let (labels, report) = read_vertex_labels(path)?;
            if report.skipped > 0 {
                warn!("{} label rows skipped", report.skipped);
            }
            (labels, path.display().to_string())
        }
        None => {
            let alphabet = args.alphabet();
            let alphabet: Vec<&str> = alphabet.iter().map(String::as_str).collect();
            let labels = assign_missing_labels(endpoints(&rows), &[], &alphabet, config.seed);
            info!(
                "No label file; drew {} labels from {:?} with seed {}",
                labels.len(),
                alphabet,
                config.seed
            );
            (labels, format!("generated ({}, seed {})", alphabet.join(","), config.seed))
        }
    };

    let set = DurableMatcher::search_all(&rows, &labels, &query, &config)?;
    info!("{} durable matches", set.len());

    let inputs = Inputs {
        input: args.input.display().to_string(),
        query: args.query.display().to_string(),
        labels: label_source,
        k: config.k,
        resident_memory_kb: report::resident_memory_kb(),
    };

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            report::render(args.format, &inputs, &set, &mut out)?;
            out.flush()?;
            info!("Report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            report::render(args.format, &inputs, &set, &mut out)?;
        }
    }

    if args.profile {
        if set.diagnostics.profile.is_empty() {
            warn!("--profile given but the binary was built without the `profiling` feature");
        } else {
            eprint!("{}", profiling::render(&set.diagnostics.profile));
        }
    }

    Ok(())
}

fn endpoints(rows: &[EdgeRow]) -> impl Iterator<Item = VertexId> + '_ {
    rows.iter().flat_map(|r| [r.u, r.v])
}

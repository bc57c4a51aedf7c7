use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use durable_common::{BloomMode, Config, DEFAULT_ALPHABET};

/// Durable subgraph matcher - find query patterns that persist over time
#[derive(Parser, Debug)]
#[command(name = "durable")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); overrides RUST_LOG
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search a temporal graph for durable matches of a query
    Match(MatchArgs),
    /// Bucket, deduplicate and filter a raw temporal edge list
    Prepare(PrepareArgs),
    /// Group a temporal edge list by edge and count edges seen at adjacent snapshots
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Temporal edge list, one `u v t` row per line
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Query graph, one `A B` label pair per line
    #[arg(short = 'q', long)]
    pub query: PathBuf,

    /// Minimum number of shared timestamps
    #[arg(short = 'k', long, default_value_t = 3)]
    pub k: usize,

    /// Vertex label file, one `vertex label` pair per line
    #[arg(short = 'l', long)]
    pub labels: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Rebuild Bloom filters after every trim pass
    #[arg(long, default_value_t = false)]
    pub trim_rebuild_bloom: bool,

    /// Keep every vertex with the root label as a root candidate
    #[arg(long, default_value_t = false)]
    pub no_strict_root_filter: bool,

    /// Seed for Bloom salts and generated labels
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Labels drawn for vertices when no label file is given, either one
    /// label per character or comma separated
    #[arg(long, default_value = "ABCDE")]
    pub alphabet: String,

    /// Bloom filter bits per data vertex
    #[arg(long, default_value_t = 8)]
    pub bloom_bits_per_vertex: usize,

    /// Bloom filter hash functions
    #[arg(long, default_value_t = 3)]
    pub bloom_hashes: u32,

    /// Enumerate paths on one thread
    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Worker threads for path enumeration (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Print hot-path timers to stderr (needs the `profiling` feature)
    #[arg(long, default_value_t = false)]
    pub profile: bool,
}

impl MatchArgs {
    /// Convert command-line arguments into internal configuration
    pub fn to_config(&self) -> Config {
        let bloom_mode = if self.trim_rebuild_bloom {
            BloomMode::Rebuild
        } else {
            BloomMode::Stale
        };

        Config::builder()
            .k(self.k)
            .bloom_mode(bloom_mode)
            .bloom_bits_per_vertex(self.bloom_bits_per_vertex)
            .bloom_hashes(self.bloom_hashes)
            .seed(self.seed)
            .strict_root_filter(!self.no_strict_root_filter)
            .parallel(!self.sequential)
            .build()
    }

    pub fn alphabet(&self) -> Vec<String> {
        let raw = self.alphabet.trim();
        let labels: Vec<String> = if raw.contains(',') {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            raw.chars()
                .filter(|c| !c.is_whitespace())
                .map(String::from)
                .collect()
        };
        if labels.is_empty() {
            DEFAULT_ALPHABET.iter().map(|s| (*s).to_string()).collect()
        } else {
            labels
        }
    }
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Raw temporal edge list, one `u v t` row per line
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Prepared edge list
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Treat `t` as Unix seconds and bucket it into snapshots of this width
    #[arg(long)]
    pub interval_minutes: Option<u64>,

    /// Keep only directed edges seen at this many distinct snapshots
    #[arg(long, default_value_t = 1)]
    pub min_duration: usize,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Temporal edge list, one `u v t` row per line
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Write `u v t1,t2,...` per directed edge here
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Command-line argument wrapper for the report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    /// Human readable summary
    #[value(name = "text")]
    Text,
    /// Diagnostics and matches as JSON
    #[value(name = "json")]
    Json,
    /// One row per matched label
    #[value(name = "csv")]
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn match_flags_reach_the_config() {
        let cli = parse(&[
            "durable",
            "match",
            "-i",
            "g.txt",
            "-q",
            "q.txt",
            "-k",
            "5",
            "--trim-rebuild-bloom",
            "--no-strict-root-filter",
            "--seed",
            "7",
        ]);
        let Command::Match(args) = cli.command else {
            panic!("expected match");
        };
        let cfg = args.to_config();
        assert_eq!(cfg.k, 5);
        assert_eq!(cfg.bloom_mode, BloomMode::Rebuild);
        assert!(!cfg.strict_root_filter);
        assert_eq!(cfg.seed, 7);
        assert!(cfg.parallel);
        assert_eq!(args.format, FormatArg::Text);
    }

    #[test]
    fn alphabet_accepts_chars_or_commas() {
        let cli = parse(&["durable", "match", "-i", "g", "-q", "q", "--alphabet", "XYZ"]);
        let Command::Match(args) = cli.command else {
            panic!("expected match");
        };
        assert_eq!(args.alphabet(), vec!["X", "Y", "Z"]);

        let cli = parse(&["durable", "match", "-i", "g", "-q", "q", "--alphabet", "src, dst"]);
        let Command::Match(args) = cli.command else {
            panic!("expected match");
        };
        assert_eq!(args.alphabet(), vec!["src", "dst"]);
    }

    #[test]
    fn analyze_output_is_optional() {
        let cli = parse(&["durable", "analyze", "-i", "edges.txt"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.input, PathBuf::from("edges.txt"));
        assert!(args.output.is_none());
    }

    #[test]
    fn verbosity_is_global() {
        let cli = parse(&["durable", "prepare", "-i", "a", "-o", "b", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}

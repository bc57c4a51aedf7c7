//! `durable prepare`: turn a raw edge list into matcher input.

use std::fs::File;
use std::io::{BufWriter, Write};

use durable_common::{
    EdgeRow, LoadError, bucket_unix_times, dedupe_rows, filter_durable_edges, read_temporal_edges,
};
use tracing::info;

use crate::args::PrepareArgs;

pub fn run(args: &PrepareArgs) -> Result<(), LoadError> {
    let (rows, report) = read_temporal_edges(&args.input)?;
    info!(
        "read {} rows from {} ({} skipped)",
        report.accepted,
        args.input.display(),
        report.skipped
    );

    let rows = prepare_rows(&rows, args.interval_minutes, args.min_duration);

    let file = File::create(&args.output).map_err(|e| LoadError::io(&args.output, e))?;
    let mut out = BufWriter::new(file);
    write_rows(&rows, &mut out).map_err(|e| LoadError::io(&args.output, e))?;
    info!("wrote {} rows to {}", rows.len(), args.output.display());
    Ok(())
}

/// Bucket (when asked), deduplicate, then drop short-lived edges.
pub fn prepare_rows(rows: &[EdgeRow], interval_minutes: Option<u64>, min_duration: usize) -> Vec<EdgeRow> {
    let bucketed;
    let rows = match interval_minutes {
        Some(minutes) => {
            bucketed = bucket_unix_times(rows, minutes);
            bucketed.as_slice()
        }
        None => rows,
    };
    let unique = dedupe_rows(rows);
    if min_duration > 1 {
        filter_durable_edges(&unique, min_duration)
    } else {
        unique
    }
}

fn write_rows(rows: &[EdgeRow], out: &mut impl Write) -> std::io::Result<()> {
    for r in rows {
        writeln!(out, "{} {} {}", r.u, r.v, r.t)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn buckets_then_filters() {
        // 0 and 59 seconds share the first one-minute snapshot.
        let rows = vec![
            EdgeRow::new(1, 2, 0),
            EdgeRow::new(1, 2, 59),
            EdgeRow::new(1, 2, 60),
            EdgeRow::new(3, 4, 0),
        ];
        let out = prepare_rows(&rows, Some(1), 2);
        assert_eq!(out, vec![EdgeRow::new(1, 2, 1), EdgeRow::new(1, 2, 2)]);
    }

    #[test]
    fn writes_prepared_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.txt");
        let output = dir.path().join("prepared.txt");
        std::fs::write(&input, "1 2 3\n1 2 3\n2 1 4\n").unwrap();

        let args = PrepareArgs {
            input,
            output: output.clone(),
            interval_minutes: None,
            min_duration: 1,
        };
        run(&args).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "1 2 3\n2 1 4\n");
    }

    #[test]
    fn missing_input_is_reported() {
        let args = PrepareArgs {
            input: PathBuf::from("/nonexistent/raw.txt"),
            output: PathBuf::from("/nonexistent/out.txt"),
            interval_minutes: None,
            min_duration: 1,
        };
        assert!(matches!(run(&args), Err(LoadError::Io { .. })));
    }
}

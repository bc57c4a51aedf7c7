//! Fine-grained hot-path timers, compiled in with the `profiling` feature.
//!
//! Without the feature every item here is a no-op.

use serde::Serialize;

/// Aggregate timing of one label.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileRow {
    pub label: &'static str,
    pub calls: u64,
    pub total_ms: f64,
    pub avg_ns: f64,
}

/// Render rows as a fixed-width table, heaviest first.
#[must_use]
pub fn render(rows: &[ProfileRow]) -> String {
    use std::fmt::Write;

    let mut out = String::from("==== durable_subgraph profile ====\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{:<48} calls={:<10} total={:>9.3} ms avg= {:>12.1} ns",
            row.label, row.calls, row.total_ms, row.avg_ns
        );
    }
    out.push_str("==================================\n");
    out
}

#[cfg(feature = "profiling")]
mod enabled {
    use std::sync::OnceLock;
    use std::time::{Duration, Instant};

    use dashmap::DashMap;

    use super::ProfileRow;

    type Count = u64;
    type TotalNanos = u128;

    static STATS: OnceLock<DashMap<&'static str, (Count, TotalNanos)>> = OnceLock::new();

    #[inline]
    fn stats() -> &'static DashMap<&'static str, (Count, TotalNanos)> {
        STATS.get_or_init(DashMap::new)
    }

    /// Records the time between construction and drop under `label`.
    pub struct Timer {
        label: &'static str,
        start: Instant,
    }

    impl Timer {
        #[inline]
        #[must_use]
        pub fn new(label: &'static str) -> Self {
            Self {
                label,
                start: Instant::now(),
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            record(self.label, self.start.elapsed());
        }
    }

    pub fn record(label: &'static str, dur: Duration) {
        let mut entry = stats().entry(label).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += dur.as_nanos();
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn snapshot() -> Vec<ProfileRow> {
        let mut rows: Vec<(TotalNanos, ProfileRow)> = stats()
            .iter()
            .map(|kv| {
                let (count, total) = *kv.value();
                let avg_ns = if count == 0 {
                    0.0
                } else {
                    (total as f64) / (count as f64)
                };
                let row = ProfileRow {
                    label: kv.key(),
                    calls: count,
                    total_ms: (total as f64) / 1_000_000.0,
                    avg_ns,
                };
                (total, row)
            })
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows.into_iter().map(|(_, row)| row).collect()
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use super::ProfileRow;

    #[derive(Clone, Copy)]
    pub struct Timer;

    impl Timer {
        #[inline]
        #[must_use]
        pub const fn new(_: &'static str) -> Self {
            Self
        }
    }

    #[must_use]
    pub const fn snapshot() -> Vec<ProfileRow> {
        Vec::new()
    }
}

#[cfg(feature = "profiling")]
pub use enabled::*;

#[cfg(not(feature = "profiling"))]
pub use disabled::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_every_row() {
        let rows = vec![ProfileRow {
            label: "grow",
            calls: 3,
            total_ms: 1.5,
            avg_ns: 500_000.0,
        }];
        let table = render(&rows);
        assert!(table.contains("grow"));
        assert!(table.contains("calls=3"));
    }
}

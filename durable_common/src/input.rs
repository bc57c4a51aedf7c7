//! Line-oriented readers for temporal edge lists, query graphs and vertex labels.
//!
//! Every reader is tolerant: a malformed row becomes an [`InputError`] in the
//! returned [`ParseReport`] and a `warn!` in the log, and reading continues.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{InputError, LoadError, Timestamp, VertexId};

/// Number of individual errors kept in a [`ParseReport`]; the rest are only counted.
const KEPT_ERRORS: usize = 16;

/// One `(u, v, t)` observation of the temporal graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeRow {
    /// Source vertex.
    pub u: VertexId,
    /// Target vertex.
    pub v: VertexId,
    /// Snapshot at which the edge is observed.
    pub t: Timestamp,
}

impl EdgeRow {
    /// Convenience constructor.
    #[must_use]
    pub const fn new(u: VertexId, v: VertexId, t: Timestamp) -> Self {
        Self { u, v, t }
    }
}

/// One undirected query edge between two labels.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryEdge {
    /// First endpoint label.
    pub a: String,
    /// Second endpoint label.
    pub b: String,
}

impl QueryEdge {
    /// Convenience constructor.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }
}

/// Outcome of reading one input source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Rows turned into values.
    pub accepted: usize,
    /// Rows rejected.
    pub skipped: usize,
    /// The first few rejections, in file order.
    pub errors: Vec<InputError>,
}

impl ParseReport {
    fn reject(&mut self, source: &str, err: InputError) {
        warn!("{source}: skipping row: {err}");
        self.skipped += 1;
        if self.errors.len() < KEPT_ERRORS {
            self.errors.push(err);
        }
    }
}

/// A 1-based line number with the decoded line, or why it could not be decoded.
type Line<'a> = (usize, Result<&'a str, InputError>);

fn text_lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.lines().enumerate().map(|(idx, line)| (idx + 1, Ok(line)))
}

/// Split on `\n` and decode every line on its own, so one bad line costs
/// only that row.
fn byte_lines(bytes: &[u8]) -> impl Iterator<Item = Line<'_>> {
    bytes.split(|b| *b == b'\n').enumerate().map(|(idx, raw)| {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line_no = idx + 1;
        (
            line_no,
            std::str::from_utf8(raw).map_err(|_| InputError::InvalidUtf8 { line: line_no }),
        )
    })
}

fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%')
}

fn parse_u64(line: usize, token: &str) -> Result<u64, InputError> {
    token.parse().map_err(|_| InputError::InvalidInteger {
        line,
        token: token.to_string(),
    })
}

/// Parse `u v t` rows.
#[must_use]
pub fn parse_temporal_edges(text: &str) -> (Vec<EdgeRow>, ParseReport) {
    temporal_edges_from(text_lines(text))
}

fn temporal_edges_from<'a>(lines: impl Iterator<Item = Line<'a>>) -> (Vec<EdgeRow>, ParseReport) {
    let mut report = ParseReport::default();
    let mut rows = Vec::new();

    for (line_no, line) in lines {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                report.reject("temporal graph", err);
                continue;
            }
        };
        if is_ignorable(line) {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parsed = match fields.as_slice() {
            [u, v, t] => parse_u64(line_no, u).and_then(|u| {
                let v = parse_u64(line_no, v)?;
                let t = parse_u64(line_no, t)?;
                Ok(EdgeRow::new(u, v, t))
            }),
            other => Err(InputError::FieldCount {
                line: line_no,
                expected: "3",
                found: other.len(),
            }),
        };
        match parsed {
            Ok(row) => {
                rows.push(row);
                report.accepted += 1;
            }
            Err(err) => report.reject("temporal graph", err),
        }
    }

    debug!(
        "temporal graph: {} rows accepted, {} skipped",
        report.accepted, report.skipped
    );
    (rows, report)
}

/// Parse `A B [edge-label]` rows. Self loops and repeated edges are rejected.
#[must_use]
pub fn parse_query_edges(text: &str) -> (Vec<QueryEdge>, ParseReport) {
    query_edges_from(text_lines(text))
}

fn query_edges_from<'a>(lines: impl Iterator<Item = Line<'a>>) -> (Vec<QueryEdge>, ParseReport) {
    let mut report = ParseReport::default();
    let mut edges = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for (line_no, line) in lines {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                report.reject("query graph", err);
                continue;
            }
        };
        if is_ignorable(line) {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (a, b) = match fields.as_slice() {
            [a, b] | [a, b, _] => (*a, *b),
            other => {
                report.reject(
                    "query graph",
                    InputError::FieldCount {
                        line: line_no,
                        expected: "2 or 3",
                        found: other.len(),
                    },
                );
                continue;
            }
        };
        if a == b {
            report.reject(
                "query graph",
                InputError::SelfLoop {
                    line: line_no,
                    label: a.to_string(),
                },
            );
            continue;
        }
        let key = if a < b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        if !seen.insert(key) {
            report.reject(
                "query graph",
                InputError::DuplicateEdge {
                    line: line_no,
                    a: a.to_string(),
                    b: b.to_string(),
                },
            );
            continue;
        }
        edges.push(QueryEdge::new(a, b));
        report.accepted += 1;
    }

    (edges, report)
}

/// Parse `vertex label` rows. The first label given to a vertex wins.
#[must_use]
pub fn parse_vertex_labels(text: &str) -> (Vec<(VertexId, String)>, ParseReport) {
    vertex_labels_from(text_lines(text))
}

fn vertex_labels_from<'a>(lines: impl Iterator<Item = Line<'a>>) -> (Vec<(VertexId, String)>, ParseReport) {
    let mut report = ParseReport::default();
    let mut labels = Vec::new();
    let mut assigned: HashMap<VertexId, String> = HashMap::new();

    for (line_no, line) in lines {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                report.reject("vertex labels", err);
                continue;
            }
        };
        if is_ignorable(line) {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [vertex, label] = fields.as_slice() else {
            report.reject(
                "vertex labels",
                InputError::FieldCount {
                    line: line_no,
                    expected: "2",
                    found: fields.len(),
                },
            );
            continue;
        };
        let vertex = match parse_u64(line_no, vertex) {
            Ok(v) => v,
            Err(err) => {
                report.reject("vertex labels", err);
                continue;
            }
        };
        if let Some(previous) = assigned.get(&vertex) {
            if previous != label {
                report.reject(
                    "vertex labels",
                    InputError::ConflictingLabel {
                        line: line_no,
                        vertex,
                        previous: previous.clone(),
                        label: (*label).to_string(),
                    },
                );
            }
            continue;
        }
        assigned.insert(vertex, (*label).to_string());
        labels.push((vertex, (*label).to_string()));
        report.accepted += 1;
    }

    (labels, report)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|e| LoadError::io(path, e))
}

fn non_empty<T>(
    path: &Path,
    (values, report): (Vec<T>, ParseReport),
) -> Result<(Vec<T>, ParseReport), LoadError> {
    if values.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
            skipped: report.skipped,
        });
    }
    Ok((values, report))
}

/// Read a temporal edge list file.
///
/// # Errors
///
/// Fails if the file cannot be read or contains no valid row.
pub fn read_temporal_edges(path: &Path) -> Result<(Vec<EdgeRow>, ParseReport), LoadError> {
    non_empty(path, temporal_edges_from(byte_lines(&read_bytes(path)?)))
}

/// Read a query graph file.
///
/// # Errors
///
/// Fails if the file cannot be read or contains no valid edge.
pub fn read_query_edges(path: &Path) -> Result<(Vec<QueryEdge>, ParseReport), LoadError> {
    non_empty(path, query_edges_from(byte_lines(&read_bytes(path)?)))
}

/// Read a vertex label file.
///
/// # Errors
///
/// Fails if the file cannot be read.
pub fn read_vertex_labels(path: &Path) -> Result<(Vec<(VertexId, String)>, ParseReport), LoadError> {
    Ok(vertex_labels_from(byte_lines(&read_bytes(path)?)))
}

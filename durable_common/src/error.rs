//! Error types for input handling.
//!
//! Row-level problems are [`InputError`]s: they are counted and skipped,
//! never fatal. A file that cannot be read at all is a [`LoadError`].

use std::path::PathBuf;

use thiserror::Error;

/// A malformed input row. Skipped with a counted warning.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    /// Wrong number of whitespace-separated fields.
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// 1-based line number.
        line: usize,
        /// Human readable field count expectation.
        expected: &'static str,
        /// Number of fields found.
        found: usize,
    },

    /// A field that should be a non-negative integer is not.
    #[error("line {line}: invalid integer `{token}`")]
    InvalidInteger {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },

    /// A query edge connecting a label to itself.
    #[error("line {line}: self loop on label `{label}`")]
    SelfLoop {
        /// 1-based line number.
        line: usize,
        /// Label on both ends.
        label: String,
    },

    /// A query edge that was already declared (in either direction).
    #[error("line {line}: duplicate query edge {a}-{b}")]
    DuplicateEdge {
        /// 1-based line number.
        line: usize,
        /// First endpoint.
        a: String,
        /// Second endpoint.
        b: String,
    },

    /// A vertex labeled twice with different labels.
    #[error("line {line}: vertex {vertex} relabeled from `{previous}` to `{label}`")]
    ConflictingLabel {
        /// 1-based line number.
        line: usize,
        /// Vertex being relabeled.
        vertex: u64,
        /// Label seen first (kept).
        previous: String,
        /// Label rejected.
        label: String,
    },

    /// A line that is not valid UTF-8.
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 {
        /// 1-based line number.
        line: usize,
    },
}

impl InputError {
    /// Line the error was found on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::FieldCount { line, .. }
            | Self::InvalidInteger { line, .. }
            | Self::SelfLoop { line, .. }
            | Self::DuplicateEdge { line, .. }
            | Self::ConflictingLabel { line, .. }
            | Self::InvalidUtf8 { line } => *line,
        }
    }
}

/// A file could not be used at all.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O failure.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Every row of the file was rejected or the file was empty.
    #[error("{path}: no valid rows ({skipped} skipped)")]
    Empty {
        /// File being read.
        path: PathBuf,
        /// Rows that were skipped.
        skipped: usize,
    },
}

impl LoadError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

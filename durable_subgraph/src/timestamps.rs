//! Sorted, deduplicated timestamp sets and their interval notation.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use durable_common::Timestamp;
use serde::Serialize;
use thiserror::Error;

/// A sorted set of distinct timestamps.
///
/// The set is displayed as a compressed interval list, e.g. `[1-3, 7, 9-10]`,
/// and parses back from the same notation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TimestampSet(Vec<Timestamp>);

impl TimestampSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from arbitrary timestamps, sorting and removing repeats.
    pub fn from_unsorted(items: impl IntoIterator<Item = Timestamp>) -> Self {
        let mut v: Vec<Timestamp> = items.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Timestamp] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn contains(&self, t: Timestamp) -> bool {
        self.0.binary_search(&t).is_ok()
    }

    /// Insert `t`, keeping the set sorted. Returns false if already present.
    pub fn insert(&mut self, t: Timestamp) -> bool {
        match self.0.binary_search(&t) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, t);
                true
            }
        }
    }

    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let (a, b) = (&self.0, &other.0);
        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    out.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Self(out)
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let (a, b) = (&self.0, &other.0);
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    out.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    out.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        Self(out)
    }

    /// True if every timestamp of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.len() > other.len() {
            return false;
        }
        let mut rest = other.0.iter();
        self.0.iter().all(|t| rest.any(|o| o == t))
    }

    /// Maximal runs of consecutive timestamps as `(first, last)` pairs.
    pub fn intervals(&self) -> Vec<(Timestamp, Timestamp)> {
        let mut out: Vec<(Timestamp, Timestamp)> = Vec::new();
        for &t in &self.0 {
            match out.last_mut() {
                Some((_, last)) if last.checked_add(1) == Some(t) => *last = t,
                _ => out.push((t, t)),
            }
        }
        out
    }
}

impl FromIterator<Timestamp> for TimestampSet {
    fn from_iter<I: IntoIterator<Item = Timestamp>>(iter: I) -> Self {
        Self::from_unsorted(iter)
    }
}

impl From<Vec<Timestamp>> for TimestampSet {
    fn from(v: Vec<Timestamp>) -> Self {
        Self::from_unsorted(v)
    }
}

impl fmt::Display for TimestampSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (lo, hi)) in self.intervals().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if lo == hi {
                write!(f, "{lo}")?;
            } else {
                write!(f, "{lo}-{hi}")?;
            }
        }
        write!(f, "]")
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseTimestampSetError {
    #[error("interval list must be enclosed in brackets")]
    MissingBrackets,
    #[error("invalid timestamp `{0}`")]
    InvalidTimestamp(String),
    #[error("interval {lo}-{hi} is reversed")]
    ReversedInterval { lo: Timestamp, hi: Timestamp },
}

impl FromStr for TimestampSet {
    type Err = ParseTimestampSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or(ParseTimestampSetError::MissingBrackets)?
            .trim();
        if inner.is_empty() {
            return Ok(Self::new());
        }

        let number = |tok: &str| {
            tok.trim()
                .parse::<Timestamp>()
                .map_err(|_| ParseTimestampSetError::InvalidTimestamp(tok.trim().to_string()))
        };

        let mut out = Vec::new();
        for part in inner.split(',') {
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let (lo, hi) = (number(lo)?, number(hi)?);
                    if lo > hi {
                        return Err(ParseTimestampSetError::ReversedInterval { lo, hi });
                    }
                    out.extend(lo..=hi);
                }
                None => out.push(number(part)?),
            }
        }
        Ok(Self::from_unsorted(out))
    }
}

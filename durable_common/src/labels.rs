//! Fallback vertex labeling and the shared 64-bit mixer.
//!
//! When no label file is supplied each data vertex gets a label drawn from a
//! small alphabet. The draw is a pure function of `(vertex, seed)`, so runs
//! are reproducible and independent of row order.

use crate::VertexId;

/// Alphabet used when none is configured.
pub const DEFAULT_ALPHABET: &[&str] = &["A", "B", "C", "D", "E"];

/// SplitMix64 finalizer. Cheap, well distributed, and stable across platforms.
#[inline]
#[must_use]
pub const fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Deterministic label for `vertex` drawn from `alphabet`.
///
/// Returns `None` only for an empty alphabet.
#[must_use]
pub fn pseudo_random_label<'a>(vertex: VertexId, alphabet: &[&'a str], seed: u64) -> Option<&'a str> {
    if alphabet.is_empty() {
        return None;
    }
    let slot = splitmix64(vertex ^ splitmix64(seed)) % alphabet.len() as u64;
    alphabet.get(usize::try_from(slot).ok()?).copied()
}

/// Label every vertex in `vertices` from `alphabet`, skipping vertices that
/// already appear in `known`.
#[must_use]
pub fn assign_missing_labels(
    vertices: impl IntoIterator<Item = VertexId>,
    known: &[(VertexId, String)],
    alphabet: &[&str],
    seed: u64,
) -> Vec<(VertexId, String)> {
    let labeled: std::collections::HashSet<VertexId> = known.iter().map(|(v, _)| *v).collect();
    let mut out: Vec<(VertexId, String)> = known.to_vec();
    let mut fresh: Vec<VertexId> = vertices
        .into_iter()
        .filter(|v| !labeled.contains(v))
        .collect();
    fresh.sort_unstable();
    fresh.dedup();
    out.extend(fresh.into_iter().filter_map(|v| {
        pseudo_random_label(v, alphabet, seed).map(|label| (v, label.to_string()))
    }));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_deterministic() {
        let a = pseudo_random_label(17, DEFAULT_ALPHABET, 42);
        let b = pseudo_random_label(17, DEFAULT_ALPHABET, 42);
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn empty_alphabet_yields_nothing() {
        assert_eq!(pseudo_random_label(1, &[], 0), None);
        assert!(assign_missing_labels([1, 2], &[], &[], 0).is_empty());
    }

    #[test]
    fn known_labels_are_preserved() {
        let known = vec![(1, "Z".to_string())];
        let out = assign_missing_labels([1, 2, 2, 3], &known, DEFAULT_ALPHABET, 9);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], (1, "Z".to_string()));
        assert!(out[1..].iter().all(|(_, l)| DEFAULT_ALPHABET.contains(&l.as_str())));
    }
}

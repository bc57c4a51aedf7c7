//! Per-node Bloom filter over candidate vertex ids.

use durable_common::{VertexId, splitmix64};

/// Fixed-size Bloom filter keyed by [`VertexId`].
///
/// Double hashing: bit `i` of key `x` is `(h1 + i * h2) % m` with
/// `h1 = splitmix64(x ^ salt1)` and `h2 = splitmix64(x ^ salt2) | 1`.
#[derive(Clone, Debug)]
pub struct VertexBloom {
    /// Bit vector
    bits: Vec<u64>,
    /// Number of bits, a multiple of 64
    m: usize,
    /// Number of hash functions
    hashes: u32,
    salt1: u64,
    salt2: u64,
    /// Number of insertions since the last clear
    count: usize,
}

impl VertexBloom {
    /// Create an empty filter with at least `bits` bits.
    ///
    /// `salt` should differ between filters of one run so that their false
    /// positives are independent.
    #[must_use]
    pub fn new(bits: usize, hashes: u32, salt: u64) -> Self {
        let words = bits.max(64).div_ceil(64);
        let salt1 = splitmix64(salt);
        Self {
            bits: vec![0u64; words],
            m: words * 64,
            hashes: hashes.max(1),
            salt1,
            salt2: splitmix64(salt1 ^ 0x5bd1_e995),
            count: 0,
        }
    }

    #[inline]
    fn seeds(&self, v: VertexId) -> (u64, u64) {
        (splitmix64(v ^ self.salt1), splitmix64(v ^ self.salt2) | 1)
    }

    #[inline]
    fn position(&self, (h1, h2): (u64, u64), i: u32) -> usize {
        let pos = (u128::from(h1) + u128::from(i) * u128::from(h2)) % self.m as u128;
        // pos < m, which fits in usize
        pos as usize
    }

    pub fn insert(&mut self, v: VertexId) {
        let seeds = self.seeds(v);
        for i in 0..self.hashes {
            let bit = self.position(seeds, i);
            self.bits[bit / 64] |= 1 << (bit % 64);
        }
        self.count += 1;
    }

    /// False means `v` was definitely never inserted since the last clear.
    #[must_use]
    pub fn might_contain(&self, v: VertexId) -> bool {
        let seeds = self.seeds(v);
        (0..self.hashes).all(|i| {
            let bit = self.position(seeds, i);
            self.bits[bit / 64] & (1 << (bit % 64)) != 0
        })
    }

    pub fn clear(&mut self) {
        self.bits.fill(0);
        self.count = 0;
    }

    /// Clear and re-insert exactly `live`.
    pub fn rebuild(&mut self, live: impl IntoIterator<Item = VertexId>) {
        self.clear();
        for v in live {
            self.insert(v);
        }
    }

    #[must_use]
    pub const fn bit_len(&self) -> usize {
        self.m
    }

    #[must_use]
    pub const fn insertions(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_ids_are_always_found() {
        let mut bloom = VertexBloom::new(8192, 3, 7);
        for v in (0..2_000).step_by(3) {
            bloom.insert(v);
        }
        assert!((0..2_000).step_by(3).all(|v| bloom.might_contain(v)));
    }

    #[test]
    fn sparse_filter_rejects_most_absent_ids() {
        let mut bloom = VertexBloom::new(8192, 3, 1);
        for v in 0..64 {
            bloom.insert(v);
        }
        let false_positives = (10_000..20_000).filter(|&v| bloom.might_contain(v)).count();
        assert!(false_positives < 100, "{false_positives} false positives");
    }

    #[test]
    fn rebuild_forgets_removed_ids() {
        let mut bloom = VertexBloom::new(8192, 3, 1);
        bloom.insert(10);
        bloom.insert(11);
        bloom.rebuild([11]);
        assert!(bloom.might_contain(11));
        assert_eq!(bloom.insertions(), 1);
    }

    #[test]
    fn size_is_rounded_to_words() {
        assert_eq!(VertexBloom::new(100, 3, 0).bit_len(), 128);
        assert_eq!(VertexBloom::new(0, 3, 0).bit_len(), 64);
    }
}

//! Configuration for a durable matching run.
//!
//! The engine reads a single [`Config`] per query. It is built once through
//! [`Config::builder`] and is read-only afterwards.
//!
//! Quick examples
//!
//! Default run with `k = 3` and stale Bloom filters during trimming:
//! ```
//! use durable_common::Config;
//! let cfg = Config::builder().k(3).build();
//! assert_eq!(cfg.k, 3);
//! ```
//!
//! Exact Bloom filters (rebuilt after every trim pass):
//! ```
//! use durable_common::{BloomMode, Config};
//! let cfg = Config::builder().bloom_mode(BloomMode::Rebuild).build();
//! assert_eq!(cfg.bloom_mode, BloomMode::Rebuild);
//! ```

use serde::{Deserialize, Serialize};

/// Lower bound on the number of bits of any per-node Bloom filter.
pub const MIN_BLOOM_BITS: usize = 8192;

/// How per-node Bloom filters are maintained while candidates are trimmed.
///
/// - Stale: filters keep every id ever inserted. They over-approximate the
///   live candidate set, which is safe because every positive answer is
///   confirmed against the exact membership set.
/// - Rebuild: filters are rebuilt from the live candidates after each trim
///   pass, so they stay tight at the cost of a rebuild per node and pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloomMode {
    /// Never rebuild during trimming.
    #[default]
    Stale,
    /// Rebuild after every trim pass.
    Rebuild,
}

impl std::fmt::Display for BloomMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stale => write!(f, "stale"),
            Self::Rebuild => write!(f, "rebuild"),
        }
    }
}

/// Global search configuration.
///
/// - k: minimum number of shared timestamps every matched edge must have.
/// - bloom_mode: see [`BloomMode`].
/// - bloom_bits_per_vertex / bloom_hashes: sizing of the per-node filters.
/// - seed: salts the Bloom hash functions and the fallback vertex labeling.
/// - strict_root_filter: apply degree, neighbor-label and duration tests to
///   root candidates (otherwise every vertex carrying the root label is kept).
/// - parallel: enumerate root-to-leaf paths in parallel when the engine is
///   compiled with its `rayon` feature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum durable-overlap threshold, always at least 1.
    pub k: usize,
    /// Bloom filter maintenance during trimming.
    pub bloom_mode: BloomMode,
    /// Filter bits allotted per data vertex.
    pub bloom_bits_per_vertex: usize,
    /// Number of hash functions per filter.
    pub bloom_hashes: u32,
    /// Seed for Bloom salts and fallback labels.
    pub seed: u64,
    /// Whether root candidates are pre-filtered.
    pub strict_root_filter: bool,
    /// Whether independent paths may be enumerated in parallel.
    pub parallel: bool,
}

impl Config {
    /// Start a builder holding the default configuration.
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Filter size in bits for a data graph with `vertex_count` vertices.
    #[must_use]
    pub fn bloom_bits(&self, vertex_count: usize) -> usize {
        vertex_count
            .saturating_mul(self.bloom_bits_per_vertex)
            .max(MIN_BLOOM_BITS)
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::new().build()
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    k: usize,
    bloom_mode: BloomMode,
    bloom_bits_per_vertex: usize,
    bloom_hashes: u32,
    seed: u64,
    strict_root_filter: bool,
    parallel: bool,
}

impl ConfigBuilder {
    /// Defaults: `k = 3`, stale filters, 8 bits per vertex, 3 hashes, seed 42.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            k: 3,
            bloom_mode: BloomMode::Stale,
            bloom_bits_per_vertex: 8,
            bloom_hashes: 3,
            seed: 42,
            strict_root_filter: true,
            parallel: true,
        }
    }

    /// Minimum durable-overlap threshold. Values below 1 are clamped to 1.
    #[must_use]
    pub const fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Bloom filter maintenance during trimming.
    #[must_use]
    pub const fn bloom_mode(mut self, mode: BloomMode) -> Self {
        self.bloom_mode = mode;
        self
    }

    /// Filter bits allotted per data vertex.
    #[must_use]
    pub const fn bloom_bits_per_vertex(mut self, bits: usize) -> Self {
        self.bloom_bits_per_vertex = bits;
        self
    }

    /// Number of hash functions per filter. Values below 1 are clamped to 1.
    #[must_use]
    pub const fn bloom_hashes(mut self, hashes: u32) -> Self {
        self.bloom_hashes = hashes;
        self
    }

    /// Seed for Bloom salts and fallback labels.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Toggle the root candidate pre-filter.
    #[must_use]
    pub const fn strict_root_filter(mut self, strict: bool) -> Self {
        self.strict_root_filter = strict;
        self
    }

    /// Toggle parallel path enumeration.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Finish the configuration.
    #[must_use]
    pub const fn build(self) -> Config {
        Config {
            k: if self.k == 0 { 1 } else { self.k },
            bloom_mode: self.bloom_mode,
            bloom_bits_per_vertex: self.bloom_bits_per_vertex,
            bloom_hashes: if self.bloom_hashes == 0 {
                1
            } else {
                self.bloom_hashes
            },
            seed: self.seed,
            strict_root_filter: self.strict_root_filter,
            parallel: self.parallel,
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_k_is_clamped() {
        let cfg = Config::builder().k(0).build();
        assert_eq!(cfg.k, 1);
    }

    #[test]
    fn bloom_bits_has_floor() {
        let cfg = Config::default();
        assert_eq!(cfg.bloom_bits(3), MIN_BLOOM_BITS);
        assert_eq!(cfg.bloom_bits(10_000), 80_000);
    }

    #[test]
    fn builder_overrides_defaults() {
        let cfg = Config::builder()
            .k(5)
            .bloom_mode(BloomMode::Rebuild)
            .seed(7)
            .strict_root_filter(false)
            .parallel(false)
            .build();
        assert_eq!(cfg.k, 5);
        assert_eq!(cfg.bloom_mode, BloomMode::Rebuild);
        assert_eq!(cfg.seed, 7);
        assert!(!cfg.strict_root_filter);
        assert!(!cfg.parallel);
    }
}

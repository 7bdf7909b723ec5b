//! Byte-denominated thresholds, turned into per-element-type strategies.

use crate::growth::{largest_power_of_two, GrowthStrategy};

/// Configuration for an [`ArrayFactory`](crate::ArrayFactory).
///
/// Thresholds are given in bytes so the same configuration yields element
/// counts scaled to each scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Initial capacity (in elements) of growable containers.
    pub initial_capacity: u64,
    /// Growth chunk for dense storage.
    pub dense_chunk_bytes: u64,
    /// Largest single dense leaf before the factory segments.
    pub dense_segment_bytes: u64,
    /// Arrays at or below this size are never sparse.
    pub sparse_chunk_bytes: u64,
    /// Largest single sparse container before the factory segments.
    pub sparse_segment_bytes: u64,
    /// Hard limit for one dense allocation.
    pub max_leaf_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: GrowthStrategy::DEFAULT_INITIAL,
            dense_chunk_bytes: 1 << 15,
            dense_segment_bytes: 1 << 26,
            sparse_chunk_bytes: 1 << 15,
            sparse_segment_bytes: 1 << 49,
            max_leaf_bytes: isize::MAX as u64,
        }
    }
}

impl Config {
    pub fn dense_strategy(&self, element_size: usize) -> GrowthStrategy {
        self.strategy(
            element_size,
            self.dense_chunk_bytes,
            self.dense_segment_bytes,
        )
    }

    pub fn sparse_strategy(&self, element_size: usize) -> GrowthStrategy {
        self.strategy(
            element_size,
            self.sparse_chunk_bytes,
            self.sparse_segment_bytes,
        )
    }

    /// Largest element count a single dense leaf may hold.
    pub fn max_leaf_len(&self, element_size: usize) -> u64 {
        (self.max_leaf_bytes / element_size.max(1) as u64).max(1)
    }

    fn strategy(&self, element_size: usize, chunk_bytes: u64, segment_bytes: u64) -> GrowthStrategy {
        let size = element_size.max(1) as u64;
        GrowthStrategy::new(
            self.initial_capacity,
            largest_power_of_two(chunk_bytes / size),
            largest_power_of_two(segment_bytes / size),
        )
    }
}

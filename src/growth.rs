//! Capacity planning for growable and partitioned storage.
//!
//! A [`GrowthStrategy`] carries three capacities:
//!
//! - `initial`: the capacity a fresh growable container starts with
//! - `chunk`: below it capacities grow multiplicatively, above it by whole chunks
//! - `segment`: above it a single leaf is replaced by a segmented array
//!
//! `chunk` and `segment` are always powers of two and `segment >= chunk`.

/// Inverse of the golden ratio, the step used below the chunk threshold.
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Largest power of two not greater than `n` (`1` for `n == 0`).
#[inline]
pub fn largest_power_of_two(n: u64) -> u64 {
    if n == 0 {
        1
    } else {
        1u64 << (63 - n.leading_zeros())
    }
}

/// Immutable growth policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GrowthStrategy {
    initial: u64,
    chunk: u64,
    segment: u64,
}

impl GrowthStrategy {
    pub const DEFAULT_INITIAL: u64 = 16;
    pub const DEFAULT_CHUNK: u64 = 512;
    pub const DEFAULT_SEGMENT: u64 = 16_384;

    /// Normalizes the arguments: `chunk` and `segment` are rounded down to
    /// powers of two, `segment` is raised to `chunk` if needed and `initial`
    /// is clamped into `1..=chunk`.
    pub fn new(initial: u64, chunk: u64, segment: u64) -> Self {
        let chunk = largest_power_of_two(chunk);
        let segment = largest_power_of_two(segment).max(chunk);
        Self {
            initial: initial.clamp(1, chunk),
            chunk,
            segment,
        }
    }

    pub fn builder() -> GrowthStrategyBuilder {
        GrowthStrategyBuilder::default()
    }

    #[inline]
    pub fn initial(&self) -> u64 {
        self.initial
    }

    #[inline]
    pub fn chunk(&self) -> u64 {
        self.chunk
    }

    #[inline]
    pub fn segment(&self) -> u64 {
        self.segment
    }

    /// Number of low index bits addressing inside one segment.
    #[inline]
    pub fn index_bits(&self) -> u32 {
        self.segment.trailing_zeros()
    }

    #[inline]
    pub fn is_chunked(&self, count: u64) -> bool {
        count > self.chunk
    }

    #[inline]
    pub fn is_segmented(&self, count: u64) -> bool {
        count > self.segment
    }

    /// Next capacity for a container currently holding `current` slots.
    ///
    /// The result is at least `current + 1` and never smaller than `initial`.
    /// The one exception is `current == u64::MAX`, where nothing larger
    /// exists and the result is `u64::MAX` itself. Below the chunk threshold it is the
    /// smallest value of the sequence `chunk, chunk/φ, chunk/φ², ...` that
    /// still fits `current + 1`; from the chunk threshold on it is the next
    /// whole multiple of `chunk`.
    pub fn grow(&self, current: u64) -> u64 {
        let required = current.saturating_add(1);

        if required >= self.chunk {
            return required.div_ceil(self.chunk).saturating_mul(self.chunk);
        }

        let mut capacity = self.chunk;
        loop {
            let smaller = (capacity as f64 * INV_PHI) as u64;
            if smaller < required || smaller >= capacity {
                break;
            }
            capacity = smaller;
        }
        capacity.max(self.initial)
    }
}

impl Default for GrowthStrategy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_INITIAL,
            Self::DEFAULT_CHUNK,
            Self::DEFAULT_SEGMENT,
        )
    }
}

/// Builder for [`GrowthStrategy`]; normalization happens in `build`.
#[derive(Clone, Copy, Debug)]
pub struct GrowthStrategyBuilder {
    initial: u64,
    chunk: u64,
    segment: u64,
}

impl Default for GrowthStrategyBuilder {
    fn default() -> Self {
        Self {
            initial: GrowthStrategy::DEFAULT_INITIAL,
            chunk: GrowthStrategy::DEFAULT_CHUNK,
            segment: GrowthStrategy::DEFAULT_SEGMENT,
        }
    }
}

impl GrowthStrategyBuilder {
    pub fn initial(mut self, initial: u64) -> Self {
        self.initial = initial;
        self
    }

    pub fn chunk(mut self, chunk: u64) -> Self {
        self.chunk = chunk;
        self
    }

    pub fn segment(mut self, segment: u64) -> Self {
        self.segment = segment;
        self
    }

    pub fn build(self) -> GrowthStrategy {
        GrowthStrategy::new(self.initial, self.chunk, self.segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_power_of_two() {
        assert_eq!(largest_power_of_two(0), 1);
        assert_eq!(largest_power_of_two(1), 1);
        assert_eq!(largest_power_of_two(600), 512);
        assert_eq!(largest_power_of_two(1024), 1024);
        assert_eq!(largest_power_of_two(u64::MAX), 1 << 63);
    }

    #[test]
    fn test_thresholds() {
        let s = GrowthStrategy::builder().chunk(512).segment(32_768).build();
        assert!(s.is_chunked(600));
        assert!(!s.is_segmented(600));
        assert!(s.is_segmented(40_000));
        assert!(!s.is_chunked(512));
        assert_eq!(s.index_bits(), 15);
    }

    #[test]
    fn test_builder_normalizes() {
        let s = GrowthStrategy::builder()
            .initial(0)
            .chunk(1000)
            .segment(100)
            .build();
        assert_eq!(s.chunk(), 512);
        assert_eq!(s.segment(), 512);
        assert_eq!(s.initial(), 1);

        let s = GrowthStrategy::new(10_000, 64, 4096);
        assert_eq!(s.initial(), 64);
    }

    #[test]
    fn test_grow_below_chunk() {
        let s = GrowthStrategy::new(1, 512, 32_768);
        let mut capacity = 0;
        let mut seen = Vec::new();
        while capacity < 512 {
            let next = s.grow(capacity);
            assert!(next > capacity);
            assert!(next <= 512);
            seen.push(next);
            capacity = next;
        }
        // Geometric steps, far fewer reallocations than capacity.
        assert!(seen.len() < 20, "{seen:?}");
        assert_eq!(*seen.last().unwrap(), 512);
    }

    #[test]
    fn test_grow_respects_initial() {
        let s = GrowthStrategy::new(16, 512, 32_768);
        assert_eq!(s.grow(0), 16);
        assert_eq!(s.grow(15), 16);
        assert_eq!(s.grow(16), 27);
    }

    #[test]
    fn test_grow_by_chunks() {
        let s = GrowthStrategy::new(16, 512, 32_768);
        assert_eq!(s.grow(511), 512);
        assert_eq!(s.grow(512), 1024);
        assert_eq!(s.grow(1000), 1024);
        assert_eq!(s.grow(1024), 1536);
    }

    #[test]
    fn test_grow_monotonic() {
        let s = GrowthStrategy::default();
        let mut prev = 0;
        for current in 0..5000u64 {
            let next = s.grow(current);
            assert!(next > current, "grow({current}) = {next}");
            assert!(next >= prev, "grow not monotonic at {current}");
            prev = next;
        }
    }

    #[test]
    fn test_grow_saturates() {
        let s = GrowthStrategy::default();
        // Only the largest value fails to grow.
        assert_eq!(s.grow(u64::MAX), u64::MAX);
        assert_eq!(s.grow(u64::MAX - 1), u64::MAX);
        let below = u64::MAX - s.chunk();
        assert!(s.grow(below) > below);
    }
}

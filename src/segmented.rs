//! Array-of-arrays storage for element counts beyond one leaf.
//!
//! Every segment except the last holds exactly `2^index_bits` elements, so an
//! external index splits into a segment selector (high bits) and an offset
//! inside the segment (low bits):
//!
//! ```text
//! index_bits = 3, index = 10 = 0b1_010  ->  segment 1, offset 2
//! ```
//!
//! Range operations with a step no larger than the segment size are handed to
//! the segments as local range calls; larger steps go element by element.

use tracing::debug;

use crate::access::{strided, Storage};
use crate::basic::BasicArray;
use crate::dense::DenseArray;
use crate::error::{ArrayError, ArrayResult};
use crate::growth::GrowthStrategy;
use crate::scalar::Scalar;
use crate::sparse::SparseArray;

/// What new segments are made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Dense,
    Sparse(GrowthStrategy),
}

impl SegmentKind {
    fn make<T: Scalar>(self, count: u64) -> ArrayResult<BasicArray<T>> {
        Ok(match self {
            SegmentKind::Dense => BasicArray::Dense(DenseArray::new(count)?),
            SegmentKind::Sparse(strategy) => {
                BasicArray::Sparse(SparseArray::with_strategy(count, strategy))
            }
        })
    }
}

/// One segment's share of a strided range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Run {
    pub segment: usize,
    /// Local first position inside the segment.
    pub first: u64,
    /// Local limit inside the segment.
    pub limit: u64,
    /// External index of the segment's offset 0.
    pub base: u64,
}

/// Splits `[first, limit)` with `step` into per-segment runs, carrying the
/// stride phase from one segment into the next.
#[derive(Clone, Debug)]
pub(crate) struct SegmentRuns {
    next: u64,
    limit: u64,
    step: u64,
    index_bits: u32,
}

impl SegmentRuns {
    pub(crate) fn new(first: u64, limit: u64, step: u64, index_bits: u32) -> Self {
        assert!(step > 0, "step must be positive");
        Self {
            next: first,
            limit,
            step,
            index_bits,
        }
    }
}

impl Iterator for SegmentRuns {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        if self.next >= self.limit {
            return None;
        }
        let segment = self.next >> self.index_bits;
        let base = segment << self.index_bits;
        let end = base
            .saturating_add(1u64 << self.index_bits)
            .min(self.limit);

        let run = Run {
            segment: segment as usize,
            first: self.next - base,
            limit: end - base,
            base,
        };

        let hits = (end - self.next - 1) / self.step + 1;
        self.next = self.next.saturating_add(hits.saturating_mul(self.step));
        Some(run)
    }
}

/// Segmented array of dense or sparse leaves.
#[derive(Clone, Debug)]
pub struct SegmentedArray<T> {
    segments: Vec<BasicArray<T>>,
    index_bits: u32,
    index_mask: u64,
    segment_size: u64,
    count: u64,
    kind: SegmentKind,
}

impl<T: Scalar> SegmentedArray<T> {
    /// Wraps pre-built segments.
    ///
    /// The first segment's size must be a power of two, every segment but
    /// the last must match it, and the last may be smaller. Segments are
    /// leaves: all dense or all sparse, never segmented themselves. Sparse
    /// segments added by [`grow`](Self::grow) use the first one's strategy.
    pub fn from_segments(segments: Vec<BasicArray<T>>) -> ArrayResult<Self> {
        let first = segments.first().ok_or(ArrayError::NoSegments)?;
        let segment_size = first.count();
        if !segment_size.is_power_of_two() {
            return Err(ArrayError::SegmentSizeNotPowerOfTwo { size: segment_size });
        }

        let kind = match first {
            BasicArray::Dense(_) => SegmentKind::Dense,
            BasicArray::Sparse(sparse) => SegmentKind::Sparse(*sparse.strategy()),
            BasicArray::Segmented(_) => return Err(ArrayError::NestedSegments { segment: 0 }),
        };

        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate().skip(1) {
            match (kind, segment) {
                (_, BasicArray::Segmented(_)) => {
                    return Err(ArrayError::NestedSegments { segment: i });
                }
                (SegmentKind::Dense, BasicArray::Dense(_))
                | (SegmentKind::Sparse(_), BasicArray::Sparse(_)) => {}
                _ => return Err(ArrayError::MixedSegments { segment: i }),
            }

            let actual = segment.count();
            if i < last && actual != segment_size {
                return Err(ArrayError::UnequalSegments {
                    segment: i,
                    expected: segment_size,
                    actual,
                });
            }
            if i == last && actual > segment_size {
                return Err(ArrayError::LastSegmentTooLarge {
                    last: actual,
                    segment_size,
                });
            }
        }

        let index_bits = segment_size.trailing_zeros();
        let count = last as u64 * segment_size + segments[last].count();

        Ok(Self {
            segments,
            index_bits,
            index_mask: segment_size - 1,
            segment_size,
            count,
            kind,
        })
    }

    /// Uniform partition of `count` elements into `2^index_bits`-sized
    /// segments, the remainder going into a shorter last segment.
    pub fn partitioned(count: u64, index_bits: u32, kind: SegmentKind) -> ArrayResult<Self> {
        assert!(index_bits < 64, "index_bits must be below 64");
        let segment_size = 1u64 << index_bits;
        let index_mask = segment_size - 1;
        let full = count >> index_bits;
        let remainder = count & index_mask;
        let number = full + u64::from(remainder > 0);

        let number = usize::try_from(number).map_err(|_| ArrayError::CapacityOverflow {
            requested: count,
            limit: usize::MAX as u64,
        })?;
        let mut segments = Vec::with_capacity(number.max(1));
        for _ in 0..full {
            segments.push(kind.make(segment_size)?);
        }
        if remainder > 0 || segments.is_empty() {
            segments.push(kind.make(remainder)?);
        }

        Ok(Self {
            segments,
            index_bits,
            index_mask,
            segment_size,
            count,
            kind,
        })
    }

    #[inline]
    pub fn segment_size(&self) -> u64 {
        self.segment_size
    }

    #[inline]
    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    #[inline]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    #[inline]
    pub fn segments(&self) -> &[BasicArray<T>] {
        &self.segments
    }

    /// Segment number and offset of an external index.
    #[inline]
    pub fn locate(&self, index: u64) -> (usize, u64) {
        ((index >> self.index_bits) as usize, index & self.index_mask)
    }

    pub(crate) fn has_sparse_segments(&self) -> bool {
        self.segments.iter().any(BasicArray::is_sparse)
    }

    /// Adds room for at least one more element.
    ///
    /// A short last segment is replaced by a full-size copy; a full one gets
    /// a new full-size segment appended. The array is consumed and the grown
    /// one returned: callers must continue with the result.
    pub fn grow(mut self) -> Self {
        let last = self.segments.len() - 1;
        let last_count = self.segments[last].count();

        if last_count < self.segment_size {
            let full = match &self.segments[last] {
                BasicArray::Dense(short) => {
                    let mut data = short.as_slice().to_vec();
                    data.resize(self.segment_size as usize, T::ZERO);
                    BasicArray::Dense(DenseArray::from_vec(data))
                }
                short => {
                    let mut full = self.blank_segment();
                    for (index, value) in short.nonzeros() {
                        full.set(index, value);
                    }
                    full
                }
            };
            self.segments[last] = full;
            debug!(
                segments = self.segments.len(),
                segment_size = self.segment_size,
                "enlarged last segment"
            );
        } else {
            let segment = self.blank_segment();
            self.segments.push(segment);
            debug!(
                segments = self.segments.len(),
                segment_size = self.segment_size,
                "appended segment"
            );
        }

        self.count = self.segments.len() as u64 * self.segment_size;
        self
    }

    fn blank_segment(&self) -> BasicArray<T> {
        let size = self.segment_size;
        match self.kind {
            // Full segment size, even when the array so far is one short segment.
            SegmentKind::Dense => {
                BasicArray::Dense(DenseArray::from_vec(vec![T::ZERO; size as usize]))
            }
            SegmentKind::Sparse(strategy) => {
                BasicArray::Sparse(SparseArray::with_strategy(size, strategy))
            }
        }
    }

    /// Stored non-zero entries of all segments with external indices.
    pub fn nonzeros(&self) -> impl Iterator<Item = (u64, T)> + '_ {
        let bits = self.index_bits;
        self.segments
            .iter()
            .enumerate()
            .flat_map(move |(s, segment)| {
                let base = (s as u64) << bits;
                segment.nonzeros().map(move |(i, v)| (base + i, v))
            })
    }

    #[inline]
    fn runs(&self, first: u64, limit: u64, step: u64) -> SegmentRuns {
        SegmentRuns::new(first, limit, step, self.index_bits)
    }

    pub(crate) fn assign(&mut self, index: u64, value: T) {
        let (segment, offset) = self.locate(index);
        self.segments[segment].assign(offset, value);
    }
}

impl<T: Scalar> Storage<T> for SegmentedArray<T> {
    #[inline]
    fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    fn get(&self, index: u64) -> T {
        let (segment, offset) = self.locate(index);
        self.segments[segment].get(offset)
    }

    #[inline]
    fn set(&mut self, index: u64, value: T) {
        let (segment, offset) = self.locate(index);
        self.segments[segment].set(offset, value);
    }

    #[inline]
    fn add(&mut self, index: u64, addend: T) {
        let (segment, offset) = self.locate(index);
        self.segments[segment].add(offset, addend);
    }

    fn fill_range(&mut self, first: u64, limit: u64, step: u64, value: T) {
        if step <= self.segment_size {
            for run in self.runs(first, limit, step) {
                self.segments[run.segment].fill_range(run.first, run.limit, step, value);
            }
        } else {
            for i in strided(first, limit, step) {
                self.set(i, value);
            }
        }
    }

    fn fill_range_with<G: FnMut() -> T>(&mut self, first: u64, limit: u64, step: u64, supplier: &mut G) {
        if step <= self.segment_size {
            for run in self.runs(first, limit, step) {
                self.segments[run.segment].fill_range_with(run.first, run.limit, step, &mut *supplier);
            }
        } else {
            for i in strided(first, limit, step) {
                self.set(i, supplier());
            }
        }
    }

    /// Each sparse segment visits its own implicit zero, so a range over
    /// sparse segments sees zero once per touched segment with a gap, not
    /// once per call.
    fn visit_range<V: FnMut(T)>(&self, first: u64, limit: u64, step: u64, visitor: &mut V) {
        if step <= self.segment_size {
            for run in self.runs(first, limit, step) {
                self.segments[run.segment].visit_range(run.first, run.limit, step, &mut *visitor);
            }
        } else {
            for i in strided(first, limit, step) {
                visitor(self.get(i));
            }
        }
    }

    /// Sparse segments cannot apply a transform that moves zero; that check
    /// runs before any segment is touched.
    fn modify_range<F: Fn(T) -> T>(&mut self, first: u64, limit: u64, step: u64, function: &F) -> ArrayResult<()> {
        if self.has_sparse_segments() && !function(T::ZERO).is_zero() {
            return Err(ArrayError::ZeroNotPreserved);
        }
        if step <= self.segment_size {
            for run in self.runs(first, limit, step) {
                self.segments[run.segment].modify_range(run.first, run.limit, step, function)?;
            }
        } else {
            for i in strided(first, limit, step) {
                let value = function(self.get(i));
                self.set(i, value);
            }
        }
        Ok(())
    }

    fn exchange(&mut self, first_a: u64, first_b: u64, step: u64, count: u64) {
        for k in 0..count {
            let a = first_a + k * step;
            let b = first_b + k * step;
            let value_a = self.get(a);
            let value_b = self.get(b);
            self.assign(a, value_b);
            self.assign(b, value_a);
        }
    }

    fn index_of_largest(&self, first: u64, limit: u64, step: u64) -> u64 {
        let mut largest = first;
        let mut largest_norm = f64::NEG_INFINITY;

        if step <= self.segment_size {
            for run in self.runs(first, limit, step) {
                let segment = &self.segments[run.segment];
                let local = segment.index_of_largest(run.first, run.limit, step);
                let norm = segment.get(local).norm();
                if norm > largest_norm {
                    largest = run.base + local;
                    largest_norm = norm;
                }
            }
        } else {
            for i in strided(first, limit, step) {
                let norm = self.get(i).norm();
                if norm > largest_norm {
                    largest = i;
                    largest_norm = norm;
                }
            }
        }
        largest
    }
}

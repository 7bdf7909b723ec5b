//! Growable list of numbers.
//!
//! Capacity follows the [`GrowthStrategy`]: multiplicative steps below the
//! chunk, whole chunks above it, capped at one segment. A full segment-sized
//! leaf is then turned into a [`SegmentedArray`] and further growth appends
//! segments.

use std::mem;

use tracing::debug;

use crate::access::Storage;
use crate::basic::BasicArray;
use crate::config::Config;
use crate::dense::DenseArray;
use crate::error::ArrayResult;
use crate::growth::GrowthStrategy;
use crate::scalar::Scalar;
use crate::segmented::{SegmentKind, SegmentedArray};

#[derive(Clone, Debug)]
enum Backing<T> {
    Flat(DenseArray<T>),
    Segmented(SegmentedArray<T>),
}

#[derive(Clone, Debug)]
pub struct NumberList<T> {
    backing: Backing<T>,
    len: u64,
    strategy: GrowthStrategy,
}

impl<T: Scalar> Default for NumberList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> NumberList<T> {
    pub fn new() -> Self {
        Self::with_strategy(Config::default().dense_strategy(T::element_size()))
    }

    pub fn with_strategy(strategy: GrowthStrategy) -> Self {
        Self {
            backing: Backing::Flat(DenseArray::from_vec(vec![T::ZERO; strategy.initial() as usize])),
            len: 0,
            strategy,
        }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> u64 {
        match &self.backing {
            Backing::Flat(flat) => flat.count(),
            Backing::Segmented(segmented) => segmented.count(),
        }
    }

    pub fn strategy(&self) -> &GrowthStrategy {
        &self.strategy
    }

    pub fn is_segmented(&self) -> bool {
        matches!(self.backing, Backing::Segmented(_))
    }

    pub fn push(&mut self, value: T) -> ArrayResult<()> {
        if self.len == self.capacity() {
            self.grow()?;
        }
        let at = self.len;
        self.write(at, value);
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, index: u64) -> T {
        assert!(index < self.len, "index {index} out of bounds for length {}", self.len);
        match &self.backing {
            Backing::Flat(flat) => flat.get(index),
            Backing::Segmented(segmented) => segmented.get(index),
        }
    }

    pub fn set(&mut self, index: u64, value: T) {
        assert!(index < self.len, "index {index} out of bounds for length {}", self.len);
        self.write(index, value);
    }

    /// Forgets the contents; capacity is kept.
    pub fn clear(&mut self) {
        let len = self.len;
        match &mut self.backing {
            Backing::Flat(flat) => flat.fill_range(0, len, 1, T::ZERO),
            Backing::Segmented(segmented) => segmented.fill_range(0, len, 1, T::ZERO),
        }
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// The first `len()` elements as a fixed-size array.
    ///
    /// A flat list is truncated in place; a segmented one is copied into
    /// segments of the same size holding exactly `len()` elements.
    pub fn into_array(self) -> ArrayResult<BasicArray<T>> {
        let len = self.len;
        match self.backing {
            Backing::Flat(flat) => {
                let mut values = flat.into_vec();
                values.truncate(len as usize);
                Ok(DenseArray::from_vec(values).into())
            }
            Backing::Segmented(segmented) => {
                let index_bits = segmented.index_bits();
                let mut array = SegmentedArray::partitioned(len, index_bits, SegmentKind::Dense)?;
                let mut source = (0..len).map(|i| segmented.get(i));
                array.fill_range_with(0, len, 1, &mut || source.next().unwrap_or(T::ZERO));
                Ok(array.into())
            }
        }
    }

    #[inline]
    fn write(&mut self, index: u64, value: T) {
        match &mut self.backing {
            Backing::Flat(flat) => flat.set(index, value),
            Backing::Segmented(segmented) => segmented.set(index, value),
        }
    }

    fn grow(&mut self) -> ArrayResult<()> {
        let segment = self.strategy.segment();
        if let Backing::Flat(flat) = &self.backing {
            if flat.count() < segment {
                let capacity = self.strategy.grow(flat.count()).min(segment);
                self.backing = Backing::Flat(flat.resized(capacity)?);
                return Ok(());
            }
        }

        let empty = Backing::Flat(DenseArray::from_vec(Vec::new()));
        self.backing = match mem::replace(&mut self.backing, empty) {
            // A flat backing only reaches this point at exactly one segment.
            Backing::Flat(full) => {
                let tail = DenseArray::from_vec(vec![T::ZERO; segment as usize]);
                let segmented = SegmentedArray::from_segments(vec![full.into(), tail.into()])?;
                debug!(capacity = segmented.count(), segment, "list switched to segments");
                Backing::Segmented(segmented)
            }
            Backing::Segmented(segmented) => Backing::Segmented(segmented.grow()),
        };
        Ok(())
    }
}

impl<T: Scalar> Extend<T> for NumberList<T> {
    /// Panics if the list cannot grow.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if let Err(err) = self.push(value) {
                panic!("failed to extend list: {err}");
            }
        }
    }
}

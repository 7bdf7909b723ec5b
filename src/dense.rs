//! Flat dense leaf storage.

use crate::access::{strided, Storage};
use crate::error::{ArrayError, ArrayResult};
use crate::scalar::Scalar;

#[inline]
fn slot(index: u64) -> usize {
    // Out-of-range values still panic at the slice access.
    usize::try_from(index).unwrap_or(usize::MAX)
}

/// A fixed-size contiguous buffer of `T`.
///
/// This is the leaf every other representation bottoms out in: sparse arrays
/// keep their values in one, segmented arrays are made of them.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseArray<T> {
    data: Vec<T>,
}

impl<T: Scalar> DenseArray<T> {
    /// Largest element count addressable by one leaf.
    pub const MAX_LEN: u64 = isize::MAX as u64 / std::mem::size_of::<T>() as u64;

    /// Zero-filled leaf of `count` elements.
    pub fn new(count: u64) -> ArrayResult<Self> {
        Self::with_limit(count, Self::MAX_LEN)
    }

    /// Zero-filled leaf, rejecting counts above `limit` (itself capped by
    /// [`MAX_LEN`](Self::MAX_LEN)).
    pub fn with_limit(count: u64, limit: u64) -> ArrayResult<Self> {
        let limit = limit.min(Self::MAX_LEN);
        if count > limit {
            return Err(ArrayError::CapacityOverflow {
                requested: count,
                limit,
            });
        }
        Ok(Self {
            data: vec![T::ZERO; slot(count)],
        })
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    pub fn from_slice(values: &[T]) -> Self {
        Self {
            data: values.to_vec(),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Copy into a leaf of `new_count` elements, truncating or zero-extending.
    pub fn resized(&self, new_count: u64) -> ArrayResult<Self> {
        let mut grown = Self::new(new_count)?;
        let kept = self.data.len().min(grown.data.len());
        grown.data[..kept].copy_from_slice(&self.data[..kept]);
        Ok(grown)
    }

    /// Stored non-zero elements with their indices.
    pub fn nonzeros(&self) -> impl DoubleEndedIterator<Item = (u64, T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_zero())
            .map(|(i, &value)| (i as u64, value))
    }
}

impl<T: Scalar> Storage<T> for DenseArray<T> {
    #[inline]
    fn count(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline]
    fn get(&self, index: u64) -> T {
        self.data[slot(index)]
    }

    #[inline]
    fn set(&mut self, index: u64, value: T) {
        self.data[slot(index)] = value;
    }

    #[inline]
    fn add(&mut self, index: u64, addend: T) {
        let at = slot(index);
        self.data[at] = self.data[at] + addend;
    }

    fn fill_range(&mut self, first: u64, limit: u64, step: u64, value: T) {
        if step == 1 && first < limit {
            self.data[slot(first)..slot(limit)].fill(value);
        } else {
            for i in strided(first, limit, step) {
                self.data[slot(i)] = value;
            }
        }
    }

    fn fill_range_with<G: FnMut() -> T>(&mut self, first: u64, limit: u64, step: u64, supplier: &mut G) {
        for i in strided(first, limit, step) {
            self.data[slot(i)] = supplier();
        }
    }

    fn visit_range<V: FnMut(T)>(&self, first: u64, limit: u64, step: u64, visitor: &mut V) {
        if step == 1 && first < limit {
            for &value in &self.data[slot(first)..slot(limit)] {
                visitor(value);
            }
        } else {
            for i in strided(first, limit, step) {
                visitor(self.data[slot(i)]);
            }
        }
    }

    fn modify_range<F: Fn(T) -> T>(&mut self, first: u64, limit: u64, step: u64, function: &F) -> ArrayResult<()> {
        if step == 1 && first < limit {
            for value in &mut self.data[slot(first)..slot(limit)] {
                *value = function(*value);
            }
        } else {
            for i in strided(first, limit, step) {
                let at = slot(i);
                self.data[at] = function(self.data[at]);
            }
        }
        Ok(())
    }

    fn exchange(&mut self, first_a: u64, first_b: u64, step: u64, count: u64) {
        for k in 0..count {
            self.data
                .swap(slot(first_a + k * step), slot(first_b + k * step));
        }
    }

    fn index_of_largest(&self, first: u64, limit: u64, step: u64) -> u64 {
        let mut largest = first;
        let mut largest_norm = f64::NEG_INFINITY;
        for i in strided(first, limit, step) {
            let norm = self.data[slot(i)].norm();
            if norm > largest_norm {
                largest = i;
                largest_norm = norm;
            }
        }
        largest
    }
}

//! Coordinate-list sparse storage.
//!
//! A [`SparseArray`] keeps a sorted list of external indices and a parallel
//! dense leaf of values. Every index that is not stored reads as zero.
//!
//! # Layout
//!
//! ```text
//! indices: [ 3 | 7 | 10 | . | . ]   sorted, strictly increasing
//! values:  [2.0|9.0| 5.0| . | . ]   values[i] belongs to indices[i]
//!            <-- actual_length -->
//!            <------- capacity ------->
//! ```
//!
//! Inserting shifts the tail right by one slot (reallocating through the
//! [`GrowthStrategy`] when full); removing shifts it left. Capacity is a high
//! water mark and never shrinks.

mod nonzeros;

pub use nonzeros::Nonzeros;

use std::cmp::Ordering;

use tracing::trace;

use crate::access::{on_stride, strided, strided_len, Storage};
use crate::dense::DenseArray;
use crate::error::{ArrayError, ArrayResult};
use crate::growth::GrowthStrategy;
use crate::scalar::Scalar;

/// Outcome of searching the stored indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// The index is stored at this internal position.
    Found(usize),
    /// The index is absent; inserting it belongs at this internal position.
    Vacant(usize),
}

impl SearchResult {
    #[inline]
    pub fn found(self) -> Option<usize> {
        match self {
            SearchResult::Found(pos) => Some(pos),
            SearchResult::Vacant(_) => None,
        }
    }

    /// The internal position, whether found or the insertion point.
    #[inline]
    pub fn position(self) -> usize {
        match self {
            SearchResult::Found(pos) | SearchResult::Vacant(pos) => pos,
        }
    }
}

/// Sparse array of `count` logical elements.
#[derive(Clone, Debug)]
pub struct SparseArray<T> {
    count: u64,
    actual_length: usize,
    /// Length equals capacity; only `..actual_length` is meaningful.
    indices: Vec<u64>,
    values: DenseArray<T>,
    strategy: GrowthStrategy,
}

impl<T: Scalar> SparseArray<T> {
    pub fn new(count: u64) -> Self {
        Self::with_strategy(count, GrowthStrategy::default())
    }

    /// Empty array whose capacity starts at `strategy.initial()` (or `count`
    /// if smaller).
    pub fn with_strategy(count: u64, strategy: GrowthStrategy) -> Self {
        let capacity = strategy.initial().min(count) as usize;
        Self {
            count,
            actual_length: 0,
            indices: vec![0; capacity],
            values: DenseArray::from_vec(vec![T::ZERO; capacity]),
            strategy,
        }
    }

    /// Number of explicitly stored entries.
    #[inline]
    pub fn actual_length(&self) -> usize {
        self.actual_length
    }

    /// Physical slots currently allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn strategy(&self) -> &GrowthStrategy {
        &self.strategy
    }

    /// Stored indices, ascending.
    #[inline]
    pub fn indices(&self) -> &[u64] {
        &self.indices[..self.actual_length]
    }

    /// Stored values, parallel to [`indices`](Self::indices).
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values.as_slice()[..self.actual_length]
    }

    /// Binary search over the stored indices.
    #[inline]
    pub fn index(&self, index: u64) -> SearchResult {
        match self.indices().binary_search(&index) {
            Ok(pos) => SearchResult::Found(pos),
            Err(pos) => SearchResult::Vacant(pos),
        }
    }

    /// Stores `value` at `index` even when it is zero.
    pub fn put(&mut self, index: u64, value: T) {
        assert!(index < self.count, "index {index} out of bounds");
        match self.index(index) {
            SearchResult::Found(pos) => self.values.as_mut_slice()[pos] = value,
            SearchResult::Vacant(pos) => self.insert_at(pos, index, value),
        }
    }

    /// Drops the entry at `index`, returning its value if it was stored.
    pub fn remove(&mut self, index: u64) -> Option<T> {
        let pos = self.index(index).found()?;
        let value = self.values.as_slice()[pos];
        self.remove_at(pos);
        Some(value)
    }

    /// Drops every stored entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.actual_length = 0;
    }

    /// First internal position whose index is `>= first`.
    pub fn first_in_range(&self, first: u64, _limit: u64) -> usize {
        if self.actual_length == 0 || first <= self.indices[0] {
            return 0;
        }
        self.index(first).position()
    }

    /// Internal position one past the last entry whose index is `< limit`.
    ///
    /// Together with [`first_in_range`](Self::first_in_range) this brackets
    /// the stored entries of `[first, limit)`.
    pub fn limit_of_range(&self, first: u64, limit: u64) -> usize {
        if limit <= first || self.actual_length == 0 {
            return self.first_in_range(first, limit);
        }
        let last = limit - 1;
        if last >= self.indices[self.actual_length - 1] {
            return self.actual_length;
        }
        match self.index(last) {
            SearchResult::Found(pos) => pos + 1,
            SearchResult::Vacant(pos) => pos,
        }
    }

    pub fn nonzeros(&self) -> Nonzeros<'_, T> {
        Nonzeros::new(self.indices(), self.values())
    }

    /// Fully materialized copy.
    pub fn densify(&self) -> ArrayResult<DenseArray<T>> {
        let mut dense = DenseArray::new(self.count)?;
        for (index, value) in self.nonzeros() {
            dense.set(index, value);
        }
        Ok(dense)
    }

    /// Sorts the whole array by `compare` in `O(nnz log nnz)`.
    ///
    /// Only stored values move: those ordered before zero are packed at the
    /// front, those ordered after it at the back, and the implicit zeros fill
    /// the gap. Stored zeros are dropped.
    pub(crate) fn sort_by<C: Fn(T, T) -> Ordering>(&mut self, compare: C) {
        let mut sorted: Vec<T> = self.values().iter().copied().filter(|v| !v.is_zero()).collect();
        sorted.sort_by(|&a, &b| compare(a, b));

        let before = sorted.partition_point(|&v| compare(v, T::ZERO) == Ordering::Less);
        let after = (sorted.len() - before) as u64;
        for (pos, slot) in self.indices[..sorted.len()].iter_mut().enumerate() {
            *slot = if pos < before {
                pos as u64
            } else {
                self.count - after + (pos - before) as u64
            };
        }
        self.values.as_mut_slice()[..sorted.len()].copy_from_slice(&sorted);
        self.actual_length = sorted.len();
    }

    /// Overwrites or inserts a non-zero value, and drops the entry for a zero.
    pub(crate) fn store(&mut self, index: u64, value: T) {
        match self.index(index) {
            SearchResult::Found(pos) if value.is_zero() => self.remove_at(pos),
            SearchResult::Found(pos) => self.values.as_mut_slice()[pos] = value,
            SearchResult::Vacant(pos) if !value.is_zero() => self.insert_at(pos, index, value),
            SearchResult::Vacant(_) => {}
        }
    }

    /// Capacity reached by growing from the current one until `required` fits.
    fn capacity_for(&self, required: usize) -> usize {
        let required = required as u64;
        let mut capacity = self.indices.len() as u64;
        while capacity < required {
            capacity = self.strategy.grow(capacity);
        }
        capacity.min(self.count).max(required) as usize
    }

    fn insert_at(&mut self, pos: usize, index: u64, value: T) {
        let len = self.actual_length;

        if len < self.indices.len() {
            self.indices.copy_within(pos..len, pos + 1);
            self.indices[pos] = index;
            let values = self.values.as_mut_slice();
            values.copy_within(pos..len, pos + 1);
            values[pos] = value;
        } else {
            let capacity = self.capacity_for(len + 1);
            trace!(from = len, to = capacity, "growing sparse storage");

            let mut indices = vec![0u64; capacity];
            indices[..pos].copy_from_slice(&self.indices[..pos]);
            indices[pos] = index;
            indices[pos + 1..=len].copy_from_slice(&self.indices[pos..len]);

            let mut values = vec![T::ZERO; capacity];
            let old = self.values.as_slice();
            values[..pos].copy_from_slice(&old[..pos]);
            values[pos] = value;
            values[pos + 1..=len].copy_from_slice(&old[pos..len]);

            self.indices = indices;
            self.values = DenseArray::from_vec(values);
        }

        self.actual_length += 1;
    }

    fn remove_at(&mut self, pos: usize) {
        let len = self.actual_length;
        self.indices.copy_within(pos + 1..len, pos);
        self.values.as_mut_slice().copy_within(pos + 1..len, pos);
        self.actual_length -= 1;
    }

    /// Replaces the stored entries in `lo..hi` with the given ones.
    fn splice(&mut self, lo: usize, hi: usize, indices: &[u64], values: &[T]) {
        let len = self.actual_length;
        let added = indices.len();
        let new_len = lo + added + (len - hi);

        if new_len > self.indices.len() {
            let capacity = self.capacity_for(new_len);
            trace!(from = len, to = capacity, "growing sparse storage");

            let mut grown_indices = vec![0u64; capacity];
            grown_indices[..lo].copy_from_slice(&self.indices[..lo]);
            grown_indices[lo..lo + added].copy_from_slice(indices);
            grown_indices[lo + added..new_len].copy_from_slice(&self.indices[hi..len]);

            let old = self.values.as_slice();
            let mut grown_values = vec![T::ZERO; capacity];
            grown_values[..lo].copy_from_slice(&old[..lo]);
            grown_values[lo..lo + added].copy_from_slice(values);
            grown_values[lo + added..new_len].copy_from_slice(&old[hi..len]);

            self.indices = grown_indices;
            self.values = DenseArray::from_vec(grown_values);
        } else {
            self.indices.copy_within(hi..len, lo + added);
            self.indices[lo..lo + added].copy_from_slice(indices);
            let slots = self.values.as_mut_slice();
            slots.copy_within(hi..len, lo + added);
            slots[lo..lo + added].copy_from_slice(values);
        }

        self.actual_length = new_len;
    }

    /// Assigns `value_at()` to every strided position in one merge pass.
    /// Zero results are not stored.
    fn assign_strided<G: FnMut() -> T>(&mut self, first: u64, limit: u64, step: u64, mut value_at: G) {
        let lo = self.first_in_range(first, limit);
        let hi = self.limit_of_range(first, limit).max(lo);

        let merged = (hi - lo) as u64 + strided_len(first, limit, step);
        let capacity = merged.min(1 << 20) as usize;
        let mut indices = Vec::with_capacity(capacity);
        let mut values = Vec::with_capacity(capacity);

        let mut e = lo;
        for position in strided(first, limit, step) {
            while e < hi && self.indices[e] < position {
                indices.push(self.indices[e]);
                values.push(self.values.as_slice()[e]);
                e += 1;
            }
            if e < hi && self.indices[e] == position {
                e += 1;
            }
            let value = value_at();
            if !value.is_zero() {
                indices.push(position);
                values.push(value);
            }
        }
        while e < hi {
            indices.push(self.indices[e]);
            values.push(self.values.as_slice()[e]);
            e += 1;
        }

        self.splice(lo, hi, &indices, &values);
    }

    /// Drops stored entries on the stride without touching the gaps.
    fn clear_strided(&mut self, first: u64, limit: u64, step: u64) {
        assert!(step > 0, "step must be positive");
        let lo = self.first_in_range(first, limit);
        let hi = self.limit_of_range(first, limit).max(lo);

        let mut kept = lo;
        for e in lo..hi {
            if !on_stride(self.indices[e], first, limit, step) {
                self.indices[kept] = self.indices[e];
                let values = self.values.as_mut_slice();
                values[kept] = values[e];
                kept += 1;
            }
        }
        let len = self.actual_length;
        self.indices.copy_within(hi..len, kept);
        self.values.as_mut_slice().copy_within(hi..len, kept);
        self.actual_length = kept + (len - hi);
    }
}

impl<T: Scalar> Storage<T> for SparseArray<T> {
    #[inline]
    fn count(&self) -> u64 {
        self.count
    }

    fn get(&self, index: u64) -> T {
        assert!(index < self.count, "index {index} out of bounds");
        match self.index(index) {
            SearchResult::Found(pos) => self.values.as_slice()[pos],
            SearchResult::Vacant(_) => T::ZERO,
        }
    }

    fn set(&mut self, index: u64, value: T) {
        assert!(index < self.count, "index {index} out of bounds");
        match self.index(index) {
            SearchResult::Found(pos) => self.values.as_mut_slice()[pos] = value,
            SearchResult::Vacant(pos) => {
                if !value.is_zero() {
                    self.insert_at(pos, index, value);
                }
            }
        }
    }

    fn add(&mut self, index: u64, addend: T) {
        assert!(index < self.count, "index {index} out of bounds");
        match self.index(index) {
            SearchResult::Found(pos) => {
                let values = self.values.as_mut_slice();
                values[pos] = values[pos] + addend;
            }
            SearchResult::Vacant(pos) => {
                if !addend.is_zero() {
                    self.insert_at(pos, index, addend);
                }
            }
        }
    }

    fn fill_range(&mut self, first: u64, limit: u64, step: u64, value: T) {
        if value.is_zero() {
            self.clear_strided(first, limit, step);
        } else {
            self.assign_strided(first, limit, step, || value);
        }
    }

    fn fill_range_with<G: FnMut() -> T>(&mut self, first: u64, limit: u64, step: u64, supplier: &mut G) {
        self.assign_strided(first, limit, step, supplier);
    }

    /// Visits zero once if any position of the range is not stored, then
    /// every stored entry of the range in ascending order.
    fn visit_range<V: FnMut(T)>(&self, first: u64, limit: u64, step: u64, visitor: &mut V) {
        let positions = strided_len(first, limit, step);
        let lo = self.first_in_range(first, limit);
        let hi = self.limit_of_range(first, limit).max(lo);
        let values = self.values.as_slice();

        if step == 1 {
            if ((hi - lo) as u64) < positions {
                visitor(T::ZERO);
            }
            for &value in &values[lo..hi] {
                visitor(value);
            }
            return;
        }

        let stored = (lo..hi)
            .filter(|&e| on_stride(self.indices[e], first, limit, step))
            .count() as u64;
        if stored < positions {
            visitor(T::ZERO);
        }
        for e in lo..hi {
            if on_stride(self.indices[e], first, limit, step) {
                visitor(values[e]);
            }
        }
    }

    /// Fails with [`ArrayError::ZeroNotPreserved`], before touching anything,
    /// unless `function` maps zero to zero.
    fn modify_range<F: Fn(T) -> T>(&mut self, first: u64, limit: u64, step: u64, function: &F) -> ArrayResult<()> {
        if !function(T::ZERO).is_zero() {
            return Err(ArrayError::ZeroNotPreserved);
        }
        let lo = self.first_in_range(first, limit);
        let hi = self.limit_of_range(first, limit).max(lo);
        for e in lo..hi {
            if on_stride(self.indices[e], first, limit, step) {
                let values = self.values.as_mut_slice();
                values[e] = function(values[e]);
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
            self.store(a, value_b);
            self.store(b, value_a);
        }
    }

    fn index_of_largest(&self, first: u64, limit: u64, step: u64) -> u64 {
        if first >= limit {
            return first;
        }
        let mut largest = first;
        let mut largest_norm = self.get(first).norm();
        let lo = self.first_in_range(first, limit);
        let hi = self.limit_of_range(first, limit).max(lo);
        for e in lo..hi {
            let index = self.indices[e];
            if on_stride(index, first, limit, step) {
                let norm = self.values.as_slice()[e].norm();
                if norm > largest_norm {
                    largest = index;
                    largest_norm = norm;
                }
            }
        }
        largest
    }
}

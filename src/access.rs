//! The uniform positional access contract shared by every representation.
//!
//! All ranges are half-open `[first, limit)` over 0-based external indices.
//! `step` selects every `step`-th position starting at `first`, which is how
//! rows, columns and diagonals of a flattened matrix are addressed.

use crate::error::ArrayResult;
use crate::scalar::Scalar;

/// Indexed storage of `count()` elements of type `T`.
///
/// Indices at or beyond `count()` panic, as slice indexing does. A zero
/// `step` panics as well.
pub trait Storage<T: Scalar> {
    fn count(&self) -> u64;

    fn get(&self, index: u64) -> T;

    fn double_value(&self, index: u64) -> f64 {
        self.get(index).to_f64()
    }

    fn set(&mut self, index: u64, value: T);

    fn add(&mut self, index: u64, addend: T);

    fn fill_range(&mut self, first: u64, limit: u64, step: u64, value: T);

    /// Like [`fill_range`](Self::fill_range), calling `supplier` once per
    /// position in ascending order.
    fn fill_range_with<G: FnMut() -> T>(&mut self, first: u64, limit: u64, step: u64, supplier: &mut G);

    fn visit_range<V: FnMut(T)>(&self, first: u64, limit: u64, step: u64, visitor: &mut V);

    /// Replaces each element in the range with `function(element)`.
    ///
    /// Either the whole range is transformed or, on error, nothing is.
    fn modify_range<F: Fn(T) -> T>(&mut self, first: u64, limit: u64, step: u64, function: &F) -> ArrayResult<()>;

    /// Swaps `count` pairs of elements: `first_a + k*step` with `first_b + k*step`.
    fn exchange(&mut self, first_a: u64, first_b: u64, step: u64, count: u64);

    /// Index of the first element with the largest norm, `first` for an
    /// empty range.
    fn index_of_largest(&self, first: u64, limit: u64, step: u64) -> u64;

    fn fill_all(&mut self, value: T) {
        let count = self.count();
        self.fill_range(0, count, 1, value);
    }

    fn visit_all<V: FnMut(T)>(&self, visitor: &mut V) {
        self.visit_range(0, self.count(), 1, visitor);
    }

    fn modify_all<F: Fn(T) -> T>(&mut self, function: &F) -> ArrayResult<()> {
        let count = self.count();
        self.modify_range(0, count, 1, function)
    }

    fn sum(&self) -> f64 {
        let mut total = 0.0;
        self.visit_all(&mut |value: T| total += value.to_f64());
        total
    }

    fn is_all_zeros(&self) -> bool {
        let mut zeros = true;
        self.visit_all(&mut |value: T| zeros &= value.is_zero());
        zeros
    }
}

/// Number of positions `first, first + step, ...` below `limit`.
#[inline]
pub(crate) fn strided_len(first: u64, limit: u64, step: u64) -> u64 {
    assert!(step > 0, "step must be positive");
    if limit <= first {
        0
    } else {
        (limit - first - 1) / step + 1
    }
}

/// The positions `first, first + step, ...` below `limit`.
#[inline]
pub(crate) fn strided(first: u64, limit: u64, step: u64) -> impl Iterator<Item = u64> {
    assert!(step > 0, "step must be positive");
    let step = usize::try_from(step).unwrap_or(usize::MAX);
    (first..limit.max(first)).step_by(step)
}

/// Whether `index` is one of the strided positions of `[first, limit)`.
#[inline]
pub(crate) fn on_stride(index: u64, first: u64, limit: u64, step: u64) -> bool {
    index >= first && index < limit && (index - first) % step == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strided_len() {
        assert_eq!(strided_len(0, 10, 1), 10);
        assert_eq!(strided_len(0, 10, 3), 4);
        assert_eq!(strided_len(2, 10, 4), 2);
        assert_eq!(strided_len(5, 5, 1), 0);
        assert_eq!(strided_len(7, 3, 1), 0);
    }

    #[test]
    fn test_strided_matches_len() {
        for step in 1..6 {
            for first in 0..8 {
                let positions: Vec<u64> = strided(first, 17, step).collect();
                assert_eq!(positions.len() as u64, strided_len(first, 17, step));
                assert!(positions.iter().all(|&i| on_stride(i, first, 17, step)));
            }
        }
    }

    #[test]
    #[should_panic(expected = "step must be positive")]
    fn test_zero_step_panics() {
        strided_len(0, 10, 0);
    }
}

use std::iter::FusedIterator;

/// Ordered cursor over the explicitly stored entries of a
/// [`SparseArray`](super::SparseArray).
///
/// Yields `(index, value)` pairs in ascending index order from the front and
/// descending from the back. Cloning gives an independent cursor from the
/// current position; [`try_split`](Self::try_split) halves the remaining
/// entries for parallel consumption.
#[derive(Clone, Debug)]
pub struct Nonzeros<'a, T> {
    indices: &'a [u64],
    values: &'a [T],
    front: usize,
    back: usize,
}

impl<'a, T: Copy> Nonzeros<'a, T> {
    pub(crate) fn new(indices: &'a [u64], values: &'a [T]) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        Self {
            indices,
            values,
            front: 0,
            back: indices.len(),
        }
    }

    /// Index of the entry `next()` would yield, without advancing.
    pub fn peek_index(&self) -> Option<u64> {
        (self.front < self.back).then(|| self.indices[self.front])
    }

    /// Splits off the upper half of the remaining entries.
    ///
    /// `self` keeps the lower half. Returns `None` when fewer than two
    /// entries remain.
    pub fn try_split(&mut self) -> Option<Self> {
        let remaining = self.back - self.front;
        if remaining < 2 {
            return None;
        }
        let mid = self.front + remaining / 2;
        let upper = Self {
            indices: self.indices,
            values: self.values,
            front: mid,
            back: self.back,
        };
        self.back = mid;
        Some(upper)
    }
}

impl<'a, T: Copy> Iterator for Nonzeros<'a, T> {
    type Item = (u64, T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let item = (self.indices[self.front], self.values[self.front]);
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T: Copy> DoubleEndedIterator for Nonzeros<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some((self.indices[self.back], self.values[self.back]))
    }
}

impl<'a, T: Copy> ExactSizeIterator for Nonzeros<'a, T> {}

impl<'a, T: Copy> FusedIterator for Nonzeros<'a, T> {}

//! Shaped views over a [`BasicArray`].
//!
//! Views borrow the array mutably and translate coordinates to flat indices
//! in column-major order: the first coordinate varies fastest. A matrix row
//! is therefore a strided range with `step == rows`, and a column is a
//! contiguous one.

use smallvec::SmallVec;

use crate::access::Storage;
use crate::basic::BasicArray;
use crate::error::{ArrayError, ArrayResult};
use crate::scalar::Scalar;

pub type Shape = SmallVec<[u64; 4]>;

pub struct Array1D<'a, T> {
    array: &'a mut BasicArray<T>,
}

impl<'a, T: Scalar> Array1D<'a, T> {
    pub(crate) fn new(array: &'a mut BasicArray<T>) -> Self {
        Self { array }
    }

    pub fn count(&self) -> u64 {
        self.array.count()
    }

    pub fn get(&self, index: u64) -> T {
        self.array.get(index)
    }

    pub fn set(&mut self, index: u64, value: T) {
        self.array.set(index, value);
    }

    pub fn add(&mut self, index: u64, addend: T) {
        self.array.add(index, addend);
    }

    pub fn fill_all(&mut self, value: T) {
        self.array.fill_all(value);
    }

    pub fn modify_all<F: Fn(T) -> T>(&mut self, function: &F) -> ArrayResult<()> {
        self.array.modify_all(function)
    }

    pub fn index_of_largest(&self) -> u64 {
        self.array.index_of_largest(0, self.count(), 1)
    }

    pub fn sum(&self) -> f64 {
        self.array.sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.count()).map(move |i| self.array.get(i))
    }
}

/// Column-major matrix over a flat array.
pub struct Array2D<'a, T> {
    array: &'a mut BasicArray<T>,
    rows: u64,
    columns: u64,
}

impl<'a, T: Scalar> Array2D<'a, T> {
    pub(crate) fn new(array: &'a mut BasicArray<T>, rows: u64) -> ArrayResult<Self> {
        let count = array.count();
        if rows == 0 || count % rows != 0 {
            return Err(ArrayError::ShapeMismatch {
                count,
                shape: vec![rows],
            });
        }
        Ok(Self {
            array,
            rows,
            columns: count / rows,
        })
    }

    #[inline]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> u64 {
        self.columns
    }

    #[inline]
    fn at(&self, row: u64, column: u64) -> u64 {
        assert!(row < self.rows && column < self.columns, "matrix index out of bounds");
        row + column * self.rows
    }

    pub fn get(&self, row: u64, column: u64) -> T {
        self.array.get(self.at(row, column))
    }

    pub fn set(&mut self, row: u64, column: u64, value: T) {
        let at = self.at(row, column);
        self.array.set(at, value);
    }

    pub fn add(&mut self, row: u64, column: u64, addend: T) {
        let at = self.at(row, column);
        self.array.add(at, addend);
    }

    pub fn fill_row(&mut self, row: u64, value: T) {
        let first = self.at(row, 0);
        let count = self.array.count();
        self.array.fill_range(first, count, self.rows, value);
    }

    pub fn fill_column(&mut self, column: u64, value: T) {
        let first = self.at(0, column);
        self.array.fill_range(first, first + self.rows, 1, value);
    }

    pub fn fill_diagonal(&mut self, value: T) {
        let length = self.rows.min(self.columns);
        if length > 0 {
            let step = self.rows + 1;
            self.array.fill_range(0, (length - 1) * step + 1, step, value);
        }
    }

    pub fn visit_row<V: FnMut(T)>(&self, row: u64, visitor: &mut V) {
        let first = self.at(row, 0);
        self.array.visit_range(first, self.array.count(), self.rows, visitor);
    }

    pub fn visit_column<V: FnMut(T)>(&self, column: u64, visitor: &mut V) {
        let first = self.at(0, column);
        self.array.visit_range(first, first + self.rows, 1, visitor);
    }

    pub fn modify_row<F: Fn(T) -> T>(&mut self, row: u64, function: &F) -> ArrayResult<()> {
        let first = self.at(row, 0);
        let count = self.array.count();
        self.array.modify_range(first, count, self.rows, function)
    }

    pub fn exchange_rows(&mut self, a: u64, b: u64) {
        let (a, b) = (self.at(a, 0), self.at(b, 0));
        self.array.exchange(a, b, self.rows, self.columns);
    }

    pub fn exchange_columns(&mut self, a: u64, b: u64) {
        let (a, b) = (self.at(0, a), self.at(0, b));
        self.array.exchange(a, b, 1, self.rows);
    }

    /// Row holding the largest-norm element of `column`, searching from
    /// `from_row` down. This is the partial-pivoting search.
    pub fn index_of_largest_in_column(&self, from_row: u64, column: u64) -> u64 {
        let first = self.at(from_row, column);
        let limit = self.at(0, column) + self.rows;
        self.array.index_of_largest(first, limit, 1) - column * self.rows
    }

    /// Column holding the largest-norm element of `row`.
    pub fn index_of_largest_in_row(&self, row: u64) -> u64 {
        let first = self.at(row, 0);
        (self.array.index_of_largest(first, self.array.count(), self.rows) - row) / self.rows
    }
}

/// Column-major view of arbitrary rank.
pub struct ArrayAnyD<'a, T> {
    array: &'a mut BasicArray<T>,
    shape: Shape,
}

impl<'a, T: Scalar> ArrayAnyD<'a, T> {
    pub(crate) fn new(array: &'a mut BasicArray<T>, shape: &[u64]) -> ArrayResult<Self> {
        let count = array.count();
        let product = shape
            .iter()
            .try_fold(1u64, |product, &extent| product.checked_mul(extent));
        if shape.is_empty() || product != Some(count) {
            return Err(ArrayError::ShapeMismatch {
                count,
                shape: shape.to_vec(),
            });
        }
        Ok(Self {
            array,
            shape: Shape::from_slice(shape),
        })
    }

    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn count(&self) -> u64 {
        self.array.count()
    }

    /// Flat index of `reference`.
    pub fn index_of(&self, reference: &[u64]) -> u64 {
        assert_eq!(reference.len(), self.shape.len(), "reference rank does not match shape");
        let mut index = 0;
        let mut stride = 1;
        for (&coordinate, &extent) in reference.iter().zip(&self.shape) {
            assert!(coordinate < extent, "coordinate out of bounds");
            index += coordinate * stride;
            stride *= extent;
        }
        index
    }

    /// Coordinates of a flat index.
    pub fn reference_of(&self, mut index: u64) -> Shape {
        self.shape
            .iter()
            .map(|&extent| {
                let coordinate = index % extent;
                index /= extent;
                coordinate
            })
            .collect()
    }

    pub fn get(&self, reference: &[u64]) -> T {
        self.array.get(self.index_of(reference))
    }

    pub fn set(&mut self, reference: &[u64], value: T) {
        let at = self.index_of(reference);
        self.array.set(at, value);
    }

    pub fn add(&mut self, reference: &[u64], addend: T) {
        let at = self.index_of(reference);
        self.array.add(at, addend);
    }

    /// Visits every element whose coordinate along `dimension` is fixed at
    /// `position`, in flat index order.
    pub fn visit_slice<V: FnMut(T)>(&self, dimension: usize, position: u64, visitor: &mut V) {
        let extent = self.shape[dimension];
        assert!(position < extent, "coordinate out of bounds");
        let inner: u64 = self.shape[..dimension].iter().product();
        let count = self.array.count();
        let mut block = position * inner;
        while block < count {
            self.array.visit_range(block, block + inner, 1, visitor);
            block += inner * extent;
        }
    }
}

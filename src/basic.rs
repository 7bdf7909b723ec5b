use std::cmp::Ordering;

use crate::access::Storage;
use crate::dense::DenseArray;
use crate::error::{ArrayError, ArrayResult};
use crate::scalar::Scalar;
use crate::segmented::{SegmentKind, SegmentedArray};
use crate::sort;
use crate::sparse::SparseArray;
use crate::view::{Array1D, Array2D, ArrayAnyD};

/// Which concrete layout backs a [`BasicArray`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Representation {
    Dense,
    Sparse,
    SegmentedDense { index_bits: u32 },
    SegmentedSparse { index_bits: u32 },
}

/// A one-dimensional numeric array in any of the supported layouts.
///
/// All variants answer the same [`Storage`] contract; code that only reads
/// and writes by index never needs to know which one it holds.
#[derive(Clone, Debug)]
pub enum BasicArray<T> {
    Dense(DenseArray<T>),
    Sparse(SparseArray<T>),
    Segmented(SegmentedArray<T>),
}

macro_rules! dispatch {
    ($self:expr, $array:ident => $body:expr) => {
        match $self {
            BasicArray::Dense($array) => $body,
            BasicArray::Sparse($array) => $body,
            BasicArray::Segmented($array) => $body,
        }
    };
}

impl<T: Scalar> BasicArray<T> {
    pub fn representation(&self) -> Representation {
        match self {
            BasicArray::Dense(_) => Representation::Dense,
            BasicArray::Sparse(_) => Representation::Sparse,
            BasicArray::Segmented(segmented) => {
                let index_bits = segmented.index_bits();
                match segmented.kind() {
                    SegmentKind::Dense => Representation::SegmentedDense { index_bits },
                    SegmentKind::Sparse(_) => Representation::SegmentedSparse { index_bits },
                }
            }
        }
    }

    /// True if any part of the array stores only its non-zero entries.
    pub fn is_sparse(&self) -> bool {
        match self {
            BasicArray::Dense(_) => false,
            BasicArray::Sparse(_) => true,
            BasicArray::Segmented(segmented) => segmented.has_sparse_segments(),
        }
    }

    pub fn as_dense(&self) -> Option<&DenseArray<T>> {
        match self {
            BasicArray::Dense(dense) => Some(dense),
            _ => None,
        }
    }

    pub fn as_sparse(&self) -> Option<&SparseArray<T>> {
        match self {
            BasicArray::Sparse(sparse) => Some(sparse),
            _ => None,
        }
    }

    pub fn as_segmented(&self) -> Option<&SegmentedArray<T>> {
        match self {
            BasicArray::Segmented(segmented) => Some(segmented),
            _ => None,
        }
    }

    /// Non-zero entries in ascending index order.
    ///
    /// Dense storage skips its zeros; sparse storage yields what it has
    /// stored.
    pub fn nonzeros(&self) -> Box<dyn Iterator<Item = (u64, T)> + '_> {
        match self {
            BasicArray::Dense(dense) => Box::new(dense.nonzeros()),
            BasicArray::Sparse(sparse) => Box::new(sparse.nonzeros()),
            BasicArray::Segmented(segmented) => Box::new(segmented.nonzeros()),
        }
    }

    /// Dense copy of the whole array.
    pub fn densify(&self) -> ArrayResult<DenseArray<T>> {
        match self {
            BasicArray::Dense(dense) => Ok(dense.clone()),
            BasicArray::Sparse(sparse) => sparse.densify(),
            BasicArray::Segmented(segmented) => {
                let mut dense = DenseArray::new(segmented.count())?;
                for (index, value) in segmented.nonzeros() {
                    dense.set(index, value);
                }
                Ok(dense)
            }
        }
    }

    pub fn to_vec(&self) -> ArrayResult<Vec<T>> {
        Ok(self.densify()?.into_vec())
    }

    /// Overwrites every element with the one at the same index in `source`.
    pub fn fill_matching(&mut self, source: &BasicArray<T>) -> ArrayResult<()> {
        let expected = self.count();
        let actual = source.count();
        if expected != actual {
            return Err(ArrayError::CountMismatch { expected, actual });
        }

        if let (BasicArray::Dense(target), BasicArray::Dense(source)) = (&mut *self, source) {
            target.as_mut_slice().copy_from_slice(source.as_slice());
            return Ok(());
        }

        if !self.is_sparse() {
            // Positional, so signed zeros survive.
            let mut index = 0;
            self.fill_range_with(0, expected, 1, &mut || {
                let value = source.get(index);
                index += 1;
                value
            });
            return Ok(());
        }

        self.fill_all(T::ZERO);
        for (index, value) in source.nonzeros() {
            self.set(index, value);
        }
        Ok(())
    }

    /// Sorts into ascending order, NaN last.
    pub fn sort_ascending(&mut self) {
        self.sort_by(sort::ascending);
    }

    /// Sorts into descending order, NaN last.
    pub fn sort_descending(&mut self) {
        self.sort_by(sort::descending);
    }

    fn sort_by<C: Fn(T, T) -> Ordering>(&mut self, compare: C) {
        match self {
            BasicArray::Dense(dense) => sort::sort_slice(dense.as_mut_slice(), compare),
            BasicArray::Sparse(sparse) => sparse.sort_by(compare),
            BasicArray::Segmented(_) => {
                let count = self.count();
                sort::quicksort(self, 0, count, &compare);
            }
        }
    }

    pub fn wrap_in_array_1d(&mut self) -> Array1D<'_, T> {
        Array1D::new(self)
    }

    /// Column-major matrix view with `rows` rows.
    pub fn wrap_in_array_2d(&mut self, rows: u64) -> ArrayResult<Array2D<'_, T>> {
        Array2D::new(self, rows)
    }

    /// Column-major view of any rank; the product of `shape` must equal
    /// `count()`.
    pub fn wrap_in_array_any_d(&mut self, shape: &[u64]) -> ArrayResult<ArrayAnyD<'_, T>> {
        ArrayAnyD::new(self, shape)
    }

    /// Sets a value with exchange semantics: sparse storage drops the entry
    /// for a zero instead of keeping it.
    pub(crate) fn assign(&mut self, index: u64, value: T) {
        match self {
            BasicArray::Dense(dense) => dense.set(index, value),
            BasicArray::Sparse(sparse) => sparse.store(index, value),
            BasicArray::Segmented(segmented) => segmented.assign(index, value),
        }
    }
}

impl<T: Scalar> Storage<T> for BasicArray<T> {
    #[inline]
    fn count(&self) -> u64 {
        dispatch!(self, a => a.count())
    }

    #[inline]
    fn get(&self, index: u64) -> T {
        dispatch!(self, a => a.get(index))
    }

    #[inline]
    fn set(&mut self, index: u64, value: T) {
        dispatch!(self, a => a.set(index, value))
    }

    #[inline]
    fn add(&mut self, index: u64, addend: T) {
        dispatch!(self, a => a.add(index, addend))
    }

    fn fill_range(&mut self, first: u64, limit: u64, step: u64, value: T) {
        dispatch!(self, a => a.fill_range(first, limit, step, value))
    }

    fn fill_range_with<G: FnMut() -> T>(&mut self, first: u64, limit: u64, step: u64, supplier: &mut G) {
        dispatch!(self, a => a.fill_range_with(first, limit, step, &mut *supplier))
    }

    fn visit_range<V: FnMut(T)>(&self, first: u64, limit: u64, step: u64, visitor: &mut V) {
        dispatch!(self, a => a.visit_range(first, limit, step, &mut *visitor))
    }

    fn modify_range<F: Fn(T) -> T>(&mut self, first: u64, limit: u64, step: u64, function: &F) -> ArrayResult<()> {
        dispatch!(self, a => a.modify_range(first, limit, step, function))
    }

    fn exchange(&mut self, first_a: u64, first_b: u64, step: u64, count: u64) {
        dispatch!(self, a => a.exchange(first_a, first_b, step, count))
    }

    fn index_of_largest(&self, first: u64, limit: u64, step: u64) -> u64 {
        dispatch!(self, a => a.index_of_largest(first, limit, step))
    }
}

impl<T> From<DenseArray<T>> for BasicArray<T> {
    fn from(array: DenseArray<T>) -> Self {
        BasicArray::Dense(array)
    }
}

impl<T> From<SparseArray<T>> for BasicArray<T> {
    fn from(array: SparseArray<T>) -> Self {
        BasicArray::Sparse(array)
    }
}

impl<T> From<SegmentedArray<T>> for BasicArray<T> {
    fn from(array: SegmentedArray<T>) -> Self {
        BasicArray::Segmented(array)
    }
}

impl<T: Scalar> From<Vec<T>> for BasicArray<T> {
    fn from(values: Vec<T>) -> Self {
        BasicArray::Dense(DenseArray::from_vec(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::GrowthStrategy;

    fn all_layouts(count: u64) -> Vec<BasicArray<f64>> {
        vec![
            DenseArray::new(count).unwrap().into(),
            SparseArray::with_strategy(count, GrowthStrategy::new(2, 4, 8)).into(),
            SegmentedArray::partitioned(count, 2, SegmentKind::Dense).unwrap().into(),
            SegmentedArray::partitioned(count, 3, SegmentKind::Sparse(GrowthStrategy::default()))
                .unwrap()
                .into(),
        ]
    }

    #[test]
    fn test_representation() {
        let reps: Vec<Representation> = all_layouts(20).iter().map(BasicArray::representation).collect();
        assert_eq!(
            reps,
            vec![
                Representation::Dense,
                Representation::Sparse,
                Representation::SegmentedDense { index_bits: 2 },
                Representation::SegmentedSparse { index_bits: 3 },
            ]
        );
        let sparse: Vec<bool> = all_layouts(20).iter().map(BasicArray::is_sparse).collect();
        assert_eq!(sparse, vec![false, true, false, true]);
    }

    #[test]
    fn test_layouts_agree() {
        for mut array in all_layouts(20) {
            array.set(3, 1.5);
            array.add(17, -4.0);
            array.fill_range(10, 14, 2, 2.0);
            array.exchange(3, 4, 1, 1);
            assert_eq!(array.count(), 20);
            assert_eq!(array.get(4), 1.5);
            assert_eq!(array.get(3), 0.0);
            assert_eq!(array.index_of_largest(0, 20, 1), 17);
            assert_eq!(array.sum(), 1.5);

            let nz: Vec<_> = array.nonzeros().collect();
            assert_eq!(nz, vec![(4, 1.5), (10, 2.0), (12, 2.0), (17, -4.0)]);

            let values = array.to_vec().unwrap();
            assert_eq!(values.len(), 20);
            assert_eq!(values[12], 2.0);
        }
    }

    #[test]
    fn test_fill_matching() {
        let mut source = BasicArray::from(vec![0.0, 1.0, 0.0, 3.0, 4.0, 0.0, 0.0, 7.0]);
        for mut target in all_layouts(8) {
            target.fill_all(9.0);
            target.fill_matching(&source).unwrap();
            assert_eq!(target.to_vec().unwrap(), source.to_vec().unwrap());
        }

        let short: BasicArray<f64> = DenseArray::new(3).unwrap().into();
        assert_eq!(
            source.fill_matching(&short).unwrap_err(),
            ArrayError::CountMismatch {
                expected: 8,
                actual: 3
            }
        );
    }

    #[test]
    fn test_sorts() {
        let values = [3.0, -1.0, 0.0, 8.0, 0.0, 2.5, -7.0, 1.0, 0.0, 4.0];
        for mut array in all_layouts(10) {
            for (i, &v) in values.iter().enumerate() {
                array.set(i as u64, v);
            }
            array.sort_ascending();
            assert_eq!(
                array.to_vec().unwrap(),
                vec![-7.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.5, 3.0, 4.0, 8.0]
            );
            array.sort_descending();
            assert_eq!(
                array.to_vec().unwrap(),
                vec![8.0, 4.0, 3.0, 2.5, 1.0, 0.0, 0.0, 0.0, -1.0, -7.0]
            );
        }
    }

    #[test]
    fn test_fill_matching_keeps_signed_zero() {
        let source = BasicArray::from(vec![-0.0, 1.0, -0.0, 0.0]);
        for mut target in all_layouts(4) {
            target.fill_all(5.0);
            target.fill_matching(&source).unwrap();
            assert_eq!(target.to_vec().unwrap(), vec![0.0, 1.0, 0.0, 0.0]);
            if !target.is_sparse() {
                assert!(target.get(0).is_sign_negative());
                assert!(target.get(2).is_sign_negative());
                assert!(target.get(3).is_sign_positive());
            }
        }
    }

    #[test]
    fn test_sorts_with_nan() {
        let values = [f64::NAN, 4.0, -1.0, 0.0, f64::NAN, 2.0, 0.0, -3.0];
        for mut array in all_layouts(8) {
            for (i, &v) in values.iter().enumerate() {
                array.set(i as u64, v);
            }

            array.sort_ascending();
            let sorted = array.to_vec().unwrap();
            assert_eq!(&sorted[..6], &[-3.0, -1.0, 0.0, 0.0, 2.0, 4.0]);
            assert!(sorted[6..].iter().all(|v| v.is_nan()), "{sorted:?}");

            array.sort_descending();
            let sorted = array.to_vec().unwrap();
            assert_eq!(&sorted[..6], &[4.0, 2.0, 0.0, 0.0, -1.0, -3.0]);
            assert!(sorted[6..].iter().all(|v| v.is_nan()), "{sorted:?}");
        }
    }

    #[test]
    fn test_sort_mostly_zero() {
        let count = 1u64 << 16;
        let layouts: Vec<BasicArray<f64>> = vec![
            SparseArray::new(count).into(),
            SegmentedArray::partitioned(count, 10, SegmentKind::Sparse(GrowthStrategy::default()))
                .unwrap()
                .into(),
        ];
        for mut array in layouts {
            for (k, i) in (0..10u64).map(|k| (k, k * 6007 + 13)) {
                array.set(i, if k % 2 == 0 { k as f64 + 1.0 } else { -(k as f64) });
            }
            array.sort_ascending();

            let nz: Vec<_> = array.nonzeros().filter(|&(_, v)| v != 0.0).collect();
            assert_eq!(
                nz,
                vec![
                    (0, -9.0),
                    (1, -7.0),
                    (2, -5.0),
                    (3, -3.0),
                    (4, -1.0),
                    (count - 5, 1.0),
                    (count - 4, 3.0),
                    (count - 3, 5.0),
                    (count - 2, 7.0),
                    (count - 1, 9.0),
                ]
            );
        }

        let mut huge: BasicArray<f64> = SparseArray::new(1 << 50).into();
        huge.set(1 << 45, -2.0);
        huge.set(12, 8.0);
        huge.sort_descending();
        assert_eq!(huge.nonzeros().collect::<Vec<_>>(), vec![(0, 8.0), ((1 << 50) - 1, -2.0)]);
    }

    #[test]
    fn test_densify_segmented() {
        let mut array: BasicArray<i32> = SegmentedArray::partitioned(10, 2, SegmentKind::Dense).unwrap().into();
        array.fill_range_with(0, 10, 1, &mut {
            let mut n = 0;
            move || {
                n += 1;
                n
            }
        });
        let dense = array.densify().unwrap();
        assert_eq!(dense.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }
}

use std::marker::PhantomData;

use tracing::debug;

use crate::access::Storage;
use crate::basic::{BasicArray, Representation};
use crate::config::Config;
use crate::dense::DenseArray;
use crate::error::ArrayResult;
use crate::growth::GrowthStrategy;
use crate::scalar::Scalar;
use crate::segmented::{SegmentKind, SegmentedArray};
use crate::sparse::SparseArray;

/// What the caller is going to do with a new array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Every element will be written; store densely.
    ToBeFilled,
    /// Mostly zero with some structure; sparse storage is acceptable.
    StructuredZero,
}

/// Chooses and allocates the representation for `T` arrays.
///
/// Thresholds come from a [`Config`] scaled by `T`'s element size: one
/// strategy for dense storage and one, with a much larger segment, for sparse
/// storage.
#[derive(Clone, Debug)]
pub struct ArrayFactory<T> {
    config: Config,
    dense: GrowthStrategy,
    sparse: GrowthStrategy,
    max_leaf_len: u64,
    _element: PhantomData<T>,
}

impl<T: Scalar> Default for ArrayFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> ArrayFactory<T> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let size = T::element_size();
        Self {
            config,
            dense: config.dense_strategy(size),
            sparse: config.sparse_strategy(size),
            max_leaf_len: config.max_leaf_len(size),
            _element: PhantomData,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dense_strategy(&self) -> GrowthStrategy {
        self.dense
    }

    pub fn sparse_strategy(&self) -> GrowthStrategy {
        self.sparse
    }

    /// Representation for `count` elements with the given intent.
    ///
    /// Dense requests segment once a single leaf would exceed the dense
    /// segment size. Structured-zero requests stay dense while small, go
    /// sparse past the sparse chunk, and segment into sparse leaves past the
    /// sparse segment size.
    pub fn select(&self, count: u64, intent: Intent) -> Representation {
        match intent {
            Intent::ToBeFilled => {
                if self.dense.is_segmented(count) {
                    Representation::SegmentedDense {
                        index_bits: self.dense.index_bits(),
                    }
                } else {
                    Representation::Dense
                }
            }
            Intent::StructuredZero => {
                if self.sparse.is_segmented(count) {
                    Representation::SegmentedSparse {
                        index_bits: self.sparse.index_bits(),
                    }
                } else if self.sparse.is_chunked(count) {
                    Representation::Sparse
                } else {
                    Representation::Dense
                }
            }
        }
    }

    pub fn make(&self, count: u64, intent: Intent) -> ArrayResult<BasicArray<T>> {
        let representation = self.select(count, intent);
        debug!(
            count,
            ?intent,
            ?representation,
            element_size = T::element_size(),
            "selected representation"
        );
        self.allocate(count, representation)
    }

    fn allocate(&self, count: u64, representation: Representation) -> ArrayResult<BasicArray<T>> {
        Ok(match representation {
            Representation::Dense => DenseArray::with_limit(count, self.max_leaf_len)?.into(),
            Representation::Sparse => SparseArray::with_strategy(count, self.sparse).into(),
            Representation::SegmentedDense { index_bits } => {
                SegmentedArray::partitioned(count, index_bits, SegmentKind::Dense)?.into()
            }
            Representation::SegmentedSparse { index_bits } => {
                SegmentedArray::partitioned(count, index_bits, SegmentKind::Sparse(self.sparse))?.into()
            }
        })
    }

    pub fn make_to_be_filled(&self, count: u64) -> ArrayResult<BasicArray<T>> {
        self.make(count, Intent::ToBeFilled)
    }

    pub fn make_structured_zero(&self, count: u64) -> ArrayResult<BasicArray<T>> {
        self.make(count, Intent::StructuredZero)
    }

    /// Dense-intent array with element `i` taken from the `i`-th call of
    /// `supplier`.
    pub fn make_filled<G: FnMut() -> T>(&self, count: u64, mut supplier: G) -> ArrayResult<BasicArray<T>> {
        let mut array = self.make_to_be_filled(count)?;
        array.fill_range_with(0, count, 1, &mut supplier);
        Ok(array)
    }

    pub fn copy_of(&self, values: &[T]) -> ArrayResult<BasicArray<T>> {
        let count = values.len() as u64;
        if self.select(count, Intent::ToBeFilled) == Representation::Dense {
            return Ok(DenseArray::from_slice(values).into());
        }
        let mut source = values.iter().copied();
        self.make_filled(count, || source.next().unwrap_or(T::ZERO))
    }

    /// Sparse array regardless of size.
    pub fn make_sparse(&self, count: u64) -> SparseArray<T> {
        SparseArray::with_strategy(count, self.sparse)
    }

    /// Segmented array regardless of size, partitioned with the segment size
    /// of the intent's strategy.
    pub fn make_segmented(&self, count: u64, intent: Intent) -> ArrayResult<SegmentedArray<T>> {
        let (index_bits, kind) = match intent {
            Intent::ToBeFilled => (self.dense.index_bits(), SegmentKind::Dense),
            Intent::StructuredZero => (self.sparse.index_bits(), SegmentKind::Sparse(self.sparse)),
        };
        debug!(count, index_bits, ?intent, "forced segmentation");
        SegmentedArray::partitioned(count, index_bits, kind)
    }
}

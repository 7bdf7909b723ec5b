//! # numstore
//!
//! One-dimensional numeric arrays that pick a dense, sparse or segmented
//! layout for you and expose one positional contract over all of them.
//!
//! - **Dense**: a flat `Vec`-backed leaf.
//! - **Sparse**: sorted coordinate list; absent indices read as zero.
//! - **Segmented**: power-of-two sized segments of dense or sparse leaves,
//!   addressed by splitting the 64-bit index into high and low bits.
//!
//! ## Example
//!
//! ```rust
//! use numstore::{ArrayFactory, Representation, Storage};
//!
//! let factory = ArrayFactory::<f64>::new();
//! let mut array = factory.make_structured_zero(1 << 40)?;
//! assert_eq!(array.representation(), Representation::Sparse);
//!
//! array.set(12, 3.0);
//! array.set(1 << 39, -1.5);
//! assert_eq!(array.get(12), 3.0);
//! assert_eq!(array.get(13), 0.0);
//! assert_eq!(array.nonzeros().count(), 2);
//! # Ok::<(), numstore::ArrayError>(())
//! ```
//!
//! Element counts are `u64` throughout, so arrays may be far larger than any
//! single allocation as long as they are sparse or segmented.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

mod access;
mod basic;
mod config;
mod dense;
mod error;
mod factory;
mod growth;
mod list;
mod scalar;
mod segmented;
mod shared;
mod sort;
mod sparse;
mod view;

pub use access::Storage;
pub use basic::{BasicArray, Representation};
pub use config::Config;
pub use dense::DenseArray;
pub use error::{ArrayError, ArrayResult};
pub use factory::{ArrayFactory, Intent};
pub use growth::{largest_power_of_two, GrowthStrategy, GrowthStrategyBuilder};
pub use list::NumberList;
pub use scalar::Scalar;
pub use segmented::{SegmentKind, SegmentedArray};
pub use shared::SharedArray;
pub use sparse::{Nonzeros, SearchResult, SparseArray};
pub use view::{Array1D, Array2D, ArrayAnyD, Shape};

#[cfg(test)]
mod proptests;

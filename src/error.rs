//! Error type shared by every storage representation.

use thiserror::Error;

/// Errors raised by array construction, allocation and transforms.
///
/// Absent entries in a sparse array are not errors: they read as zero.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ArrayError {
    /// A segmented array was given a segment size that is not a power of two.
    #[error("segment size {size} is not a power of two")]
    SegmentSizeNotPowerOfTwo {
        /// The offending size.
        size: u64,
    },

    /// A non-last segment differs in size from the first segment.
    #[error("segment {segment} has {actual} elements, expected {expected}")]
    UnequalSegments {
        /// Position of the segment in the list.
        segment: usize,
        /// Size of the first segment.
        expected: u64,
        /// Size of this segment.
        actual: u64,
    },

    /// The last segment is larger than the uniform segment size.
    #[error("last segment has {last} elements, more than the segment size {segment_size}")]
    LastSegmentTooLarge {
        /// Size of the last segment.
        last: u64,
        /// The uniform segment size.
        segment_size: u64,
    },

    /// A segment handed to a segmented array is itself segmented.
    #[error("segment {segment} is itself segmented")]
    NestedSegments {
        /// Position of the segment in the list.
        segment: usize,
    },

    /// Dense and sparse segments were mixed in one segmented array.
    #[error("segment {segment} is not the same layout as the first segment")]
    MixedSegments {
        /// Position of the segment in the list.
        segment: usize,
    },

    /// A segmented array was built from an empty segment list.
    #[error("a segmented array needs at least one segment")]
    NoSegments,

    /// A transform applied to sparse storage does not map zero to zero.
    #[error("transform does not map zero to zero, sparse storage cannot apply it")]
    ZeroNotPreserved,

    /// A dense leaf was requested with more elements than it can address.
    #[error("requested {requested} elements, a dense leaf holds at most {limit}")]
    CapacityOverflow {
        /// Requested element count.
        requested: u64,
        /// Largest supported element count.
        limit: u64,
    },

    /// A view shape does not cover the wrapped array exactly.
    #[error("shape {shape:?} does not cover {count} elements")]
    ShapeMismatch {
        /// Element count of the wrapped array.
        count: u64,
        /// Requested shape.
        shape: Vec<u64>,
    },

    /// Bulk transfer between arrays of different sizes.
    #[error("count mismatch: expected {expected}, got {actual}")]
    CountMismatch {
        /// Count of the destination.
        expected: u64,
        /// Count of the source.
        actual: u64,
    },
}

/// Result type for array operations.
pub type ArrayResult<T> = Result<T, ArrayError>;

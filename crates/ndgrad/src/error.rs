//! Error types for ndgrad.

use thiserror::Error;

/// Shape and coordinate mismatches.
///
/// Raised by [`TensorData::index`](crate::TensorData::index),
/// [`shape_broadcast`](crate::shape_broadcast) and the other index
/// arithmetic helpers when a coordinate or shape does not fit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexingError {
    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// Index out of bounds.
    #[error("index out of bounds: index {index} is out of range for dimension {dim} with size {dim_size}")]
    IndexOutOfBounds {
        index: usize,
        dim: usize,
        dim_size: usize,
    },

    /// Index that cannot be represented as a position (negative).
    #[error("negative index in dimension {dim}")]
    NegativeIndex { dim: usize },

    /// Two shapes cannot be broadcast together.
    #[error("cannot broadcast shapes {lhs:?} and {rhs:?}: dimension {dim} disagrees")]
    IncompatibleShapes {
        lhs: Vec<usize>,
        rhs: Vec<usize>,
        dim: usize,
    },
}

/// Errors that can occur in layout and gradient operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TensorError {
    /// Coordinate or shape mismatch.
    #[error(transparent)]
    Indexing(#[from] IndexingError),

    /// Linear ordinal past the end of a shape.
    #[error("ordinal {ordinal} out of range for shape of size {size}")]
    OrdinalOutOfRange { ordinal: usize, size: usize },

    /// Shape mismatch between data length and expected size.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Strides do not have one entry per dimension.
    #[error("strides {strides:?} do not match shape {shape:?}")]
    StridesMismatch {
        shape: Vec<usize>,
        strides: Vec<usize>,
    },

    /// Product of the shape does not fit in `usize`.
    #[error("size of shape {shape:?} overflows usize")]
    SizeOverflow { shape: Vec<usize> },

    /// Strides address positions past the end of storage.
    #[error("strides {strides:?} for shape {shape:?} reach past storage of length {len}")]
    StridesOutOfStorage {
        shape: Vec<usize>,
        strides: Vec<usize>,
        len: usize,
    },

    /// Invalid permutation.
    #[error("invalid permutation {perm:?} for tensor with {ndim} dimensions")]
    InvalidPermutation { perm: Vec<usize>, ndim: usize },

    /// Argument position outside the argument list.
    #[error("argument {arg} out of range for {len} arguments")]
    ArgumentOutOfRange { arg: usize, len: usize },
}

impl TensorError {
    /// Whether this error is a shape/coordinate mismatch.
    pub fn is_indexing_error(&self) -> bool {
        matches!(self, TensorError::Indexing(_))
    }
}

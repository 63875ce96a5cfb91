//! Stride computation utilities.
//!
//! Uses row-major (C) order: the last axis varies fastest.

use crate::error::{IndexingError, TensorError};
use smallvec::SmallVec;

/// Dimension sizes of a tensor.
pub type Shape = SmallVec<[usize; 4]>;

/// Storage steps per dimension.
pub type Strides = SmallVec<[usize; 4]>;

/// A multi-dimensional coordinate.
pub type Index = SmallVec<[usize; 4]>;

/// Compute row-major strides from shape.
///
/// For shape [d0, d1, d2, ...], returns strides [d1*d2*..., d2*..., ..., 1].
/// Strides saturate at `usize::MAX` for shapes whose size overflows.
///
/// # Examples
///
/// ```
/// use ndgrad::strides::compute_strides;
///
/// assert_eq!(compute_strides(&[3, 4, 5]).as_slice(), &[20, 5, 1]);
/// assert_eq!(compute_strides(&[4, 2, 2]).as_slice(), &[4, 2, 1]);
/// assert_eq!(compute_strides(&[5]).as_slice(), &[1]);
/// assert!(compute_strides(&[]).is_empty());
/// ```
pub fn compute_strides(shape: &[usize]) -> Strides {
    let mut strides: Strides = SmallVec::from_elem(1, shape.len());
    let mut stride = 1;

    for (slot, &dim) in strides.iter_mut().zip(shape.iter()).rev() {
        *slot = stride;
        stride = stride.saturating_mul(dim);
    }

    strides
}

/// Number of elements described by a shape, `None` if it overflows `usize`.
#[inline]
pub fn shape_size(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// Convert a coordinate to a storage position.
///
/// No bounds checking is done; see [`TensorData::index`](crate::TensorData::index)
/// for the checked version.
#[inline]
pub fn index_to_position(index: &[usize], strides: &[usize]) -> usize {
    index
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Decode a row-major ordinal into a coordinate, written into `out_index`.
///
/// # Errors
///
/// - `TensorError::OrdinalOutOfRange` if `ordinal >= size(shape)`
/// - `TensorError::SizeOverflow` if the size of `shape` overflows `usize`
/// - `IndexingError::WrongNumberOfIndices` if `out_index` has the wrong arity
///
/// # Examples
///
/// ```
/// use ndgrad::strides::to_index;
///
/// let mut out = [0, 0];
/// to_index(2, &[2, 2], &mut out).unwrap();
/// assert_eq!(out, [1, 0]);
/// assert!(to_index(4, &[2, 2], &mut out).is_err());
/// ```
pub fn to_index(
    ordinal: usize,
    shape: &[usize],
    out_index: &mut [usize],
) -> Result<(), TensorError> {
    if out_index.len() != shape.len() {
        return Err(IndexingError::WrongNumberOfIndices {
            expected: shape.len(),
            actual: out_index.len(),
        }
        .into());
    }
    let size = shape_size(shape).ok_or_else(|| TensorError::SizeOverflow {
        shape: shape.to_vec(),
    })?;
    if ordinal >= size {
        return Err(TensorError::OrdinalOutOfRange { ordinal, size });
    }

    let mut rest = ordinal;
    for (slot, &dim) in out_index.iter_mut().zip(shape.iter()).rev() {
        *slot = rest % dim;
        rest /= dim;
    }

    Ok(())
}

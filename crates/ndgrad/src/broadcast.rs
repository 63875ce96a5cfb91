//! Shape broadcasting.
//!
//! Shapes are aligned at their trailing dimension; the shorter shape is
//! treated as if padded on the left with 1s. A dimension of size 1 stretches
//! to match the other operand.

use crate::error::IndexingError;
use crate::strides::Shape;
use smallvec::SmallVec;

/// Compute the shape two operands broadcast to.
///
/// # Errors
///
/// Returns `IndexingError::IncompatibleShapes` for the first aligned pair of
/// dimensions that are different and neither 1.
///
/// # Examples
///
/// ```
/// use ndgrad::shape_broadcast;
///
/// assert_eq!(shape_broadcast(&[1], &[5, 5]).unwrap().as_slice(), &[5, 5]);
/// assert_eq!(shape_broadcast(&[2, 5], &[5]).unwrap().as_slice(), &[2, 5]);
/// assert!(shape_broadcast(&[5, 2], &[5]).is_err());
/// ```
pub fn shape_broadcast(lhs: &[usize], rhs: &[usize]) -> Result<Shape, IndexingError> {
    let ndim = lhs.len().max(rhs.len());
    let mut out: Shape = SmallVec::from_elem(1, ndim);

    // Walk from the trailing dimension so a missing leading axis reads as 1.
    for offset in 1..=ndim {
        let l = dim_from_end(lhs, offset);
        let r = dim_from_end(rhs, offset);
        let dim = ndim - offset;

        out[dim] = match (l, r) {
            (l, r) if l == r => l,
            (1, r) => r,
            (l, 1) => l,
            _ => {
                return Err(IndexingError::IncompatibleShapes {
                    lhs: lhs.to_vec(),
                    rhs: rhs.to_vec(),
                    dim,
                });
            }
        };
    }

    Ok(out)
}

#[inline]
fn dim_from_end(shape: &[usize], offset: usize) -> usize {
    if offset <= shape.len() {
        shape[shape.len() - offset]
    } else {
        1
    }
}

/// Map a coordinate of a broadcast result back into one of its operands.
///
/// `big_index` is a coordinate in `big_shape`; the matching coordinate in
/// `shape` is written into `out_index`. Leading axes of `big_shape` with no
/// counterpart in `shape` are dropped, and axes where `shape` has size 1 map
/// to 0.
///
/// # Errors
///
/// Returns `IndexingError::WrongNumberOfIndices` when `big_index` does not
/// match `big_shape`, when `shape` has more dimensions than `big_shape`, or
/// when `out_index` does not match `shape`.
///
/// # Examples
///
/// ```
/// use ndgrad::broadcast_index;
///
/// let mut out = [0; 4];
/// broadcast_index(&[4, 3, 2, 1], &[5, 5, 4, 4], &[5, 5, 1, 1], &mut out).unwrap();
/// assert_eq!(out, [4, 3, 0, 0]);
/// ```
pub fn broadcast_index(
    big_index: &[usize],
    big_shape: &[usize],
    shape: &[usize],
    out_index: &mut [usize],
) -> Result<(), IndexingError> {
    if big_index.len() != big_shape.len() {
        return Err(IndexingError::WrongNumberOfIndices {
            expected: big_shape.len(),
            actual: big_index.len(),
        });
    }
    if shape.len() > big_shape.len() {
        return Err(IndexingError::WrongNumberOfIndices {
            expected: big_shape.len(),
            actual: shape.len(),
        });
    }
    if out_index.len() != shape.len() {
        return Err(IndexingError::WrongNumberOfIndices {
            expected: shape.len(),
            actual: out_index.len(),
        });
    }

    let skip = big_shape.len() - shape.len();
    for ((out, &dim), &big) in out_index
        .iter_mut()
        .zip(shape.iter())
        .zip(big_index[skip..].iter())
    {
        *out = if dim == 1 { 0 } else { big };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broadcast(lhs: &[usize], rhs: &[usize]) -> Vec<usize> {
        shape_broadcast(lhs, rhs).unwrap().to_vec()
    }

    #[test]
    fn test_shape_broadcast_scalar_like() {
        assert_eq!(broadcast(&[1], &[5, 5]), vec![5, 5]);
        assert_eq!(broadcast(&[5, 5], &[1]), vec![5, 5]);
    }

    #[test]
    fn test_shape_broadcast_keeps_leading_one() {
        assert_eq!(broadcast(&[1, 5, 5], &[5, 5]), vec![1, 5, 5]);
        assert_eq!(broadcast(&[5, 5], &[1, 5, 5]), vec![1, 5, 5]);
    }

    #[test]
    fn test_shape_broadcast_interleaved_ones() {
        assert_eq!(broadcast(&[5, 1, 5, 1], &[1, 5, 1, 5]), vec![5, 5, 5, 5]);
    }

    #[test]
    fn test_shape_broadcast_incompatible() {
        let err = shape_broadcast(&[5, 7, 5, 1], &[1, 5, 1, 5]).unwrap_err();
        assert_eq!(
            err,
            IndexingError::IncompatibleShapes {
                lhs: vec![5, 7, 5, 1],
                rhs: vec![1, 5, 1, 5],
                dim: 1,
            }
        );
        assert!(shape_broadcast(&[5, 2], &[5]).is_err());
        assert_eq!(broadcast(&[2, 5], &[5]), vec![2, 5]);
    }

    #[test]
    fn test_shape_broadcast_empty() {
        assert!(broadcast(&[], &[]).is_empty());
        assert_eq!(broadcast(&[], &[3, 2]), vec![3, 2]);
    }

    #[test]
    fn test_broadcast_index_to_size_one() {
        let mut out = [9];
        broadcast_index(&[2, 3], &[5, 5], &[1], &mut out).unwrap();
        assert_eq!(out, [0]);
    }

    #[test]
    fn test_broadcast_index_drops_leading_axes() {
        let mut out = [0];
        broadcast_index(&[2, 3], &[5, 5], &[5], &mut out).unwrap();
        assert_eq!(out, [3]);
    }

    #[test]
    fn test_broadcast_index_mixed() {
        let mut out = [0; 4];
        broadcast_index(&[4, 3, 2, 1], &[5, 5, 4, 4], &[5, 5, 1, 1], &mut out).unwrap();
        assert_eq!(out, [4, 3, 0, 0]);
    }

    #[test]
    fn test_broadcast_index_bad_arity() {
        let mut out = [0; 3];
        assert!(broadcast_index(&[0, 0], &[5, 5], &[1, 5, 5], &mut out).is_err());
        let mut out = [0; 2];
        assert!(broadcast_index(&[0, 0], &[5, 5], &[5], &mut out).is_err());
        assert!(broadcast_index(&[0], &[5, 5], &[5, 5], &mut out).is_err());
    }
}

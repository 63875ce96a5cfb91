//! Strided storage layout.
//!
//! A [`TensorData`] pairs a flat storage buffer with a shape and strides.
//! Views produced by [`TensorData::permute`] share the same buffer: no data
//! is copied, and writes through one view are visible through all of them.

use crate::broadcast;
use crate::error::{IndexingError, TensorError};
use crate::strides::{Index, Shape, Strides, compute_strides, index_to_position, shape_size};
use rand::Rng;
use smallvec::SmallVec;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Shared flat storage behind one or more layouts.
pub type Storage<T> = Rc<RefCell<Vec<T>>>;

/// Flat storage plus the shape/stride layout used to address it.
///
/// Cloning is cheap and yields another view over the same storage.
#[derive(Debug, Clone)]
pub struct TensorData<T> {
    storage: Storage<T>,
    shape: Shape,
    strides: Strides,
    size: usize,
}

impl<T> TensorData<T> {
    /// Create a contiguous (row-major) layout over `storage`.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if the storage length differs
    /// from the product of `shape`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndgrad::TensorData;
    ///
    /// let td = TensorData::new(vec![0.0; 16], &[4, 2, 2]).unwrap();
    /// assert_eq!(td.strides(), &[4, 2, 1]);
    /// assert!(td.is_contiguous());
    /// ```
    pub fn new(storage: Vec<T>, shape: &[usize]) -> Result<Self, TensorError> {
        Self::with_strides(storage, shape, &compute_strides(shape))
    }

    /// Create a layout with explicit strides.
    ///
    /// # Errors
    ///
    /// - `TensorError::StridesMismatch` if `strides.len() != shape.len()`
    /// - `TensorError::SizeOverflow` if the product of `shape` overflows
    /// - `TensorError::ShapeMismatch` if the storage length differs from the
    ///   product of `shape`
    /// - `TensorError::StridesOutOfStorage` if some coordinate would map
    ///   past the end of storage
    pub fn with_strides(
        storage: Vec<T>,
        shape: &[usize],
        strides: &[usize],
    ) -> Result<Self, TensorError> {
        if strides.len() != shape.len() {
            return Err(TensorError::StridesMismatch {
                shape: shape.to_vec(),
                strides: strides.to_vec(),
            });
        }
        let size = shape_size(shape).ok_or_else(|| TensorError::SizeOverflow {
            shape: shape.to_vec(),
        })?;
        if storage.len() != size {
            return Err(TensorError::ShapeMismatch {
                expected: size,
                actual: storage.len(),
            });
        }
        if size > 0 && !last_position(shape, strides).is_some_and(|p| p < storage.len()) {
            return Err(TensorError::StridesOutOfStorage {
                shape: shape.to_vec(),
                strides: strides.to_vec(),
                len: storage.len(),
            });
        }
        Ok(Self {
            storage: Rc::new(RefCell::new(storage)),
            shape: SmallVec::from_slice(shape),
            strides: SmallVec::from_slice(strides),
            size,
        })
    }

    /// Get the shape.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get strides.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Get the rank (number of dimensions).
    #[inline]
    pub fn dims(&self) -> usize {
        self.shape.len()
    }

    /// Get total number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Borrow the flat storage.
    ///
    /// # Panics
    ///
    /// Panics if the storage is being written through [`TensorData::set`]
    /// at the same time.
    pub fn storage(&self) -> Ref<'_, [T]> {
        Ref::map(self.storage.borrow(), |v| v.as_slice())
    }

    /// Whether two layouts are views over the same storage.
    pub fn shares_storage(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Split into the shared storage, shape and strides.
    pub fn into_parts(self) -> (Storage<T>, Shape, Strides) {
        (self.storage, self.shape, self.strides)
    }

    /// Whether the strides are the canonical row-major strides for the shape.
    pub fn is_contiguous(&self) -> bool {
        self.strides == compute_strides(&self.shape)
    }

    /// Compute the storage position of a coordinate.
    ///
    /// Coordinates may be given in any integer type; a negative component is
    /// reported as `IndexingError::NegativeIndex`.
    ///
    /// # Errors
    ///
    /// Returns an `IndexingError` if the coordinate has the wrong number of
    /// components or any component is outside its dimension.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndgrad::TensorData;
    ///
    /// let td = TensorData::with_strides(vec![0; 15], &[3, 5], &[5, 1]).unwrap();
    /// assert_eq!(td.index(&[1, 2]).unwrap(), 7);
    /// assert!(td.index(&[-1, 0]).is_err());
    /// assert!(td.index(&[0]).is_err());
    /// ```
    pub fn index<I>(&self, index: &[I]) -> Result<usize, IndexingError>
    where
        I: Copy + TryInto<usize>,
    {
        if index.len() != self.dims() {
            return Err(IndexingError::WrongNumberOfIndices {
                expected: self.dims(),
                actual: index.len(),
            });
        }

        let mut position = 0;
        for (dim, ((&idx, &dim_size), &stride)) in index
            .iter()
            .zip(self.shape.iter())
            .zip(self.strides.iter())
            .enumerate()
        {
            let idx: usize = idx
                .try_into()
                .map_err(|_| IndexingError::NegativeIndex { dim })?;
            if idx >= dim_size {
                return Err(IndexingError::IndexOutOfBounds {
                    index: idx,
                    dim,
                    dim_size,
                });
            }
            position += idx * stride;
        }

        Ok(position)
    }

    /// Iterate over every coordinate of the shape in row-major order.
    ///
    /// Each call starts a fresh enumeration.
    pub fn indices(&self) -> Indices {
        Indices::new(&self.shape, self.size)
    }

    /// Draw a uniformly random valid coordinate.
    ///
    /// Returns `None` when the shape has no elements.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Index> {
        if self.size == 0 {
            return None;
        }
        Some(self.shape.iter().map(|&d| rng.random_range(0..d)).collect())
    }

    /// Reorder dimensions without copying storage.
    ///
    /// `order[i]` names the source dimension that becomes dimension `i`.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::InvalidPermutation` unless `order` is a
    /// permutation of `0..dims`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndgrad::TensorData;
    ///
    /// let td = TensorData::new(vec![0; 6], &[2, 3]).unwrap();
    /// let t = td.permute(&[1, 0]).unwrap();
    /// assert_eq!(t.shape(), &[3, 2]);
    /// assert_eq!(t.strides(), &[1, 3]);
    /// assert_eq!(td.index(&[1, 2]).unwrap(), t.index(&[2, 1]).unwrap());
    /// ```
    pub fn permute(&self, order: &[usize]) -> Result<Self, TensorError> {
        if !is_permutation(order, self.dims()) {
            return Err(TensorError::InvalidPermutation {
                perm: order.to_vec(),
                ndim: self.dims(),
            });
        }

        Ok(Self {
            storage: Rc::clone(&self.storage),
            shape: order.iter().map(|&d| self.shape[d]).collect(),
            strides: order.iter().map(|&d| self.strides[d]).collect(),
            size: self.size,
        })
    }

    /// Broadcast two shapes; see [`shape_broadcast`](crate::shape_broadcast).
    pub fn shape_broadcast(lhs: &[usize], rhs: &[usize]) -> Result<Shape, IndexingError> {
        broadcast::shape_broadcast(lhs, rhs)
    }
}

impl<T: Copy> TensorData<T> {
    /// Read the element at a coordinate.
    pub fn get<I>(&self, index: &[I]) -> Result<T, IndexingError>
    where
        I: Copy + TryInto<usize>,
    {
        let position = self.index(index)?;
        Ok(self.storage.borrow()[position])
    }

    /// Write the element at a coordinate.
    ///
    /// The write lands in the shared storage and is visible through every
    /// view of it.
    pub fn set<I>(&self, index: &[I], value: T) -> Result<(), IndexingError>
    where
        I: Copy + TryInto<usize>,
    {
        let position = self.index(index)?;
        self.storage.borrow_mut()[position] = value;
        Ok(())
    }
}

/// Largest position any coordinate of a non-empty shape maps to.
fn last_position(shape: &[usize], strides: &[usize]) -> Option<usize> {
    shape
        .iter()
        .zip(strides.iter())
        .try_fold(0usize, |acc, (&dim, &stride)| {
            (dim - 1).checked_mul(stride)?.checked_add(acc)
        })
}

fn is_permutation(order: &[usize], ndim: usize) -> bool {
    if order.len() != ndim {
        return false;
    }
    let mut seen: SmallVec<[bool; 8]> = SmallVec::from_elem(false, ndim);
    for &d in order {
        if d >= ndim || seen[d] {
            return false;
        }
        seen[d] = true;
    }
    true
}

/// Row-major enumeration of every coordinate of a shape.
#[derive(Debug, Clone)]
pub struct Indices {
    shape: Shape,
    current: Index,
    remaining: usize,
}

impl Indices {
    /// Start an enumeration of `shape`, which holds `size` elements, at the
    /// zero coordinate.
    fn new(shape: &[usize], size: usize) -> Self {
        Self {
            shape: SmallVec::from_slice(shape),
            current: SmallVec::from_elem(0, shape.len()),
            remaining: size,
        }
    }
}

impl Iterator for Indices {
    type Item = Index;

    fn next(&mut self) -> Option<Index> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let item = self.current.clone();

        // Odometer step, last axis fastest.
        for (slot, &dim) in self.current.iter_mut().zip(self.shape.iter()).rev() {
            *slot += 1;
            if *slot < dim {
                break;
            }
            *slot = 0;
        }

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Indices {}

impl<T: fmt::Display> fmt::Display for TensorData<T> {
    /// Nested brackets, one level per dimension.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.size == 0 {
            return write!(f, "[]");
        }

        let storage = self.storage.borrow();
        for index in self.indices() {
            let opening = index.iter().rev().take_while(|&&i| i == 0).count();
            for _ in 0..opening {
                f.write_str("[")?;
            }

            write!(f, "{}", storage[index_to_position(&index, &self.strides)])?;

            let closing = index
                .iter()
                .zip(self.shape.iter())
                .rev()
                .take_while(|&(&i, &d)| i + 1 == d)
                .count();
            for _ in 0..closing {
                f.write_str("]")?;
            }
            if closing < self.dims() {
                f.write_str(if closing == 0 { ", " } else { ",\n" })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_layout_contiguous() {
        let td = TensorData::with_strides(vec![0; 15], &[3, 5], &[5, 1]).unwrap();
        assert!(td.is_contiguous());
        assert_eq!(td.shape(), &[3, 5]);
        assert_eq!(td.index(&[1, 0]).unwrap(), 5);
        assert_eq!(td.index(&[1, 2]).unwrap(), 7);
    }

    #[test]
    fn test_layout_not_contiguous() {
        let td = TensorData::with_strides(vec![0; 15], &[5, 3], &[1, 5]).unwrap();
        assert_eq!(td.shape(), &[5, 3]);
        assert!(!td.is_contiguous());
    }

    #[test]
    fn test_layout_bad_strides() {
        let err = TensorData::with_strides(vec![0; 15], &[3, 5], &[6]).unwrap_err();
        assert!(matches!(err, TensorError::StridesMismatch { .. }));
    }

    #[test]
    fn test_layout_strides_past_storage() {
        let err = TensorData::with_strides(vec![0.0; 4], &[2, 2], &[10, 1]).unwrap_err();
        assert_eq!(
            err,
            TensorError::StridesOutOfStorage {
                shape: vec![2, 2],
                strides: vec![10, 1],
                len: 4
            }
        );
        // Stride overflow is rejected the same way.
        assert!(TensorData::with_strides(vec![0; 4], &[2, 2], &[usize::MAX, 1]).is_err());
    }

    #[test]
    fn test_layout_strides_within_storage() {
        // Column-major and broadcast-style zero strides stay in bounds.
        let td = TensorData::with_strides(vec![0; 6], &[2, 3], &[1, 2]).unwrap();
        assert_eq!(td.index(&[1, 2]).unwrap(), 5);
        let td = TensorData::with_strides(vec![7; 3], &[1, 3], &[0, 1]).unwrap();
        assert_eq!(td.to_string(), "[[7, 7, 7]]");
        let empty = TensorData::<f64>::with_strides(vec![], &[0, 3], &[100, 1]).unwrap();
        assert_eq!(empty.indices().count(), 0);
    }

    #[test]
    fn test_layout_size_overflow() {
        let err = TensorData::<f64>::with_strides(vec![], &[usize::MAX, 3], &[1, 1]).unwrap_err();
        assert_eq!(
            err,
            TensorError::SizeOverflow {
                shape: vec![usize::MAX, 3]
            }
        );
        assert!(TensorData::<f64>::new(vec![], &[usize::MAX, 3]).is_err());
    }

    #[test]
    fn test_layout_bad_storage() {
        let err = TensorData::new(vec![0; 14], &[3, 5]).unwrap_err();
        assert_eq!(
            err,
            TensorError::ShapeMismatch {
                expected: 15,
                actual: 14
            }
        );
    }

    #[test]
    fn test_index_errors() {
        let td = TensorData::new(vec![0; 6], &[2, 3]).unwrap();
        assert_eq!(
            td.index(&[0]).unwrap_err(),
            IndexingError::WrongNumberOfIndices {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(
            td.index(&[0, -1]).unwrap_err(),
            IndexingError::NegativeIndex { dim: 1 }
        );
        assert_eq!(
            td.index(&[2, 0]).unwrap_err(),
            IndexingError::IndexOutOfBounds {
                index: 2,
                dim: 0,
                dim_size: 2
            }
        );
    }

    #[test]
    fn test_indices_order() {
        let td = TensorData::new(vec![0; 6], &[2, 3]).unwrap();
        let all: Vec<Vec<usize>> = td.indices().map(|i| i.to_vec()).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
        assert_eq!(td.indices().len(), 6);
    }

    #[test]
    fn test_indices_scalar_shape() {
        let td = TensorData::new(vec![7.0], &[]).unwrap();
        let all: Vec<Index> = td.indices().collect();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_empty());
        assert_eq!(td.get::<usize>(&[]).unwrap(), 7.0);
    }

    #[test]
    fn test_permute_shares_storage() {
        let td = TensorData::new((0..6).collect(), &[2, 3]).unwrap();
        let t = td.permute(&[1, 0]).unwrap();
        assert!(td.shares_storage(&t));
        assert!(!t.is_contiguous());
        assert_eq!(t.get(&[2, 1]).unwrap(), 5);

        t.set(&[0, 1], 42).unwrap();
        assert_eq!(td.get(&[1, 0]).unwrap(), 42);
    }

    #[test]
    fn test_permute_invalid() {
        let td = TensorData::new(vec![0; 6], &[2, 3]).unwrap();
        assert!(td.permute(&[0, 0]).is_err());
        assert!(td.permute(&[0]).is_err());
        assert!(td.permute(&[0, 2]).is_err());
    }

    #[test]
    fn test_sample_in_bounds() {
        let td = TensorData::new(vec![0; 24], &[2, 3, 4]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let idx = td.sample(&mut rng).unwrap();
            assert!(td.index(idx.as_slice()).is_ok());
        }
    }

    #[test]
    fn test_display() {
        let td = TensorData::new(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        assert_eq!(td.to_string(), "[[1, 2],\n[3, 4]]");

        let v = TensorData::new(vec![1, 2, 3], &[3]).unwrap();
        assert_eq!(v.to_string(), "[1, 2, 3]");

        let s = TensorData::new(vec![5], &[]).unwrap();
        assert_eq!(s.to_string(), "5");
    }
}

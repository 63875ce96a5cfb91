//! ndgrad - differentiation and indexing core for small tensor libraries
//!
//! Two pieces every tensor operator builds on:
//!
//! - [`autodiff`]: computation graphs recorded during the forward pass and
//!   reverse-mode propagation of derivatives to the graph's leaves
//! - layout arithmetic: [`TensorData`] maps coordinates to positions in flat
//!   storage through shape and strides, and [`shape_broadcast`] /
//!   [`broadcast_index`] combine operands of different shapes
//!
//! # Example
//!
//! ```
//! use ndgrad::{TensorData, broadcast_index, shape_broadcast};
//!
//! // Row-major 3x5 layout
//! let td = TensorData::new(vec![0.0; 15], &[3, 5]).unwrap();
//! assert_eq!(td.index(&[1, 2]).unwrap(), 7);
//!
//! // Transposed view over the same storage
//! let t = td.permute(&[1, 0]).unwrap();
//! assert_eq!(t.index(&[2, 1]).unwrap(), 7);
//!
//! // (5, 5) + (5,) broadcasts to (5, 5); coordinate (2, 3) reads (3,)
//! assert_eq!(shape_broadcast(&[5, 5], &[5]).unwrap().as_slice(), &[5, 5]);
//! let mut out = [0];
//! broadcast_index(&[2, 3], &[5, 5], &[5], &mut out).unwrap();
//! assert_eq!(out, [3]);
//! ```

#[cfg(feature = "autodiff")]
pub mod autodiff;
pub mod broadcast;
pub mod error;
pub mod strides;
pub mod tensor_data;

pub use broadcast::{broadcast_index, shape_broadcast};
pub use error::{IndexingError, TensorError};
pub use strides::{Index, Shape, Strides, index_to_position, to_index};
pub use tensor_data::{Indices, TensorData};

//! Reverse-mode automatic differentiation over scalar computation graphs.
//!
//! Operators build the graph as the forward pass runs: each result points
//! at the values it was computed from, and keeps a [`Context`] of whatever
//! its backward computation needs. Backpropagation orders the graph so that
//! every node comes after all its consumers, then walks that order pushing
//! derivatives towards the leaves.
//!
//! # Architecture
//!
//! ```text
//! Tape ──allocates ids──► Node (Leaf | Constant | Operation)
//!   │                                        │
//!   └─ apply(Function, inputs) ─► Context ◄──┘
//!
//! backpropagate(root) ─► topological_sort(root) ─► chain_rule per node
//!                                                   │
//!                                  Derivatives ◄────┴──► leaf.accumulate_derivative
//! ```
//!
//! The traversal works on any type implementing [`Variable`]; [`Node`] is
//! the scalar implementation built by a [`Tape`].
//!
//! # Example
//!
//! ```
//! use ndgrad::autodiff::{Context, Function, Tape};
//!
//! #[derive(Debug)]
//! struct Add;
//!
//! impl Function for Add {
//!     fn forward(&self, _ctx: &mut Context, inputs: &[f64]) -> f64 {
//!         inputs[0] + inputs[1]
//!     }
//!
//!     fn backward(&self, _ctx: &Context, d_output: f64) -> Vec<f64> {
//!         vec![d_output, d_output]
//!     }
//! }
//!
//! let tape = Tape::new();
//! let a = tape.leaf(1.0);
//! let b = tape.leaf(2.0);
//! let c = tape.apply(Add, &[a.clone(), b.clone()]);
//! c.backward();
//!
//! assert_eq!(a.derivative(), Some(1.0));
//! assert_eq!(b.derivative(), Some(1.0));
//! ```
//!
//! # Design Notes
//!
//! - Single-threaded: nodes use `Rc` and `Cell`, no locking
//! - Leaf gradients add up across passes until [`Node::zero_grad`]
//! - Graph depth is limited by memory only (explicit traversal stack)

mod backward;
mod context;
mod derivatives;
mod function;
mod id;
mod node;
mod numeric;
mod tape;
mod variable;

pub use backward::{backpropagate, topological_sort};
pub use context::Context;
pub use derivatives::Derivatives;
pub use function::Function;
pub use id::{IdAllocator, VariableId};
pub use node::Node;
pub use numeric::{DEFAULT_EPSILON, central_difference, central_difference_default};
pub use tape::Tape;
pub use variable::Variable;

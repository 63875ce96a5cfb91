//! Graph construction.

use super::context::Context;
use super::function::Function;
use super::id::IdAllocator;
use super::node::Node;
use std::cell::Cell;
use tracing::debug;

/// Builds computation graph nodes and assigns their identities.
///
/// Ids are unique per tape; nodes from different tapes must not be combined
/// in one graph.
///
/// # Example
///
/// ```
/// use ndgrad::autodiff::{Context, Function, Tape};
///
/// #[derive(Debug)]
/// struct Mul;
///
/// impl Function for Mul {
///     fn forward(&self, ctx: &mut Context, inputs: &[f64]) -> f64 {
///         ctx.save_for_backward(inputs.iter().copied());
///         inputs[0] * inputs[1]
///     }
///
///     fn backward(&self, ctx: &Context, d_output: f64) -> Vec<f64> {
///         let saved = ctx.saved_tensors();
///         vec![d_output * saved[1], d_output * saved[0]]
///     }
/// }
///
/// let tape = Tape::new();
/// let x = tape.leaf(3.0);
/// let y = tape.leaf(4.0);
/// let z = tape.apply(Mul, &[x.clone(), y.clone()]);
/// z.backward();
///
/// assert_eq!(z.value(), 12.0);
/// assert_eq!(x.derivative(), Some(4.0));
/// assert_eq!(y.derivative(), Some(3.0));
/// ```
#[derive(Debug, Default)]
pub struct Tape {
    ids: IdAllocator,
    no_grad: Cell<bool>,
}

impl Tape {
    /// Create a tape that tracks gradients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tape whose operations never track gradients.
    pub fn without_grad() -> Self {
        let tape = Self::new();
        tape.set_no_grad(true);
        tape
    }

    /// Create a tape drawing ids from `ids`.
    pub fn with_allocator(ids: IdAllocator) -> Self {
        Self {
            ids,
            no_grad: Cell::new(false),
        }
    }

    /// Whether operations are currently untracked.
    pub fn is_no_grad(&self) -> bool {
        self.no_grad.get()
    }

    /// Switch gradient tracking off (`true`) or back on (`false`).
    pub fn set_no_grad(&self, no_grad: bool) {
        self.no_grad.set(no_grad);
    }

    /// Create an input whose gradient is accumulated.
    pub fn leaf(&self, value: f64) -> Node {
        Node::leaf(self.ids.allocate(), value)
    }

    /// Create a value excluded from differentiation.
    pub fn constant(&self, value: f64) -> Node {
        Node::constant(self.ids.allocate(), value)
    }

    /// Run `function` forward on `inputs` and record the result.
    ///
    /// The result is an operation node pointing at `inputs` when any input
    /// requires gradients and the tape is tracking; otherwise it is a
    /// constant and the context saves nothing.
    pub fn apply<F: Function + 'static>(&self, function: F, inputs: &[Node]) -> Node {
        let need_grad = !self.is_no_grad() && inputs.iter().any(Node::requires_grad);
        let mut ctx = Context::new(!need_grad);
        let values: Vec<f64> = inputs.iter().map(Node::value).collect();
        let value = function.forward(&mut ctx, &values);

        let id = self.ids.allocate();
        if need_grad {
            Node::operation(id, value, inputs.to_vec(), ctx, Box::new(function))
        } else {
            debug!(%id, ?function, "untracked operation, result is constant");
            Node::constant(id, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::Variable;

    #[derive(Debug)]
    struct Square;

    impl Function for Square {
        fn forward(&self, ctx: &mut Context, inputs: &[f64]) -> f64 {
            ctx.save_for_backward([inputs[0]]);
            inputs[0] * inputs[0]
        }

        fn backward(&self, ctx: &Context, d_output: f64) -> Vec<f64> {
            vec![d_output * 2.0 * ctx.saved_tensors()[0]]
        }
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let tape = Tape::new();
        let a = tape.leaf(1.0);
        let b = tape.constant(2.0);
        let c = tape.apply(Square, &[a.clone()]);
        assert!(a.id() < b.id());
        assert!(b.id() < c.id());
    }

    #[test]
    fn test_with_allocator() {
        let tape = Tape::with_allocator(IdAllocator::starting_at(10));
        assert_eq!(tape.leaf(0.0).id().get(), 10);
    }

    #[test]
    fn test_apply_tracks_leaf_inputs() {
        let tape = Tape::new();
        let x = tape.leaf(3.0);
        let y = tape.apply(Square, &[x.clone()]);
        assert_eq!(y.value(), 9.0);
        assert!(!y.is_constant());
        assert_eq!(y.context().unwrap().saved_tensors(), &[3.0]);
        assert_eq!(y.inputs()[0].id(), x.id());
    }

    #[test]
    fn test_apply_constant_inputs() {
        let tape = Tape::new();
        let c = tape.constant(3.0);
        let y = tape.apply(Square, &[c]);
        assert_eq!(y.value(), 9.0);
        assert!(y.is_constant());
    }

    #[test]
    fn test_no_grad_tape() {
        let tape = Tape::without_grad();
        let x = tape.leaf(3.0);
        let y = tape.apply(Square, &[x.clone()]);
        assert!(y.is_constant());
        assert!(y.context().is_none());

        tape.set_no_grad(false);
        let z = tape.apply(Square, &[x]);
        assert!(!z.is_constant());
    }
}

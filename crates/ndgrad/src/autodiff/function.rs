//! Operator interface.

use super::context::Context;
use std::fmt::Debug;

/// A differentiable scalar operation.
///
/// `forward` computes the result and saves whatever `backward` will need in
/// the context. `backward` returns one local derivative per input, already
/// multiplied by `d_output`, in input order.
///
/// A derivative list of the wrong length is not an error. It is paired with
/// the inputs up to the shorter of the two lengths and a warning is logged;
/// inputs without a derivative receive no contribution.
pub trait Function: Debug {
    /// Compute the output from the input values.
    fn forward(&self, ctx: &mut Context, inputs: &[f64]) -> f64;

    /// Compute `d_output * ∂output/∂input` for every input.
    fn backward(&self, ctx: &Context, d_output: f64) -> Vec<f64>;
}

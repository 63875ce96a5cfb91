//! The capability set a graph vertex offers to the backward pass.

use super::id::VariableId;

/// A vertex of the computation graph.
///
/// Implementations are cheap handles: [`Clone`] must not copy the value,
/// only the reference to it. Parent edges point from a value to the values
/// it was computed from; a variable never refers to its consumers.
///
/// There are three kinds of variables:
///
/// - leaves (`is_leaf`): user inputs; gradients land in
///   [`accumulate_derivative`](Variable::accumulate_derivative)
/// - constants (`is_constant`): excluded from differentiation, their parents
///   are never visited
/// - operations (neither): results of a forward computation that convert an
///   upstream derivative into one local derivative per parent
pub trait Variable: Clone {
    /// Identity used to deduplicate nodes during traversal.
    fn unique_id(&self) -> VariableId;

    /// Whether this is a user-created input.
    fn is_leaf(&self) -> bool;

    /// Whether this value is excluded from differentiation.
    fn is_constant(&self) -> bool;

    /// Values this one was computed from, in argument order.
    fn parents(&self) -> Vec<Self>;

    /// Apply the chain rule: one `(parent, d_output * ∂self/∂parent)` pair per
    /// parent edge, in the order of [`parents`](Variable::parents).
    fn chain_rule(&self, d_output: f64) -> Vec<(Self, f64)>;

    /// Add `d` into the persistent gradient slot of a leaf.
    fn accumulate_derivative(&self, d: f64);
}

//! Topological ordering and reverse-mode derivative propagation.

use super::derivatives::Derivatives;
use super::id::VariableId;
use super::variable::Variable;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Order the graph reachable from `root` for the backward pass.
///
/// Returns `root` and every variable reachable from it, each once, such
/// that every variable comes after all of its consumers. Constants appear
/// in the order but their parents are not visited.
///
/// The traversal is a depth-first search on an explicit stack, so graph
/// depth is not limited by the call stack. The graph must be acyclic.
pub fn topological_sort<V: Variable>(root: &V) -> Vec<V> {
    let mut visited: HashSet<VariableId> = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![Frame::new(root.clone())];
    visited.insert(root.unique_id());

    while let Some(top) = stack.last_mut() {
        let next = top.parents.get(top.next).cloned();
        match next {
            Some(parent) => {
                top.next += 1;
                if visited.insert(parent.unique_id()) {
                    stack.push(Frame::new(parent));
                }
            }
            None => {
                // All dependencies are already in `order`.
                if let Some(done) = stack.pop() {
                    order.push(done.node);
                }
            }
        }
    }

    order.reverse();
    order
}

/// A node being expanded, with the position of the next parent to visit.
struct Frame<V> {
    node: V,
    parents: Vec<V>,
    next: usize,
}

impl<V: Variable> Frame<V> {
    fn new(node: V) -> Self {
        let parents = if node.is_constant() {
            Vec::new()
        } else {
            node.parents()
        };
        trace!(id = %node.unique_id(), parents = parents.len(), "expanding");
        Self {
            node,
            parents,
            next: 0,
        }
    }
}

/// Propagate `deriv` (the derivative of the output with respect to `root`)
/// back to every leaf reachable from `root`.
///
/// Each leaf receives its contributions through
/// [`Variable::accumulate_derivative`], which adds to whatever the leaf
/// already holds; reset leaves between independent passes. Constants
/// neither receive nor pass on contributions.
pub fn backpropagate<V: Variable>(root: &V, deriv: f64) {
    let order = topological_sort(root);
    debug!(
        root = %root.unique_id(),
        seed = deriv,
        nodes = order.len(),
        "backpropagating"
    );

    let mut derivatives = Derivatives::with_seed(root.unique_id(), deriv);
    for node in &order {
        if node.is_leaf() || node.is_constant() {
            continue;
        }

        let d_output = derivatives.take(node.unique_id());
        trace!(id = %node.unique_id(), d_output, "chain rule");
        for (parent, d_parent) in node.chain_rule(d_output) {
            if parent.is_constant() {
                continue;
            }
            if parent.is_leaf() {
                parent.accumulate_derivative(d_parent);
            } else {
                derivatives.accumulate(parent.unique_id(), d_parent);
            }
        }
    }
}

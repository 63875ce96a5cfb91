//! Per-operation memo of forward-pass values.

/// Values an operation saves during its forward computation for use by the
/// matching backward computation.
///
/// A context belongs to exactly one forward invocation and is read by that
/// operation's chain rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Context<V = f64> {
    /// When set, [`save_for_backward`](Context::save_for_backward) stores nothing.
    pub no_grad: bool,
    saved_values: Vec<V>,
}

impl<V> Context<V> {
    /// Create an empty context.
    pub fn new(no_grad: bool) -> Self {
        Self {
            no_grad,
            saved_values: Vec::new(),
        }
    }

    /// Store `values` for the backward pass, replacing anything saved before.
    ///
    /// Does nothing when gradients are not tracked (`no_grad`).
    pub fn save_for_backward(&mut self, values: impl IntoIterator<Item = V>) {
        if self.no_grad {
            return;
        }
        self.saved_values = values.into_iter().collect();
    }

    /// The values stored by [`save_for_backward`](Context::save_for_backward).
    pub fn saved_tensors(&self) -> &[V] {
        &self.saved_values
    }
}

impl<V> Default for Context<V> {
    fn default() -> Self {
        Self::new(false)
    }
}

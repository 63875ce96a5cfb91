//! Scalar graph nodes.

use super::backward::backpropagate;
use super::context::Context;
use super::function::Function;
use super::id::VariableId;
use super::variable::Variable;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// Handle to a scalar value in the computation graph.
///
/// Cloning shares the node. A node keeps its parents alive but never its
/// consumers, so dropping the output of a forward pass frees the graph.
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

struct NodeInner {
    id: VariableId,
    value: f64,
    kind: NodeKind,
}

enum NodeKind {
    Leaf {
        derivative: Cell<f64>,
    },
    Constant,
    Operation {
        parents: Vec<Node>,
        ctx: Context,
        function: Box<dyn Function>,
    },
}

impl Node {
    pub(crate) fn leaf(id: VariableId, value: f64) -> Self {
        Self::from_kind(
            id,
            value,
            NodeKind::Leaf {
                derivative: Cell::new(0.0),
            },
        )
    }

    pub(crate) fn constant(id: VariableId, value: f64) -> Self {
        Self::from_kind(id, value, NodeKind::Constant)
    }

    pub(crate) fn operation(
        id: VariableId,
        value: f64,
        parents: Vec<Node>,
        ctx: Context,
        function: Box<dyn Function>,
    ) -> Self {
        Self::from_kind(
            id,
            value,
            NodeKind::Operation {
                parents,
                ctx,
                function,
            },
        )
    }

    fn from_kind(id: VariableId, value: f64, kind: NodeKind) -> Self {
        Self {
            inner: Rc::new(NodeInner { id, value, kind }),
        }
    }

    /// Get node ID.
    pub fn id(&self) -> VariableId {
        self.inner.id
    }

    /// The forward value.
    pub fn value(&self) -> f64 {
        self.inner.value
    }

    /// Whether gradients flow through this node.
    pub fn requires_grad(&self) -> bool {
        !matches!(self.inner.kind, NodeKind::Constant)
    }

    /// Accumulated gradient of a leaf; `None` for other nodes.
    pub fn derivative(&self) -> Option<f64> {
        match &self.inner.kind {
            NodeKind::Leaf { derivative } => Some(derivative.get()),
            _ => None,
        }
    }

    /// Reset a leaf's gradient to zero.
    ///
    /// Gradients add up across backward passes until reset.
    pub fn zero_grad(&self) {
        if let NodeKind::Leaf { derivative } = &self.inner.kind {
            derivative.set(0.0);
        }
    }

    /// The context saved by this node's forward computation.
    pub fn context(&self) -> Option<&Context> {
        match &self.inner.kind {
            NodeKind::Operation { ctx, .. } => Some(ctx),
            _ => None,
        }
    }

    /// Inputs of the operation that produced this node.
    pub fn inputs(&self) -> &[Node] {
        match &self.inner.kind {
            NodeKind::Operation { parents, .. } => parents.as_slice(),
            _ => &[],
        }
    }

    /// Backpropagate from this node with a seed derivative of 1.
    pub fn backward(&self) {
        backpropagate(self, 1.0);
    }

    /// Backpropagate from this node with an explicit seed derivative.
    pub fn backward_with(&self, d_output: f64) {
        backpropagate(self, d_output);
    }
}

impl Variable for Node {
    fn unique_id(&self) -> VariableId {
        self.inner.id
    }

    fn is_leaf(&self) -> bool {
        matches!(self.inner.kind, NodeKind::Leaf { .. })
    }

    fn is_constant(&self) -> bool {
        matches!(self.inner.kind, NodeKind::Constant)
    }

    fn parents(&self) -> Vec<Self> {
        self.inputs().to_vec()
    }

    fn chain_rule(&self, d_output: f64) -> Vec<(Self, f64)> {
        match &self.inner.kind {
            NodeKind::Operation {
                parents,
                ctx,
                function,
            } => {
                let local = function.backward(ctx, d_output);
                if local.len() != parents.len() {
                    warn!(
                        ?function,
                        expected = parents.len(),
                        actual = local.len(),
                        "backward returned the wrong number of derivatives"
                    );
                }
                parents.iter().cloned().zip(local).collect()
            }
            _ => Vec::new(),
        }
    }

    fn accumulate_derivative(&self, d: f64) {
        match &self.inner.kind {
            NodeKind::Leaf { derivative } => derivative.set(derivative.get() + d),
            _ => debug_assert!(false, "only leaves accumulate derivatives"),
        }
    }
}

impl Drop for NodeInner {
    // Unlink long parent chains iteratively instead of recursing through Rc drops.
    fn drop(&mut self) {
        let NodeKind::Operation { parents, .. } = &mut self.kind else {
            return;
        };
        let mut pending = std::mem::take(parents);
        while let Some(node) = pending.pop() {
            if let Ok(mut inner) = Rc::try_unwrap(node.inner) {
                if let NodeKind::Operation { parents, .. } = &mut inner.kind {
                    pending.append(parents);
                }
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("id", &self.inner.id).field("value", &self.inner.value);
        match &self.inner.kind {
            NodeKind::Leaf { derivative } => s.field("derivative", &derivative.get()),
            NodeKind::Constant => s.field("constant", &true),
            NodeKind::Operation {
                parents, function, ..
            } => s.field("function", function).field(
                "parents",
                &parents.iter().map(Node::id).collect::<Vec<_>>(),
            ),
        };
        s.finish()
    }
}

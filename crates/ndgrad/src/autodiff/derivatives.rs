//! Derivative accumulator for one backward pass.

use super::id::VariableId;
use std::collections::HashMap;

/// Running derivative sums keyed by node id.
///
/// Ids never touched read as zero. Nodes with several consumers receive one
/// addition per consumer before they are processed.
#[derive(Debug, Default, Clone)]
pub struct Derivatives {
    values: HashMap<VariableId, f64>,
}

impl Derivatives {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator holding `seed` for `root`.
    pub fn with_seed(root: VariableId, seed: f64) -> Self {
        let mut derivatives = Self::new();
        derivatives.accumulate(root, seed);
        derivatives
    }

    /// Add `d` into the slot for `id`.
    pub fn accumulate(&mut self, id: VariableId, d: f64) {
        *self.values.entry(id).or_insert(0.0) += d;
    }

    /// Current sum for `id`, zero if untouched.
    pub fn get(&self, id: VariableId) -> f64 {
        self.values.get(&id).copied().unwrap_or(0.0)
    }

    /// Remove and return the sum for `id`, zero if untouched.
    pub fn take(&mut self, id: VariableId) -> f64 {
        self.values.remove(&id).unwrap_or(0.0)
    }

    /// Check if a slot has been written.
    pub fn contains(&self, id: VariableId) -> bool {
        self.values.contains_key(&id)
    }

    /// Number of written slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::IdAllocator;

    #[test]
    fn test_default_zero() {
        let ids = IdAllocator::new();
        let derivatives = Derivatives::new();
        assert!(derivatives.is_empty());
        assert_eq!(derivatives.get(ids.allocate()), 0.0);
    }

    #[test]
    fn test_accumulate_multiple() {
        let ids = IdAllocator::new();
        let id = ids.allocate();
        let mut derivatives = Derivatives::new();
        derivatives.accumulate(id, 1.5);
        derivatives.accumulate(id, 2.0);
        assert_eq!(derivatives.get(id), 3.5);
        assert_eq!(derivatives.len(), 1);
    }

    #[test]
    fn test_seed_and_take() {
        let ids = IdAllocator::new();
        let root = ids.allocate();
        let mut derivatives = Derivatives::with_seed(root, 1.0);
        assert!(derivatives.contains(root));
        assert_eq!(derivatives.take(root), 1.0);
        assert!(!derivatives.contains(root));
        assert_eq!(derivatives.take(root), 0.0);
    }
}

//! Node identities.

use std::cell::Cell;
use std::fmt;

/// Identity of a variable in the computation graph.
///
/// Ids from one [`IdAllocator`] are strictly increasing in creation order
/// and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(u64);

impl VariableId {
    /// Get the raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing [`VariableId`]s.
///
/// Owned by whatever builds the graph (usually a [`Tape`](super::Tape));
/// there is no process-wide counter.
#[derive(Debug)]
pub struct IdAllocator {
    /// `None` once `u64::MAX` has been handed out.
    next: Cell<Option<u64>>,
}

impl IdAllocator {
    /// Allocator whose first id is 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Allocator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Cell::new(Some(first)),
        }
    }

    /// Allocate the next id.
    ///
    /// # Panics
    ///
    /// Panics if every id up to and including `u64::MAX` has already been
    /// allocated. Reusing an id would merge unrelated nodes during
    /// backpropagation.
    pub fn allocate(&self) -> VariableId {
        let Some(id) = self.next.get() else {
            panic!("variable ids exhausted");
        };
        self.next.set(id.checked_add(1));
        VariableId(id)
    }

    /// The id the next call to [`allocate`](Self::allocate) will return, or
    /// `None` if the allocator is exhausted.
    pub fn peek(&self) -> Option<VariableId> {
        self.next.get().map(VariableId)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert!(a < b);
    }

    #[test]
    fn test_starting_at() {
        let ids = IdAllocator::starting_at(100);
        assert_eq!(ids.peek(), Some(VariableId(100)));
        assert_eq!(ids.allocate().get(), 100);
        assert_eq!(ids.peek(), Some(VariableId(101)));
    }

    #[test]
    fn test_last_id() {
        let ids = IdAllocator::starting_at(u64::MAX);
        assert_eq!(ids.allocate().get(), u64::MAX);
        assert_eq!(ids.peek(), None);
    }

    #[test]
    #[should_panic(expected = "variable ids exhausted")]
    fn test_exhausted() {
        let ids = IdAllocator::starting_at(u64::MAX);
        ids.allocate();
        ids.allocate();
    }

    #[test]
    fn test_independent_allocators() {
        let a = IdAllocator::new();
        let b = IdAllocator::new();
        a.allocate();
        assert_eq!(b.allocate().get(), 1);
        assert_eq!(format!("{}", a.allocate()), "#2");
    }
}

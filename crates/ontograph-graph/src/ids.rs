//! Recyclable 64-bit handle allocation.
//!
//! Nodes, lines, and interned terms all draw handles from one `IdSet`, so a
//! live node and a live line never share an ID. Handle `0` is reserved to
//! mean "unassigned" on a [`Term`](ontograph_rdf::Term).

use roaring::RoaringTreemap;

use crate::graph::GraphError;

/// Allocator over the u64 handle space with explicit release and reuse.
///
/// `hint` is a low-water mark: no handle below it is free, so allocation
/// scans upward from there and `release` pulls it back down. Released
/// handles are therefore reused smallest-first.
#[derive(Debug, Clone)]
pub struct IdSet {
    used: RoaringTreemap,
    hint: u64,
}

impl IdSet {
    pub fn new() -> Self {
        Self {
            used: RoaringTreemap::new(),
            hint: 1,
        }
    }

    /// Claim the smallest unused handle.
    pub fn allocate(&mut self) -> Result<u64, GraphError> {
        let mut id = self.hint.max(1);
        while self.used.contains(id) {
            id = id.checked_add(1).ok_or(GraphError::IdsExhausted)?;
        }
        self.used.insert(id);
        self.hint = id + 1;
        Ok(id)
    }

    /// Return a handle to the pool. Safe to call on handles that were never
    /// allocated; the set is unchanged.
    pub fn release(&mut self, id: u64) {
        self.used.remove(id);
        if id < self.hint {
            self.hint = id;
        }
    }

    /// Reserve an externally supplied handle (a decoder-assigned term UID).
    pub fn mark_used(&mut self, id: u64) {
        self.used.insert(id);
    }

    pub fn contains(&self, id: u64) -> bool {
        self.used.contains(id)
    }

    pub fn len(&self) -> u64 {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

impl Default for IdSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_from_one() {
        let mut ids = IdSet::new();
        assert_eq!(ids.allocate().unwrap(), 1);
        assert_eq!(ids.allocate().unwrap(), 2);
        assert_eq!(ids.allocate().unwrap(), 3);
    }

    #[test]
    fn reuses_smallest_released() {
        let mut ids = IdSet::new();
        for _ in 0..4 {
            ids.allocate().unwrap();
        }
        ids.release(3);
        ids.release(1);
        assert_eq!(ids.allocate().unwrap(), 1);
        assert_eq!(ids.allocate().unwrap(), 3);
        assert_eq!(ids.allocate().unwrap(), 5);
    }

    #[test]
    fn mark_used_is_skipped_by_allocation() {
        let mut ids = IdSet::new();
        ids.mark_used(1);
        ids.mark_used(2);
        assert_eq!(ids.allocate().unwrap(), 3);
        assert!(ids.contains(1));
    }

    #[test]
    fn zero_is_never_allocated() {
        let mut ids = IdSet::new();
        ids.release(0);
        assert_eq!(ids.allocate().unwrap(), 1);
    }
}

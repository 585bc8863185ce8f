//! Row-keyed collision index
//!
//! Broad phase for a lane game: only entities sharing the player's row can
//! touch it, so the index maps an integer row to the handles currently in it.
//! Narrow phase is a 1D interval test on the lateral axis.
//!
//! The index holds handles, never entity data. Every spawn or despawn of a
//! collidable entity must be mirrored here in the same operation.

use std::collections::HashMap;

use crate::entity::EntityId;

/// Maps row index to the handles of entities occupying that row
#[derive(Debug, Clone, Default)]
pub struct CollisionIndex {
    rows: HashMap<usize, Vec<EntityId>>,
}

impl CollisionIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` under `row`; inserting the same handle twice is a no-op
    pub fn insert(&mut self, row: usize, id: EntityId) {
        let bucket = self.rows.entry(row).or_default();
        if !bucket.contains(&id) {
            bucket.push(id);
        }
    }

    /// Remove `id` from `row`, returning whether it was present
    ///
    /// Buckets that become empty are dropped.
    pub fn remove(&mut self, row: usize, id: EntityId) -> bool {
        let Some(bucket) = self.rows.get_mut(&row) else {
            return false;
        };
        let Some(slot) = bucket.iter().position(|&e| e == id) else {
            return false;
        };
        bucket.swap_remove(slot);
        if bucket.is_empty() {
            self.rows.remove(&row);
        }
        true
    }

    /// Handles registered under `row`
    pub fn entities_in_row(&self, row: usize) -> &[EntityId] {
        self.rows.get(&row).map_or(&[], Vec::as_slice)
    }

    /// Whether `id` is registered under `row`
    pub fn contains(&self, row: usize, id: EntityId) -> bool {
        self.entities_in_row(row).contains(&id)
    }

    /// Rows that currently hold at least one handle, ascending
    pub fn non_empty_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.rows.keys().copied().collect();
        rows.sort_unstable();
        rows
    }

    /// Total number of registered handles
    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    /// Whether no handle is registered
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Closed-interval overlap on the lateral axis
pub fn lateral_overlap(a: (f32, f32), b: (f32, f32)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn handles(n: usize) -> Vec<EntityId> {
        let mut arena: SlotMap<EntityId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn test_insert_and_query_by_row() {
        let ids = handles(3);
        let mut index = CollisionIndex::new();
        index.insert(2, ids[0]);
        index.insert(2, ids[1]);
        index.insert(5, ids[2]);
        index.insert(2, ids[0]);

        assert_eq!(index.entities_in_row(2), &[ids[0], ids[1]]);
        assert_eq!(index.entities_in_row(5), &[ids[2]]);
        assert!(index.entities_in_row(3).is_empty());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_remove_by_handle_drops_empty_buckets() {
        let ids = handles(2);
        let mut index = CollisionIndex::new();
        index.insert(1, ids[0]);
        index.insert(4, ids[1]);

        assert!(index.remove(1, ids[0]));
        assert!(!index.remove(1, ids[0]), "second removal is a no-op");
        assert!(!index.remove(4, ids[0]), "wrong row leaves the bucket alone");

        assert_eq!(index.non_empty_rows(), vec![4]);
        assert!(index.contains(4, ids[1]));
    }

    #[test]
    fn test_lateral_overlap() {
        assert!(lateral_overlap((0.0, 2.0), (1.0, 3.0)));
        assert!(lateral_overlap((0.0, 2.0), (2.0, 3.0)), "touching counts");
        assert!(!lateral_overlap((0.0, 2.0), (2.5, 3.0)));
        assert!(lateral_overlap((-1.0, 1.0), (-5.0, 5.0)));
    }
}

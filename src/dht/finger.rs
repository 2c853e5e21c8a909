#![warn(missing_docs)]
//! Finger table: a machine's cache of successors at geometrically spaced
//! targets.
//!
//! Entry i records the live successor of `(own + 2^i) mod 2^b`. Entries
//! hold plain ids, never references; whoever consumes them resolves the id
//! against the ring at use time and must tolerate the pointed-at machine
//! having been replaced since the last rebuild.

use std::ops::Index;

use serde::Deserialize;
use serde::Serialize;

use super::did::Did;
use super::did::IdSpace;

/// One routing entry: a target position and the machine succeeding it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerEntry {
    /// `(own + 2^i) mod 2^b` for entry index i.
    pub target: Did,
    /// The live machine with the smallest id at or after `target`.
    pub successor: Did,
}

/// Per-machine routing table with one entry per identifier-space bit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerTable {
    own: Did,
    entries: Vec<FingerEntry>,
}

impl FingerTable {
    /// An empty table for `own`; it stays empty until the first rebuild.
    pub fn new(own: Did) -> Self {
        Self {
            own,
            entries: Vec::new(),
        }
    }

    /// The machine this table belongs to.
    pub fn own(&self) -> Did {
        self.own
    }

    /// Number of entries: b after a rebuild, 0 before the first one.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// getter
    pub fn get(&self, index: usize) -> Option<&FingerEntry> {
        self.entries.get(index)
    }

    /// The entries in order i = 0, 1, ..., b - 1.
    pub fn entries(&self) -> &[FingerEntry] {
        &self.entries
    }

    /// Recompute every entry against `ids`, the ascending snapshot of live
    /// machine ids. The snapshot must be non-empty.
    pub fn rebuild(&mut self, space: IdSpace, ids: &[Did]) {
        debug_assert!(!ids.is_empty());
        self.entries.clear();
        self.entries.reserve(space.bits() as usize);
        for i in 0..space.bits() {
            let target = space.finger_target(self.own, i);
            let successor = successor_in(ids, target);
            self.entries.push(FingerEntry { target, successor });
        }
    }
}

impl Index<usize> for FingerTable {
    type Output = FingerEntry;
    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

/// Successor of `target` within a sorted id snapshot: the smallest id at or
/// after `target`, wrapping to the minimum when none exists.
pub(crate) fn successor_in(ids: &[Did], target: Did) -> Did {
    let i = ids.partition_point(|id| *id < target);
    if i == ids.len() {
        ids[0]
    } else {
        ids[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dids(values: &[u32]) -> Vec<Did> {
        values.iter().map(|v| Did::from(*v)).collect()
    }

    #[test]
    fn test_successor_in_snapshot() {
        let ids = dids(&[1, 4, 7, 12, 15]);
        assert_eq!(successor_in(&ids, Did::from(0)), Did::from(1));
        assert_eq!(successor_in(&ids, Did::from(4)), Did::from(4));
        assert_eq!(successor_in(&ids, Did::from(5)), Did::from(7));
        assert_eq!(successor_in(&ids, Did::from(9)), Did::from(12));
        // Past the maximum id the successor wraps to the minimum.
        assert_eq!(successor_in(&ids, Did::from(13)), Did::from(15));
        assert_eq!(successor_in(&ids, Did::from(16)), Did::from(1));
    }

    #[test]
    fn test_rebuild_full_width() {
        let space = IdSpace::new(4).unwrap();
        let ids = dids(&[1, 4, 7, 12, 15]);
        let mut table = FingerTable::new(Did::from(1));
        assert!(table.is_empty());

        table.rebuild(space, &ids);
        assert_eq!(table.len(), 4);
        assert_eq!(table[0].target, Did::from(2));
        assert_eq!(table[0].successor, Did::from(4));
        assert_eq!(table[1].target, Did::from(3));
        assert_eq!(table[1].successor, Did::from(4));
        assert_eq!(table[2].target, Did::from(5));
        assert_eq!(table[2].successor, Did::from(7));
        assert_eq!(table[3].target, Did::from(9));
        assert_eq!(table[3].successor, Did::from(12));
    }

    #[test]
    fn test_rebuild_wraps_past_zero() {
        let space = IdSpace::new(4).unwrap();
        let ids = dids(&[1, 4, 7, 12, 15]);
        let mut table = FingerTable::new(Did::from(12));
        table.rebuild(space, &ids);

        // Targets 13, 14, 0 and 4: the first two wrap to machine 15, the
        // third wraps past zero to machine 1.
        assert_eq!(table[0].target, Did::from(13));
        assert_eq!(table[0].successor, Did::from(15));
        assert_eq!(table[1].target, Did::from(14));
        assert_eq!(table[1].successor, Did::from(15));
        assert_eq!(table[2].target, Did::from(0));
        assert_eq!(table[2].successor, Did::from(1));
        assert_eq!(table[3].target, Did::from(4));
        assert_eq!(table[3].successor, Did::from(4));
    }

    #[test]
    fn test_single_machine_points_home() {
        let space = IdSpace::new(3).unwrap();
        let mut table = FingerTable::new(Did::from(5));
        table.rebuild(space, &dids(&[5]));
        assert_eq!(table.len(), 3);
        for entry in table.entries() {
            assert_eq!(entry.successor, Did::from(5));
        }
    }

    #[test]
    fn test_rebuild_replaces_stale_entries() {
        let space = IdSpace::new(2).unwrap();
        let mut table = FingerTable::new(Did::from(0));
        table.rebuild(space, &dids(&[0, 2]));
        assert_eq!(table[0].successor, Did::from(2));

        table.rebuild(space, &dids(&[0, 1, 2, 3]));
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].target, Did::from(1));
        assert_eq!(table[0].successor, Did::from(1));
        assert_eq!(table[1].target, Did::from(2));
        assert_eq!(table[1].successor, Did::from(2));
    }
}

#![warn(missing_docs)]
//! Trait seams of the DHT core.
//!
//! [RingDht](super::RingDht) implements both traits; they exist so an
//! alternative routing engine or placement policy can be written against
//! the same contracts, and so callers can depend on exactly the surface
//! they use.

use super::chord::RemoveOutcome;
use super::chord::SearchOutcome;
use super::chord::StoreReceipt;
use super::did::Did;
use crate::error::Result;

/// Key location over the cyclic ring.
pub trait ChordRouting {
    /// The live machine responsible for `key`: the one with the smallest
    /// id at or after it, wrapping to the minimum.
    fn find_successor(&self, key: Did) -> Result<Did>;

    /// Whether machine `did` owns `key` under the half-open arc rule
    /// `(predecessor(did), did]`.
    fn is_responsible(&self, did: Did, key: Did) -> Result<bool>;

    /// Finger-table walk from `start` to the machine responsible for
    /// `key`; returns every machine id visited, in order, without repeats.
    fn route(&self, start: Did, key: Did) -> Result<Vec<Did>>;
}

/// File placement and retrieval over the ring.
///
/// All three operations route from `start`, so their receipts carry the
/// path actually traversed alongside the responsible machine.
pub trait ChordStore {
    /// Store `(key, path)` on the responsible machine. A key already held
    /// there is rejected and the original record kept.
    fn insert_file(&mut self, start: Did, key: Did, path: &str) -> Result<StoreReceipt>;

    /// Locate the record stored under `key`, if any.
    fn search_file(&self, start: Did, key: Did) -> Result<SearchOutcome>;

    /// Remove the record stored under `key`, if any.
    fn delete_file(&mut self, start: Did, key: Did) -> Result<RemoveOutcome>;
}

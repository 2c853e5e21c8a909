#![warn(missing_docs)]
//! The DHT facade.
//!
//! [RingDht] is the one coherent instance the caller owns: configuration,
//! the machine ring, and the operations of the simulator. Topology changes
//! run validate, mutate membership, redistribute files, rebuild every
//! finger table, report, in that order; file operations route first and
//! then touch exactly one machine's index. Nothing is mutated before
//! validation passes, so failed operations leave the ring untouched.

use serde::Deserialize;
use serde::Serialize;

use super::did::Did;
use super::did::IdSpace;
use super::finger::FingerTable;
use super::ring::MachineRing;
use super::routing;
use super::types::ChordRouting;
use super::types::ChordStore;
use crate::config::DhtConfig;
use crate::error::Error;
use crate::error::Result;
use crate::storage;
use crate::storage::FileRecord;

/// Receipt of a successful file store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReceipt {
    /// Machine now holding the record.
    pub responsible: Did,
    /// Every machine visited while locating it, `start` first.
    pub route: Vec<Did>,
}

/// Outcome of a file search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// The record exists.
    Found {
        /// Machine holding the record.
        responsible: Did,
        /// The stored path.
        path: String,
        /// Machines visited while locating it.
        route: Vec<Did>,
    },
    /// Routing terminated normally but no record carries the key.
    Missing {
        /// Machines visited while locating the key's owner.
        route: Vec<Did>,
    },
}

impl SearchOutcome {
    /// Returns `true` if the outcome is a [SearchOutcome::Found] value.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// The routing path, whichever the outcome.
    pub fn route(&self) -> &[Did] {
        match self {
            Self::Found { route, .. } => route,
            Self::Missing { route } => route,
        }
    }
}

/// Outcome of a file delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoveOutcome {
    /// The record existed and was removed.
    Removed {
        /// Machine that held the record.
        responsible: Did,
        /// The evicted path.
        path: String,
        /// Machines visited while locating it.
        route: Vec<Did>,
    },
    /// Routing terminated normally but no record carries the key.
    Missing {
        /// Machines visited while locating the key's owner.
        route: Vec<Did>,
    },
}

impl RemoveOutcome {
    /// Returns `true` if the outcome is a [RemoveOutcome::Removed] value.
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }

    /// The routing path, whichever the outcome.
    pub fn route(&self) -> &[Did] {
        match self {
            Self::Removed { route, .. } => route,
            Self::Missing { route } => route,
        }
    }
}

/// What a join pulled from its successor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinReport {
    /// Records that migrated to the new machine.
    pub pulled: usize,
    /// The successor they came from; `None` for the first machine.
    pub from: Option<Did>,
}

/// Where a leaver's records went.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveReport {
    /// Successor that inherited the records; `None` when the leaver was
    /// the last machine.
    pub inherited_by: Option<Did>,
    /// Records handed over.
    pub moved: usize,
    /// Records lost because no machine was left to take them.
    pub dropped: usize,
}

/// In-memory simulator of a Chord-style ring DHT.
///
/// Owns the ring, which owns the machines, which own their finger tables
/// and file indexes. Single-threaded: each operation runs to completion
/// before the next is accepted, and there are no hidden globals.
#[derive(Clone, Debug)]
pub struct RingDht {
    config: DhtConfig,
    ring: MachineRing,
}

impl RingDht {
    /// One-shot configuration. Fails for a space width outside [1, 31] or
    /// an index order below 3; nothing else is validated later.
    pub fn new(config: DhtConfig) -> Result<Self> {
        let space = config.space()?;
        Ok(Self {
            config,
            ring: MachineRing::new(space, config.order),
        })
    }

    /// The configuration the simulator was built with.
    pub fn config(&self) -> DhtConfig {
        self.config
    }

    /// The identifier space all ids are validated against.
    pub fn space(&self) -> IdSpace {
        self.ring.space()
    }

    /// Branching order of every machine's file index.
    pub fn order(&self) -> usize {
        self.config.order
    }

    pub(crate) fn ring(&self) -> &MachineRing {
        &self.ring
    }

    /// Number of live machines.
    pub fn machine_count(&self) -> usize {
        self.ring.len()
    }

    /// Whether `did` is a live machine.
    pub fn contains_machine(&self, did: Did) -> bool {
        self.ring.contains(did)
    }

    /// Ascending snapshot of the live machine ids.
    pub fn ids(&self) -> Vec<Did> {
        self.ring.ids()
    }

    /// Routing table of a live machine.
    pub fn finger_table(&self, did: Did) -> Result<&FingerTable> {
        match self.ring.machine(did) {
            Some(machine) => Ok(machine.finger()),
            None => Err(Error::UnknownMachine(did)),
        }
    }

    /// Ascending traversal of a live machine's local index.
    pub fn local_index(&self, did: Did) -> Result<storage::Iter<'_>> {
        match self.ring.machine(did) {
            Some(machine) => Ok(machine.index().iter()),
            None => Err(Error::UnknownMachine(did)),
        }
    }

    /// Number of records on a live machine.
    pub fn file_count(&self, did: Did) -> Result<usize> {
        match self.ring.machine(did) {
            Some(machine) => Ok(machine.index().len()),
            None => Err(Error::UnknownMachine(did)),
        }
    }

    /// Number of records across the whole ring.
    pub fn total_file_count(&self) -> usize {
        self.ring.iter().map(|m| m.index().len()).sum()
    }

    /// Admit a machine and re-home the records it is now responsible for.
    ///
    /// The new machine pulls from its successor exactly the records whose
    /// keys lie on the arc `(predecessor, new]`; every other placement is
    /// untouched. All finger tables are rebuilt before returning.
    pub fn join(&mut self, did: Did) -> Result<JoinReport> {
        self.ring.insert(did)?;

        let report = if self.ring.len() > 1 {
            let pred = match self.ring.predecessor_did(did) {
                Some(pred) => pred,
                None => return Err(Error::UnknownMachine(did)),
            };
            let succ = match self.ring.neighbor_after(did) {
                Some(succ) => succ,
                None => return Err(Error::UnknownMachine(did)),
            };
            let pulled = self.pull_records(pred, did, succ)?;
            JoinReport {
                pulled,
                from: Some(succ),
            }
        } else {
            JoinReport {
                pulled: 0,
                from: None,
            }
        };

        self.ring.rebuild_fingers();
        tracing::info!(
            "machine {} joined; pulled {} record(s) from its successor",
            did,
            report.pulled
        );
        Ok(report)
    }

    /// Move the records of `succ` whose keys fall on `(pred, new]` over to
    /// the freshly admitted machine `new`.
    fn pull_records(&mut self, pred: Did, new: Did, succ: Did) -> Result<usize> {
        if succ == new {
            return Ok(0);
        }
        let claimed: Vec<FileRecord> = match self.ring.machine(succ) {
            Some(machine) => machine
                .index()
                .iter()
                .filter(|(key, _)| key.is_between(pred, new))
                .map(|(key, path)| FileRecord {
                    key,
                    path: path.to_string(),
                })
                .collect(),
            None => return Err(Error::UnknownMachine(succ)),
        };
        if claimed.is_empty() {
            return Ok(0);
        }

        if let Some(machine) = self.ring.machine_mut(succ) {
            for rec in &claimed {
                machine.index.remove(rec.key);
            }
        }
        let pulled = claimed.len();
        if let Some(machine) = self.ring.machine_mut(new) {
            for rec in claimed {
                tracing::debug!(
                    "file {} ({}) moved from machine {} to machine {}",
                    rec.key,
                    rec.path,
                    succ,
                    new
                );
                machine.index.insert(rec)?;
            }
        }
        Ok(pulled)
    }

    /// Evict a machine, handing its records to its successor.
    ///
    /// When the leaver was the last machine its records are dropped; the
    /// report says how many. All finger tables are rebuilt before the
    /// evicted machine is destroyed.
    pub fn leave(&mut self, did: Did) -> Result<LeaveReport> {
        let mut leaver = self.ring.remove(did)?;
        let records = leaver.index.take_all();

        let report = if self.ring.is_empty() {
            if !records.is_empty() {
                tracing::warn!(
                    "machine {} was the last one; {} record(s) dropped",
                    did,
                    records.len()
                );
            }
            LeaveReport {
                inherited_by: None,
                moved: 0,
                dropped: records.len(),
            }
        } else {
            let heir = match self.ring.successor_did(did) {
                Some(heir) => heir,
                None => return Err(Error::EmptyRing),
            };
            let moved = records.len();
            if let Some(machine) = self.ring.machine_mut(heir) {
                for rec in records {
                    tracing::debug!(
                        "file {} ({}) transferred from machine {} to machine {}",
                        rec.key,
                        rec.path,
                        did,
                        heir
                    );
                    machine.index.insert(rec)?;
                }
            }
            LeaveReport {
                inherited_by: Some(heir),
                moved,
                dropped: 0,
            }
        };

        self.ring.rebuild_fingers();
        tracing::info!("machine {} left the ring", did);
        Ok(report)
    }

    /// Seed several machines at once.
    ///
    /// Rejected ids (out of range, already present) are skipped with a
    /// warning instead of aborting the batch; the return value is the
    /// number actually admitted.
    pub fn join_many(&mut self, dids: &[Did]) -> usize {
        let mut admitted = 0;
        for &did in dids {
            match self.join(did) {
                Ok(_) => admitted += 1,
                Err(e) => tracing::warn!("machine {} skipped: {}", did, e),
            }
        }
        admitted
    }

    /// Serializable snapshot of the whole simulator.
    pub fn inspect(&self) -> crate::inspect::DhtInspect {
        crate::inspect::DhtInspect::inspect(self)
    }
}

impl ChordRouting for RingDht {
    fn find_successor(&self, key: Did) -> Result<Did> {
        self.space().check(key)?;
        match self.ring.successor_did(key) {
            Some(did) => Ok(did),
            None => Err(Error::EmptyRing),
        }
    }

    fn is_responsible(&self, did: Did, key: Did) -> Result<bool> {
        self.space().check(key)?;
        routing::is_responsible(&self.ring, did, key)
    }

    fn route(&self, start: Did, key: Did) -> Result<Vec<Did>> {
        self.space().check(key)?;
        routing::route(&self.ring, start, key)
    }
}

impl ChordStore for RingDht {
    fn insert_file(&mut self, start: Did, key: Did, path: &str) -> Result<StoreReceipt> {
        self.space().check(key)?;
        let route = routing::route(&self.ring, start, key)?;
        let responsible = match route.last() {
            Some(did) => *did,
            None => return Err(Error::EmptyRing),
        };

        let machine = match self.ring.machine_mut(responsible) {
            Some(machine) => machine,
            None => return Err(Error::UnknownMachine(responsible)),
        };
        if machine.index.contains(key) {
            tracing::warn!(
                "file key {} already exists on machine {}; keeping the original",
                key,
                responsible
            );
            return Err(Error::DuplicateFile {
                key,
                holder: responsible,
            });
        }
        machine.index.insert(FileRecord {
            key,
            path: path.to_string(),
        })?;

        tracing::info!("file {} ({}) stored on machine {}", key, path, responsible);
        Ok(StoreReceipt { responsible, route })
    }

    fn search_file(&self, start: Did, key: Did) -> Result<SearchOutcome> {
        self.space().check(key)?;
        let route = routing::route(&self.ring, start, key)?;
        let responsible = match route.last() {
            Some(did) => *did,
            None => return Err(Error::EmptyRing),
        };
        let machine = match self.ring.machine(responsible) {
            Some(machine) => machine,
            None => return Err(Error::UnknownMachine(responsible)),
        };

        Ok(match machine.index().get(key) {
            Some(path) => SearchOutcome::Found {
                responsible,
                path: path.to_string(),
                route,
            },
            None => SearchOutcome::Missing { route },
        })
    }

    fn delete_file(&mut self, start: Did, key: Did) -> Result<RemoveOutcome> {
        self.space().check(key)?;
        let route = routing::route(&self.ring, start, key)?;
        let responsible = match route.last() {
            Some(did) => *did,
            None => return Err(Error::EmptyRing),
        };
        let machine = match self.ring.machine_mut(responsible) {
            Some(machine) => machine,
            None => return Err(Error::UnknownMachine(responsible)),
        };

        Ok(match machine.index.remove(key) {
            Some(path) => {
                tracing::info!("file {} removed from machine {}", key, responsible);
                RemoveOutcome::Removed {
                    responsible,
                    path,
                    route,
                }
            }
            None => RemoveOutcome::Missing { route },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dht_of(bits: u32, order: usize, ids: &[u32]) -> RingDht {
        let mut dht = RingDht::new(DhtConfig::new(bits, order).unwrap()).unwrap();
        for id in ids {
            dht.join(Did::from(*id)).unwrap();
        }
        dht
    }

    #[test]
    fn test_join_and_leave_reports() {
        let mut dht = dht_of(4, 5, &[]);
        assert_eq!(
            dht.join(Did::from(3)).unwrap(),
            JoinReport {
                pulled: 0,
                from: None
            }
        );
        assert_eq!(
            dht.join(Did::from(11)).unwrap(),
            JoinReport {
                pulled: 0,
                from: Some(Did::from(3))
            }
        );
        assert_eq!(dht.machine_count(), 2);

        assert_eq!(
            dht.leave(Did::from(11)).unwrap(),
            LeaveReport {
                inherited_by: Some(Did::from(3)),
                moved: 0,
                dropped: 0
            }
        );
        assert!(matches!(
            dht.leave(Did::from(11)),
            Err(Error::UnknownMachine(d)) if d == Did::from(11)
        ));
    }

    #[test]
    fn test_join_rejects_bad_ids() {
        let mut dht = dht_of(4, 5, &[3]);
        assert!(matches!(
            dht.join(Did::from(3)),
            Err(Error::DuplicateMachine(d)) if d == Did::from(3)
        ));
        assert!(matches!(
            dht.join(Did::from(99)),
            Err(Error::IdOutOfRange { modulus: 16, .. })
        ));
        assert_eq!(dht.machine_count(), 1);
    }

    #[test]
    fn test_join_many_skips_rejects() {
        let mut dht = dht_of(4, 5, &[]);
        let admitted = dht.join_many(&[
            Did::from(1),
            Did::from(4),
            Did::from(4),
            Did::from(20),
            Did::from(7),
        ]);
        assert_eq!(admitted, 3);
        assert_eq!(
            dht.ids(),
            vec![Did::from(1), Did::from(4), Did::from(7)]
        );
    }

    #[test]
    fn test_file_lifecycle() {
        let mut dht = dht_of(4, 5, &[1, 4, 7, 12, 15]);

        let receipt = dht.insert_file(Did::from(1), Did::from(9), "/data/x").unwrap();
        assert_eq!(receipt.responsible, Did::from(12));
        assert_eq!(dht.total_file_count(), 1);

        let found = dht.search_file(Did::from(15), Did::from(9)).unwrap();
        assert!(found.is_found());
        match found {
            SearchOutcome::Found {
                responsible, path, ..
            } => {
                assert_eq!(responsible, Did::from(12));
                assert_eq!(path, "/data/x");
            }
            SearchOutcome::Missing { .. } => unreachable!(),
        }

        let removed = dht.delete_file(Did::from(4), Did::from(9)).unwrap();
        assert!(removed.is_removed());
        assert_eq!(dht.total_file_count(), 0);

        let missing = dht.search_file(Did::from(1), Did::from(9)).unwrap();
        assert!(!missing.is_found());
        assert_eq!(missing.route().first(), Some(&Did::from(1)));
    }

    #[test]
    fn test_duplicate_file_keeps_original() {
        let mut dht = dht_of(4, 5, &[1, 12]);
        dht.insert_file(Did::from(1), Did::from(9), "/original").unwrap();

        let again = dht.insert_file(Did::from(1), Did::from(9), "/usurper");
        assert!(matches!(
            again,
            Err(Error::DuplicateFile { key, holder })
                if key == Did::from(9) && holder == Did::from(12)
        ));

        match dht.search_file(Did::from(12), Did::from(9)).unwrap() {
            SearchOutcome::Found { path, .. } => assert_eq!(path, "/original"),
            SearchOutcome::Missing { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_empty_ring_and_unknown_start() {
        let mut dht = dht_of(4, 5, &[]);
        assert!(matches!(
            dht.insert_file(Did::from(1), Did::from(9), "/x"),
            Err(Error::EmptyRing)
        ));
        assert!(matches!(dht.find_successor(Did::from(9)), Err(Error::EmptyRing)));

        dht.join(Did::from(1)).unwrap();
        assert!(matches!(
            dht.search_file(Did::from(2), Did::from(9)),
            Err(Error::UnknownMachine(d)) if d == Did::from(2)
        ));
        assert!(matches!(
            dht.insert_file(Did::from(1), Did::from(16), "/x"),
            Err(Error::IdOutOfRange { .. })
        ));
    }

    #[test]
    fn test_leave_of_last_machine_drops_records() {
        let mut dht = dht_of(4, 5, &[6]);
        dht.insert_file(Did::from(6), Did::from(2), "/a").unwrap();
        dht.insert_file(Did::from(6), Did::from(13), "/b").unwrap();

        let report = dht.leave(Did::from(6)).unwrap();
        assert_eq!(
            report,
            LeaveReport {
                inherited_by: None,
                moved: 0,
                dropped: 2
            }
        );
        assert_eq!(dht.machine_count(), 0);
        assert_eq!(dht.total_file_count(), 0);
    }

    #[test]
    fn test_validation_happens_before_mutation() {
        let mut dht = dht_of(4, 5, &[1, 12]);
        dht.insert_file(Did::from(1), Did::from(9), "/x").unwrap();

        // A rejected join must not have redistributed anything.
        assert!(dht.join(Did::from(12)).is_err());
        assert_eq!(dht.file_count(Did::from(12)).unwrap(), 1);
        assert_eq!(dht.machine_count(), 2);
    }
}

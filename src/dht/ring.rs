//! Ring membership: the sorted cyclic population of live machines.
//!
//! The ring exclusively owns every [Machine]. Machines are kept in a `Vec`
//! sorted ascending by id and closed cyclically, so successor and
//! predecessor queries are binary searches and iteration order is the ring
//! order. Nothing outside the ring ever holds a reference to a machine
//! across a topology change; lookups go by id.

use super::did::Did;
use super::did::IdSpace;
use super::finger::FingerTable;
use crate::error::Error;
use crate::error::Result;
use crate::storage::FileIndex;

/// A live machine: identity, routing table and local file index.
#[derive(Clone, Debug)]
pub struct Machine {
    did: Did,
    pub(crate) finger: FingerTable,
    pub(crate) index: FileIndex,
}

impl Machine {
    fn new(did: Did, order: usize) -> Self {
        Self {
            did,
            finger: FingerTable::new(did),
            index: FileIndex::new(order),
        }
    }

    /// The machine's immutable id.
    pub fn did(&self) -> Did {
        self.did
    }

    /// The machine's routing table.
    pub fn finger(&self) -> &FingerTable {
        &self.finger
    }

    /// The machine's local file index.
    pub fn index(&self) -> &FileIndex {
        &self.index
    }
}

/// The cyclic population of live machines.
#[derive(Clone, Debug)]
pub struct MachineRing {
    space: IdSpace,
    order: usize,
    machines: Vec<Machine>,
}

impl MachineRing {
    /// An empty ring over `space`; machines created on insert get a file
    /// index of the given branching order.
    pub fn new(space: IdSpace, order: usize) -> Self {
        Self {
            space,
            order,
            machines: Vec::new(),
        }
    }

    /// The identifier space the ring lives on.
    pub fn space(&self) -> IdSpace {
        self.space
    }

    /// Number of live machines.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Whether no machine is alive. An empty ring is legal.
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Whether `did` is a live machine.
    pub fn contains(&self, did: Did) -> bool {
        self.position(did).is_ok()
    }

    /// Ascending snapshot of the live machine ids.
    pub fn ids(&self) -> Vec<Did> {
        self.machines.iter().map(Machine::did).collect()
    }

    /// The machines in ascending id order, starting from the smallest.
    pub fn iter(&self) -> impl Iterator<Item = &Machine> {
        self.machines.iter()
    }

    /// The live machine with id `did`.
    pub fn machine(&self, did: Did) -> Option<&Machine> {
        self.position(did).ok().map(|i| &self.machines[i])
    }

    pub(crate) fn machine_mut(&mut self, did: Did) -> Option<&mut Machine> {
        match self.position(did) {
            Ok(i) => Some(&mut self.machines[i]),
            Err(_) => None,
        }
    }

    fn position(&self, did: Did) -> std::result::Result<usize, usize> {
        self.machines.binary_search_by(|m| m.did().cmp(&did))
    }

    /// Admit a machine. Fails for ids outside the space or already present.
    pub fn insert(&mut self, did: Did) -> Result<()> {
        self.space.check(did)?;
        match self.position(did) {
            Ok(_) => Err(Error::DuplicateMachine(did)),
            Err(slot) => {
                self.machines.insert(slot, Machine::new(did, self.order));
                Ok(())
            }
        }
    }

    /// Evict a machine, yielding it so its records can be re-homed before
    /// it is dropped.
    pub fn remove(&mut self, did: Did) -> Result<Machine> {
        match self.position(did) {
            Ok(slot) => Ok(self.machines.remove(slot)),
            Err(_) => Err(Error::UnknownMachine(did)),
        }
    }

    /// The live machine with the smallest id at or after `k`, wrapping to
    /// the minimum. `None` only on an empty ring.
    pub fn successor_did(&self, k: Did) -> Option<Did> {
        if self.machines.is_empty() {
            return None;
        }
        let i = self.machines.partition_point(|m| m.did() < k);
        if i == self.machines.len() {
            Some(self.machines[0].did())
        } else {
            Some(self.machines[i].did())
        }
    }

    /// Cyclic predecessor of a member id; a machine alone on the ring is
    /// its own predecessor. `None` when `did` is not a member.
    pub fn predecessor_did(&self, did: Did) -> Option<Did> {
        let i = self.position(did).ok()?;
        let n = self.machines.len();
        Some(self.machines[(i + n - 1) % n].did())
    }

    /// Cyclic next member after a member id. `None` when `did` is not a
    /// member.
    pub fn neighbor_after(&self, did: Did) -> Option<Did> {
        let i = self.position(did).ok()?;
        let n = self.machines.len();
        Some(self.machines[(i + 1) % n].did())
    }

    /// Rebuild every machine's finger table against the current
    /// membership. Called after each topology change, before control
    /// returns to the caller.
    pub fn rebuild_fingers(&mut self) {
        if self.machines.is_empty() {
            return;
        }
        let ids = self.ids();
        for machine in &mut self.machines {
            machine.finger.rebuild(self.space, &ids);
        }
        tracing::debug!("rebuilt finger tables of {} machine(s)", ids.len());
    }
}

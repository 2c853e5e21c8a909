//! Serializable snapshots of the simulator state.
//!
//! Rendering is a caller concern; these structs carry the data a UI layer
//! needs: the ring with per-machine file counts and responsibility arcs,
//! a machine's finger table, and a machine's stored records.

use serde::Deserialize;
use serde::Serialize;

use crate::dht::Did;
use crate::dht::FingerEntry;
use crate::dht::RingDht;
use crate::error::Result;

/// Snapshot of the whole simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhtInspect {
    /// Width of the identifier space in bits.
    pub bits: u32,
    /// Number of distinct ids, 2^bits.
    pub modulus: u32,
    /// Live machines, ascending by id.
    pub machines: Vec<MachineInspect>,
}

/// Snapshot of one machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineInspect {
    /// The machine's id.
    pub did: Did,
    /// First key the machine is responsible for, walking clockwise.
    ///
    /// The responsibility arc runs from `range_start` to `did` inclusive
    /// and may wrap past zero. A machine alone on the ring owns the whole
    /// circle, which this encodes as the arc starting right after its own
    /// id.
    pub range_start: Did,
    /// Number of records in the machine's local index.
    pub file_count: usize,
}

/// Snapshot of one machine's finger table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerTableInspect {
    /// The machine the table belongs to.
    pub did: Did,
    /// Entries in order i = 0, 1, ..., b - 1.
    pub entries: Vec<FingerEntry>,
}

/// Snapshot of one machine's local index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInspect {
    /// The machine the records live on.
    pub did: Did,
    /// The records in ascending key order.
    pub items: Vec<(Did, String)>,
}

impl DhtInspect {
    /// Snapshot the ring.
    pub fn inspect(dht: &RingDht) -> Self {
        let space = dht.space();
        let machines = dht
            .ring()
            .iter()
            .map(|machine| {
                let did = machine.did();
                let pred = dht.ring().predecessor_did(did).unwrap_or(did);
                MachineInspect {
                    did,
                    range_start: space.next(pred),
                    file_count: machine.index().len(),
                }
            })
            .collect();

        Self {
            bits: space.bits(),
            modulus: space.modulus(),
            machines,
        }
    }
}

impl FingerTableInspect {
    /// Snapshot the finger table of a live machine.
    pub fn inspect(dht: &RingDht, did: Did) -> Result<Self> {
        let table = dht.finger_table(did)?;
        Ok(Self {
            did,
            entries: table.entries().to_vec(),
        })
    }
}

impl IndexInspect {
    /// Snapshot the local index of a live machine.
    pub fn inspect(dht: &RingDht, did: Did) -> Result<Self> {
        let items = dht
            .local_index(did)?
            .map(|(key, path)| (key, path.to_string()))
            .collect();
        Ok(Self { did, items })
    }
}

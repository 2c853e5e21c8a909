//! Iterative finger-table routing.
//!
//! The walk starts at a live machine and repeatedly either stops (the
//! current machine owns the key) or hops to the best finger: the last
//! entry, scanning i = 0..b, whose target lies on the arc `(current, key]`.
//! That target is at most `key` away, so the recorded successor never
//! overshoots the owning machine, and every hop strictly shrinks the
//! remaining arc. When no finger qualifies the walk falls through to the
//! immediate ring successor.

use std::collections::HashSet;

use super::did::Did;
use super::ring::MachineRing;
use crate::error::Error;
use crate::error::Result;

/// Whether machine `did` owns `key`: the key lies on the half-open arc
/// ending at `did`, `(predecessor(did), did]`. A machine alone on the ring
/// owns every key.
pub(crate) fn is_responsible(ring: &MachineRing, did: Did, key: Did) -> Result<bool> {
    if ring.len() == 1 {
        return if ring.contains(did) {
            Ok(true)
        } else {
            Err(Error::UnknownMachine(did))
        };
    }
    match ring.predecessor_did(did) {
        Some(pred) => Ok(key.is_between(pred, did)),
        None => Err(Error::UnknownMachine(did)),
    }
}

/// Walk the ring from `start` toward the machine responsible for `key`,
/// returning every machine id visited, in order. The path begins with
/// `start`, ends at the owner and repeats no id.
pub(crate) fn route(ring: &MachineRing, start: Did, key: Did) -> Result<Vec<Did>> {
    if ring.is_empty() {
        return Err(Error::EmptyRing);
    }
    if !ring.contains(start) {
        return Err(Error::UnknownMachine(start));
    }

    let mut path = vec![start];
    let mut visited = HashSet::new();
    visited.insert(start);
    let mut current = start;

    loop {
        if is_responsible(ring, current, key)? {
            tracing::debug!("key {} is owned by machine {}", key, current);
            return Ok(path);
        }

        let machine = match ring.machine(current) {
            Some(machine) => machine,
            None => return Err(Error::UnknownMachine(current)),
        };

        // Scan-and-overwrite: the last finger whose target falls inside
        // the arc wins, i.e. the geometrically farthest one that does not
        // pass the key.
        let mut best = None;
        for entry in machine.finger().entries() {
            if entry.target.is_between(current, key) {
                best = Some(entry.successor);
            }
        }

        let next = match best {
            Some(did) => did,
            // No finger lands inside the arc; the immediate successor is
            // always a valid step forward.
            None => match ring.neighbor_after(current) {
                Some(did) => did,
                None => return Err(Error::UnknownMachine(current)),
            },
        };

        // Defensive floor: cannot fire on freshly rebuilt tables.
        if !visited.insert(next) {
            tracing::warn!(
                "routing loop: machine {} produced already-visited hop {} for key {}",
                current,
                next,
                key
            );
            return Err(Error::RoutingLoop { at: current, key });
        }

        tracing::debug!("route hop {} -> {} toward key {}", current, next, key);
        path.push(next);
        current = next;
    }
}

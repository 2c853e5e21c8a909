#![warn(missing_docs)]
//! The Chord-style DHT core.
//!
//! Based on CHORD, ref: <https://pdos.csail.mit.edu/papers/ton:chord/paper-ton.pdf>,
//! restricted to a single in-memory process: machines on a cyclic
//! identifier space, per-machine finger tables, iterative O(log N) key
//! routing, and lossless file redistribution when the topology changes.

pub mod chord;
pub mod did;
pub mod finger;
pub mod ring;
mod routing;
pub mod types;

pub use chord::JoinReport;
pub use chord::LeaveReport;
pub use chord::RemoveOutcome;
pub use chord::RingDht;
pub use chord::SearchOutcome;
pub use chord::StoreReceipt;
pub use did::Did;
pub use did::IdSpace;
pub use finger::FingerEntry;
pub use finger::FingerTable;
pub use ring::Machine;
pub use ring::MachineRing;
pub use types::ChordRouting;
pub use types::ChordStore;

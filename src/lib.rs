//! ring-dht: in-memory simulator of a Chord-style ring DHT.
//!
//! Machines live on the cyclic identifier space [0, 2^b). Each one keeps a
//! finger table for O(log N) lookups and a B-tree index of the (file key,
//! path) records it is responsible for: the keys on the half-open arc
//! ending at its own id. Joins pull the newly owned arc from the
//! successor, leaves push everything to it, and every topology change
//! rebuilds all finger tables before returning.
//!
//! The whole simulator is a single value owned by the caller; there is no
//! I/O, no persistence and no concurrency.
//!
//! ```
//! use ring_dht::ChordStore;
//! use ring_dht::DhtConfig;
//! use ring_dht::Did;
//! use ring_dht::RingDht;
//!
//! let mut dht = RingDht::new(DhtConfig::default())?;
//! for id in [1u32, 4, 7, 12, 15] {
//!     dht.join(Did::from(id))?;
//! }
//!
//! let receipt = dht.insert_file(Did::from(1), Did::from(9), "/tmp/report.pdf")?;
//! assert_eq!(receipt.responsible, Did::from(12));
//! assert_eq!(receipt.route, vec![Did::from(1), Did::from(12)]);
//! # Ok::<(), ring_dht::Error>(())
//! ```

pub mod config;
pub mod consts;
pub mod dht;
pub mod error;
pub mod hash;
pub mod inspect;
pub mod storage;

#[cfg(test)]
mod tests;

pub use config::DhtConfig;
pub use dht::ChordRouting;
pub use dht::ChordStore;
pub use dht::Did;
pub use dht::IdSpace;
pub use dht::RingDht;
pub use error::Error;
pub use error::Result;
pub use hash::hash_in_space;

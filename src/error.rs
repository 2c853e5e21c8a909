//! Error of ring-dht.

use crate::dht::Did;

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors collection in ring-dht.
///
/// Every variant is recoverable: validation happens before any mutation, so
/// a failed operation leaves the simulator unchanged. [Error::RoutingLoop]
/// signals a programming error rather than bad input, but it corrupts no
/// state either.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("identifier space must be 1..=31 bits, got {0}")]
    InvalidBits(u32),

    #[error("index branching order must be at least 3, got {0}")]
    InvalidOrder(usize),

    #[error("id {did} is outside the identifier space [0, {modulus})")]
    IdOutOfRange {
        /// The rejected id.
        did: Did,
        /// Size of the configured identifier space.
        modulus: u32,
    },

    #[error("machine {0} already exists")]
    DuplicateMachine(Did),

    #[error("machine {0} not found")]
    UnknownMachine(Did),

    #[error("file key {0} already present in the index")]
    DuplicateKey(Did),

    #[error("file key {key} already stored on machine {holder}")]
    DuplicateFile {
        /// The rejected file key.
        key: Did,
        /// Machine holding the original record, which is kept untouched.
        holder: Did,
    },

    #[error("ring is empty")]
    EmptyRing,

    #[error("routing loop detected at machine {at} while locating key {key}")]
    RoutingLoop {
        /// Machine at which the already-visited hop was produced.
        at: Did,
        /// Key being located.
        key: Did,
    },
}

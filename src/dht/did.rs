#![warn(missing_docs)]
//! Identifier algebra for the simulated ring.
//!
//! Every machine and every file lives at a position on the cyclic space
//! [0, 2^b). [Did] is that position; [IdSpace] pins the runtime width b and
//! performs all arithmetic that depends on it. The single cyclic arc
//! predicate [Did::is_between] is the primitive both the responsibility
//! rule and the routing predicate are derived from, so the two can never
//! drift apart.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::consts::MAX_BITS;
use crate::consts::MIN_BITS;
use crate::error::Error;
use crate::error::Result;

/// Position of a machine or file on the identifier circle.
///
/// A plain `u32` under the hood: the space is capped at 31 bits, so every
/// id fits without big-integer arithmetic. All wrap-around logic lives in
/// [IdSpace] and [Did::is_between]; two `Did`s ordered with `<` compare as
/// plain integers.
#[derive(Copy, Clone, Eq, Ord, PartialEq, PartialOrd, Debug, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct Did(u32);

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Did {
    fn from(id: u32) -> Did {
        Did(id)
    }
}

impl From<Did> for u32 {
    fn from(did: Did) -> u32 {
        did.0
    }
}

impl Did {
    /// Raw integer value of the id.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Test whether `self` lies on the open-closed cyclic arc `(lo, hi]`.
    ///
    /// When `lo == hi` the arc spans the whole circle, which is exactly the
    /// single-machine ownership case.
    pub fn is_between(self, lo: Did, hi: Did) -> bool {
        if lo < hi {
            lo < self && self <= hi
        } else {
            self > lo || self <= hi
        }
    }
}

/// The configured identifier space [0, 2^bits).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSpace {
    bits: u32,
}

impl IdSpace {
    /// Build a space of the given width. Fails for widths outside [1, 31].
    pub fn new(bits: u32) -> Result<Self> {
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            return Err(Error::InvalidBits(bits));
        }
        Ok(Self { bits })
    }

    /// Width of the space in bits.
    pub fn bits(self) -> u32 {
        self.bits
    }

    /// Number of distinct ids, 2^bits.
    pub fn modulus(self) -> u32 {
        1 << self.bits
    }

    /// Largest valid id, 2^bits - 1.
    pub fn max_id(self) -> u32 {
        self.modulus() - 1
    }

    /// Whether `did` lies inside the space.
    pub fn contains(self, did: Did) -> bool {
        did.value() < self.modulus()
    }

    /// Validate `did`, passing it through unchanged on success.
    pub fn check(self, did: Did) -> Result<Did> {
        if self.contains(did) {
            Ok(did)
        } else {
            Err(Error::IdOutOfRange {
                did,
                modulus: self.modulus(),
            })
        }
    }

    /// Finger target i of a machine: `(own + 2^i) mod 2^bits`.
    pub fn finger_target(self, own: Did, i: u32) -> Did {
        debug_assert!(i < self.bits);
        Did::from((own.value() + (1 << i)) & self.max_id())
    }

    /// The id one step clockwise of `did`, wrapping at the modulus.
    pub fn next(self, did: Did) -> Did {
        Did::from((did.value() + 1) & self.max_id())
    }
}

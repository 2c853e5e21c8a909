//! One-shot configuration of the simulator.

use serde::Deserialize;
use serde::Serialize;

use crate::consts::DEFAULT_BITS;
use crate::consts::DEFAULT_ORDER;
use crate::consts::MIN_ORDER;
use crate::dht::IdSpace;
use crate::error::Error;
use crate::error::Result;

fn default_bits() -> u32 {
    DEFAULT_BITS
}

fn default_order() -> usize {
    DEFAULT_ORDER
}

/// Parameters fixed at construction time: the identifier-space width and
/// the branching order of every machine's file index.
///
/// Both fields survive serialization with their defaults filled in when
/// absent, so a config can come from a file as well as from code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhtConfig {
    /// Width of the identifier space in bits; ids live in [0, 2^bits).
    #[serde(default = "default_bits")]
    pub bits: u32,
    /// Branching order of the per-machine B-tree index, at least 3.
    #[serde(default = "default_order")]
    pub order: usize,
}

impl Default for DhtConfig {
    fn default() -> Self {
        Self {
            bits: DEFAULT_BITS,
            order: DEFAULT_ORDER,
        }
    }
}

impl DhtConfig {
    /// Build and validate a config in one step.
    pub fn new(bits: u32, order: usize) -> Result<Self> {
        let config = Self { bits, order };
        config.validate()?;
        Ok(config)
    }

    /// Check both fields, reporting the first violation.
    pub fn validate(&self) -> Result<()> {
        IdSpace::new(self.bits)?;
        if self.order < MIN_ORDER {
            return Err(Error::InvalidOrder(self.order));
        }
        Ok(())
    }

    /// The identifier space this config describes.
    pub fn space(&self) -> Result<IdSpace> {
        self.validate()?;
        IdSpace::new(self.bits)
    }
}

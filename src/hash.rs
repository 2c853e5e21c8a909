//! Deterministic derivation of ids from strings.
//!
//! The core treats file keys and machine ids as opaque positions and never
//! hashes anything itself. Callers that start from a path or a machine name
//! instead of an id can use [hash_in_space] to place the string on the
//! circle.

use sha1::Digest;
use sha1::Sha1;

use crate::dht::Did;
use crate::dht::IdSpace;

/// Hash `s` into the identifier space.
///
/// Deterministic across runs and platforms; distribution quality is that of
/// sha1 reduced modulo 2^bits, which is more than uniform enough for
/// placement.
pub fn hash_in_space(s: &str, space: IdSpace) -> Did {
    let mut hasher = Sha1::new();
    hasher.update(s.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let wide = u64::from_be_bytes(prefix);

    Did::from((wide % u64::from(space.modulus())) as u32)
}

//! Cross-module tests: the end-to-end scenarios and ring-wide invariants
//! that no single module can check on its own.


use crate::config::DhtConfig;
use crate::dht::Did;
use crate::dht::RingDht;

/// A configured simulator with the given machines already joined.
pub fn dht_with(bits: u32, order: usize, ids: &[u32]) -> RingDht {
    let mut dht = RingDht::new(DhtConfig::new(bits, order).unwrap()).unwrap();
    for id in ids {
        dht.join(Did::from(*id)).unwrap();
    }
    dht
}

/// Every (machine, file key) pair in the ring, ascending.
pub fn placement(dht: &RingDht) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    for did in dht.ids() {
        for (key, _) in dht.local_index(did).unwrap() {
            out.push((did.value(), key.value()));
        }
    }
    out
}

/// Reference responsibility: the smallest live id at or after `key`,
/// wrapping to the minimum.
pub fn naive_successor(ids: &[u32], key: u32) -> u32 {
    ids.iter()
        .copied()
        .filter(|id| *id >= key)
        .min()
        .or_else(|| ids.iter().copied().min())
        .unwrap()
}

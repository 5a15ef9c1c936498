use nimbus_types::Hash32;

use crate::receipt::Receipt;

/// Deterministic Merkle root over the canonical serialization of each
/// receipt in insertion order. The empty set hashes to the all-zero digest;
/// when the leaf count isn't a power of two, the last leaf is duplicated at
/// each level to pair it off, per the external interface contract.
pub fn compute_merkle_root(receipts: &[Receipt]) -> Hash32 {
    if receipts.is_empty() {
        return Hash32::zero();
    }
    let mut level: Vec<Hash32> = receipts.iter().map(Receipt::leaf_hash).collect();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        level = level
            .chunks(2)
            .map(|pair| Hash32::combine(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

//! Determinism verification for batch clearing output.
//!
//! Every node clearing the same sealed batch at the same price vector must
//! produce identical clearing records in identical order. The clearing digest
//! is a SHA-256 hash over the ordered records that enables quick cross-node
//! verification without comparing full payloads.

use sha2::{Digest, Sha256};
use speedex_types::{OfferClearing, PoolClearing};

/// Compute the deterministic digest over a batch's clearing output.
///
/// The same records in the same order always produce the same digest.
#[must_use]
pub fn compute_clearing_digest(pools: &[PoolClearing], offers: &[OfferClearing]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"speedex:clearing:v1:");

    hasher.update((pools.len() as u64).to_le_bytes());
    for record in pools {
        hasher.update(record.pool.as_bytes());
        hasher.update(record.sold_asset.canonical_bytes());
        hasher.update(record.bought_asset.canonical_bytes());
        hasher.update(record.sold_amount.to_le_bytes());
        hasher.update(record.bought_amount.to_le_bytes());
    }

    hasher.update((offers.len() as u64).to_le_bytes());
    for record in offers {
        hasher.update(record.account.as_bytes());
        hasher.update(record.seq_num.to_le_bytes());
        hasher.update(record.op_index.to_le_bytes());
        hasher.update(record.selling.canonical_bytes());
        hasher.update(record.buying.canonical_bytes());
        hasher.update(record.sold_amount.to_le_bytes());
        hasher.update(record.bought_amount.to_le_bytes());
    }

    hasher.finalize().into()
}

/// Recompute the digest from the records and compare with the expected one.
#[must_use]
pub fn verify_clearing_digest(
    pools: &[PoolClearing],
    offers: &[OfferClearing],
    expected: &[u8; 32],
) -> bool {
    compute_clearing_digest(pools, offers) == *expected
}

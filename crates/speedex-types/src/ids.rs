//! Identifiers used throughout the Speedex core.
//!
//! Accounts are identified by their raw 32-byte public key. Pool identifiers
//! are derived deterministically from the pool parameters so that every node
//! maps the same trading pair to the same pool.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Asset;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Unique identifier for a ledger account.
/// This is the raw ed25519 public key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// PoolId
// ---------------------------------------------------------------------------

/// Unique identifier for a constant-product liquidity pool (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PoolId(pub [u8; 32]);

impl PoolId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Deterministic `PoolId` for a constant-product pool.
    ///
    /// The assets are hashed in canonical order, so
    /// `for_constant_product(a, b, fee)` and `for_constant_product(b, a, fee)`
    /// yield the same identifier.
    #[must_use]
    pub fn for_constant_product(asset_a: &Asset, asset_b: &Asset, fee_bps: u32) -> Self {
        use sha2::{Digest, Sha256};

        let (first, second) = if asset_a <= asset_b {
            (asset_a, asset_b)
        } else {
            (asset_b, asset_a)
        };

        let mut hasher = Sha256::new();
        hasher.update(b"speedex:pool:v1:");
        hasher.update(first.canonical_bytes());
        hasher.update(second.canonical_bytes());
        hasher.update(fee_bps.to_le_bytes());
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

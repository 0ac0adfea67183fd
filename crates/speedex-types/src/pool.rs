//! Constant-product liquidity pool entries.
//!
//! A [`PoolEntry`] is the ledger-resident state of one pool: two reserves in
//! canonical asset order and a fee in basis points. All trade math lives in
//! the compute plane; this type only carries state and the orientation
//! helpers the frame needs.

use serde::{Deserialize, Serialize};

use crate::{constants, Asset, PoolId};

/// Ledger state of a constant-product pool. `asset_a < asset_b` always.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub pool_id: PoolId,
    pub asset_a: Asset,
    pub asset_b: Asset,
    pub reserve_a: i64,
    pub reserve_b: i64,
    pub fee_bps: u32,
}

impl PoolEntry {
    /// Create a pool entry, canonicalizing asset order and deriving the id.
    ///
    /// Returns `None` if the assets are equal, a reserve is negative, or the
    /// fee exceeds [`constants::MAX_FEE_BPS`].
    #[must_use]
    pub fn new(asset_a: Asset, asset_b: Asset, reserve_a: i64, reserve_b: i64, fee_bps: u32) -> Option<Self> {
        if asset_a == asset_b || reserve_a < 0 || reserve_b < 0 || fee_bps > constants::MAX_FEE_BPS {
            return None;
        }
        let (asset_a, asset_b, reserve_a, reserve_b) = if asset_a < asset_b {
            (asset_a, asset_b, reserve_a, reserve_b)
        } else {
            (asset_b, asset_a, reserve_b, reserve_a)
        };
        let pool_id = PoolId::for_constant_product(&asset_a, &asset_b, fee_bps);
        Some(Self {
            pool_id,
            asset_a,
            asset_b,
            reserve_a,
            reserve_b,
            fee_bps,
        })
    }

    /// The constant product `reserve_a * reserve_b`.
    #[must_use]
    pub fn constant_product(&self) -> i128 {
        i128::from(self.reserve_a) * i128::from(self.reserve_b)
    }

    /// Whether this pool trades the given unordered asset pair.
    #[must_use]
    pub fn trades(&self, x: &Asset, y: &Asset) -> bool {
        (&self.asset_a == x && &self.asset_b == y) || (&self.asset_a == y && &self.asset_b == x)
    }
}

//! Speedex configuration: the set of tradable asset pairs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{constants, Asset, AssetPair};

/// Names the asset pairs admitted to batch clearing and the fee tier of the
/// pools the clearing engine consults.
///
/// Pair membership is direction-insensitive: if `(a, b)` is configured, both
/// `a -> b` and `b -> a` offers are admissible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeedexConfig {
    /// Tradable pairs, stored in canonical asset order.
    pairs: BTreeSet<(Asset, Asset)>,
    /// Fee tier (basis points) of the constant-product pools the engine
    /// consults for these pairs.
    pub pool_fee_bps: u32,
}

impl SpeedexConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pairs: BTreeSet::new(),
            pool_fee_bps: constants::LIQUIDITY_POOL_FEE_BPS,
        }
    }

    /// Admit a pair. Returns `false` (and stores nothing) if the assets are
    /// equal or the pair was already present.
    pub fn add_pair(&mut self, a: Asset, b: Asset) -> bool {
        if a == b {
            return false;
        }
        let key = if a < b { (a, b) } else { (b, a) };
        self.pairs.insert(key)
    }

    /// Whether offers on this (directed) pair are admissible.
    #[must_use]
    pub fn is_valid_asset_pair(&self, pair: &AssetPair) -> bool {
        if pair.selling == pair.buying {
            return false;
        }
        let (a, b) = pair.canonical_assets();
        self.pairs.contains(&(a.clone(), b.clone()))
    }

    /// Configured pairs in canonical order.
    pub fn canonical_pairs(&self) -> impl Iterator<Item = &(Asset, Asset)> {
        self.pairs.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

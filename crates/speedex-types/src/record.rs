//! Clearing records emitted by batch settlement.
//!
//! A [`PoolClearing`] is the wire-form record of one pool's participation in
//! a pair's clearing; an [`OfferClearing`] records one offer's fill. Both are
//! immutable once emitted and feed the batch determinism digest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, PoolId};

/// Wire-form record of a pool trade:
/// `(pool, soldAsset, boughtAsset, soldAmount, boughtAmount)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolClearing {
    pub pool: PoolId,
    pub sold_asset: Asset,
    pub bought_asset: Asset,
    pub sold_amount: i64,
    pub bought_amount: i64,
}

impl fmt::Display for PoolClearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sold {} {} for {} {}",
            self.pool, self.sold_amount, self.sold_asset, self.bought_amount, self.bought_asset,
        )
    }
}

/// Record of one offer's fill at the batch clearing price.
///
/// `sold_amount` may be less than the offer's full amount only for the
/// marginal offer whose minimum price equals the clearing price exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferClearing {
    pub account: AccountId,
    pub seq_num: i64,
    pub op_index: u32,
    pub selling: Asset,
    pub buying: Asset,
    pub sold_amount: i64,
    pub bought_amount: i64,
}

impl fmt::Display for OfferClearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (seq {} op {}) sold {} {} for {} {}",
            self.account,
            self.seq_num,
            self.op_index,
            self.sold_amount,
            self.selling,
            self.bought_amount,
            self.buying,
        )
    }
}

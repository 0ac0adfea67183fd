//! Error types for the Speedex exchange core.
//!
//! All errors use the `SPX_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Batch lifecycle errors
//! - 2xx: Orderbook errors
//! - 3xx: Liquidity pool errors
//! - 4xx: Clearing / settlement errors
//! - 5xx: Ledger errors
//! - 9xx: General / internal errors
//!
//! Malformed admission input is *not* an error: it surfaces as an op-level
//! result code and the batch continues. Everything here rejects the batch.

use thiserror::Error;

use crate::{AccountId, Asset, PoolId};

/// Central error enum for all Speedex operations.
#[derive(Debug, Error)]
pub enum SpeedexError {
    // =================================================================
    // Batch lifecycle errors (1xx)
    // =================================================================
    /// An operation that requires a sealed batch ran before sealing.
    #[error("SPX_ERR_100: Batch is not sealed")]
    BatchNotSealed,

    /// An admission-phase operation ran after the batch was sealed.
    #[error("SPX_ERR_101: Batch is already sealed")]
    BatchSealed,

    // =================================================================
    // Orderbook errors (2xx)
    // =================================================================
    /// The orderbook was mutated after price-computation preprocessing.
    #[error("SPX_ERR_200: Orderbook is frozen after preprocessing")]
    BookFrozen,

    /// A price-indexed query ran before preprocessing.
    #[error("SPX_ERR_201: Orderbook has not been preprocessed")]
    BookNotPreprocessed,

    /// A 128-bit prefix-sum accumulator saturated; the batch must be rejected.
    #[error("SPX_ERR_202: Weighted supply accumulator saturated for pair {pair}")]
    AccumulatorSaturated { pair: String },

    /// An offer with a non-positive amount or price reached the orderbook.
    #[error("SPX_ERR_203: Malformed offer reached the orderbook")]
    MalformedOffer,

    // =================================================================
    // Liquidity pool errors (3xx)
    // =================================================================
    /// A requested trade exceeds what the pool quoted at this price.
    #[error("SPX_ERR_300: Sell value {sell_value} exceeds pool quote {offered}")]
    SellAmountExceedsOffer { sell_value: i128, offered: i128 },

    /// Negative sell amount handed to pool settlement.
    #[error("SPX_ERR_301: Negative pool sell amount {0}")]
    NegativeSellAmount(i64),

    /// Negative buy amount handed to pool settlement.
    #[error("SPX_ERR_302: Negative pool buy amount {0}")]
    NegativeBuyAmount(i64),

    /// A trade would shrink the pool's constant product.
    #[error("SPX_ERR_303: Constant product not preserved: {prev} -> {next}")]
    ConstantProductViolation { prev: i128, next: i128 },

    /// A reserve would leave the representable `[0, i64::MAX]` range.
    #[error("SPX_ERR_304: Pool reserve out of range")]
    ReserveOutOfRange,

    /// The frame's trading pair does not match the pool entry's assets.
    #[error("SPX_ERR_305: Trading pair does not match pool {0}")]
    WrongPoolPair(PoolId),

    /// A pool required at settlement is absent from the ledger.
    #[error("SPX_ERR_306: Pool not found: {0}")]
    PoolMissing(PoolId),

    // =================================================================
    // Clearing / settlement errors (4xx)
    // =================================================================
    /// Aggregate sold and bought value diverge beyond tolerance for an asset.
    #[error(
        "SPX_ERR_400: Infeasible at {asset}: sold {sold} vs bought {bought} (tolerance {tolerance})"
    )]
    Infeasible {
        asset: Asset,
        sold: u128,
        bought: u128,
        tolerance: u128,
    },

    /// The candidate price vector omits an asset that trades in this batch.
    #[error("SPX_ERR_401: No candidate price for asset {0}")]
    UnpricedAsset(Asset),

    /// A candidate price of zero was proposed for a traded asset.
    #[error("SPX_ERR_402: Zero candidate price for asset {0}")]
    ZeroPrice(Asset),

    /// A derived settlement amount does not fit in `i64`.
    #[error("SPX_ERR_403: Settlement amount overflow")]
    AmountOverflow,

    /// Offers below the clearing price exceed the pair's settlement capacity.
    #[error("SPX_ERR_404: Pair capacity exceeded during settlement")]
    CapacityExceeded,

    // =================================================================
    // Ledger errors (5xx)
    // =================================================================
    /// An account required at settlement is absent from the ledger.
    #[error("SPX_ERR_500: Account not found: {0}")]
    AccountMissing(AccountId),

    /// `commit` or `rollback` without a matching `begin`.
    #[error("SPX_ERR_501: No active ledger transaction scope")]
    NoActiveTransaction,

    /// A commutativity-requirement total overflowed `i64`.
    #[error("SPX_ERR_502: Requirement total overflow for {account} in {asset}")]
    RequirementOverflow { account: AccountId, asset: Asset },

    /// Registered requirements exceed the owner's available balance.
    #[error(
        "SPX_ERR_503: Insufficient balance for {account} in {asset}: need {required}, have {available}"
    )]
    InsufficientBalance {
        account: AccountId,
        asset: Asset,
        required: i64,
        available: i64,
    },

    // =================================================================
    // General / internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SPX_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SpeedexError>;

//! The `createSpeedexIOCOffer` admission operation.
//!
//! Admission failures are op-level result codes, never batch errors: a
//! malformed offer is dropped before clearing begins and the batch continues.

use std::fmt;

use speedex_ledger::LedgerAdaptor;
use speedex_types::{AccountId, Asset, AssetPair, IocOffer, Price};

/// Result code of one admission operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferResultCode {
    /// The offer entered the batch.
    Ok,
    /// Non-positive amount or price, non-commutative asset, or a failed
    /// commutativity registration.
    Malformed,
    /// No Speedex configuration is installed.
    NoSpeedexConfig,
    /// The pair is not in the configured tradable set.
    InvalidTradingPair,
}

impl OfferResultCode {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for OfferResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Malformed => write!(f, "MALFORMED"),
            Self::NoSpeedexConfig => write!(f, "NO_SPEEDEX_CONFIG"),
            Self::InvalidTradingPair => write!(f, "INVALID_TRADING_PAIR"),
        }
    }
}

/// One `createSpeedexIOCOffer` operation as submitted.
#[derive(Debug, Clone)]
pub struct CreateIocOfferOp {
    pub source: AccountId,
    pub sell_asset: Asset,
    pub buy_asset: Asset,
    pub sell_amount: i64,
    pub min_price: Price,
    /// The enclosing transaction's sequence number.
    pub seq_num: i64,
    /// This operation's index within its transaction.
    pub op_index: u32,
}

impl CreateIocOfferOp {
    /// Non-positive amount or price.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.sell_amount <= 0 || !self.min_price.is_valid()
    }

    #[must_use]
    pub fn trading_pair(&self) -> AssetPair {
        AssetPair::new(self.sell_asset.clone(), self.buy_asset.clone())
    }

    /// The immutable offer this operation admits.
    #[must_use]
    pub fn offer(&self) -> IocOffer {
        IocOffer::new(
            self.sell_amount,
            self.min_price,
            self.source,
            self.seq_num,
            self.op_index,
        )
    }
}

/// An asset is commutative iff it is native or its issuer account carries the
/// issuance-limit flag. Pool-share assets never reach here: they are not
/// [`Asset`]s.
pub fn is_commutative_tx_enabled_asset<L: LedgerAdaptor>(ledger: &L, asset: &Asset) -> bool {
    match asset {
        Asset::Native => true,
        Asset::Issued { issuer, .. } => ledger
            .load_account(issuer)
            .is_some_and(|entry| entry.is_issuance_limited()),
    }
}

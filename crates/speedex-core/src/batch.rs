//! The batch in progress.
//!
//! A [`SpeedexBatch`] owns one orderbook per directed pair between admission
//! and clearing. Lifecycle: admit offers via
//! [`create_ioc_offer`](SpeedexBatch::create_ioc_offer), freeze with
//! [`seal`](SpeedexBatch::seal), then hand to settlement. The same admitted
//! operations always produce the same sealed batch, whatever their
//! submission order.

use std::collections::BTreeMap;

use speedex_ledger::LedgerAdaptor;
use speedex_matchcore::IocOrderbook;
use speedex_types::{
    AssetPair, PoolEntry, PoolId, Result, SpeedexConfig, SpeedexError,
};

use crate::admission::{is_commutative_tx_enabled_asset, CreateIocOfferOp, OfferResultCode};
use crate::commutativity::CommutativityRequirements;

/// All admission state for one batch.
#[derive(Debug)]
pub struct SpeedexBatch {
    config: Option<SpeedexConfig>,
    books: BTreeMap<AssetPair, IocOrderbook>,
    requirements: CommutativityRequirements,
    sealed: bool,
}

impl SpeedexBatch {
    /// Start an empty batch. `config` is `None` when no Speedex
    /// configuration is installed in the ledger; every admission then fails
    /// with `NO_SPEEDEX_CONFIG`.
    #[must_use]
    pub fn new(config: Option<SpeedexConfig>) -> Self {
        Self {
            config,
            books: BTreeMap::new(),
            requirements: CommutativityRequirements::new(),
            sealed: false,
        }
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    #[must_use]
    pub fn books(&self) -> &BTreeMap<AssetPair, IocOrderbook> {
        &self.books
    }

    #[must_use]
    pub fn requirements(&self) -> &CommutativityRequirements {
        &self.requirements
    }

    #[must_use]
    pub fn num_offers(&self) -> usize {
        self.books.values().map(IocOrderbook::len).sum()
    }

    // =================================================================
    // Admission
    // =================================================================

    /// Apply one `createSpeedexIOCOffer` operation.
    ///
    /// Check order follows the operation contract: configuration presence,
    /// pair validity, asset commutativity, well-formedness, trustline
    /// eligibility, then the commutativity registration. The first failing
    /// check decides the result code; the batch itself is never rejected
    /// here.
    pub fn create_ioc_offer<L: LedgerAdaptor>(
        &mut self,
        ledger: &L,
        op: &CreateIocOfferOp,
    ) -> OfferResultCode {
        if self.sealed {
            tracing::warn!(source = %op.source, "Admission after seal rejected");
            return OfferResultCode::Malformed;
        }
        let Some(config) = &self.config else {
            return OfferResultCode::NoSpeedexConfig;
        };

        let pair = op.trading_pair();
        if !config.is_valid_asset_pair(&pair) {
            return OfferResultCode::InvalidTradingPair;
        }

        if !is_commutative_tx_enabled_asset(ledger, &pair.selling)
            || !is_commutative_tx_enabled_asset(ledger, &pair.buying)
        {
            return OfferResultCode::Malformed;
        }

        if op.is_malformed() {
            return OfferResultCode::Malformed;
        }

        if !self
            .requirements
            .check_trustline(ledger, &op.source, &op.buy_asset)
            || !self
                .requirements
                .check_trustline(ledger, &op.source, &op.sell_asset)
        {
            return OfferResultCode::Malformed;
        }

        if let Err(err) = self.requirements.add_asset_requirement(
            ledger,
            op.source,
            &op.sell_asset,
            op.sell_amount,
        ) {
            tracing::debug!(source = %op.source, %err, "Commutativity registration failed");
            return OfferResultCode::Malformed;
        }

        let book = self
            .books
            .entry(pair.clone())
            .or_insert_with(|| IocOrderbook::new(pair));
        match book.add_offer(op.offer()) {
            Ok(()) => OfferResultCode::Ok,
            Err(err) => {
                tracing::warn!(%err, "Offer rejected by the orderbook");
                OfferResultCode::Malformed
            }
        }
    }

    // =================================================================
    // Seal
    // =================================================================

    /// Close admission: preprocess every orderbook for price-indexed queries
    /// and freeze the batch.
    ///
    /// # Errors
    /// `BatchSealed` when called twice; `AccumulatorSaturated` if any book's
    /// weighted prefix sums saturated (the batch is rejected).
    pub fn seal(&mut self) -> Result<()> {
        if self.sealed {
            return Err(SpeedexError::BatchSealed);
        }
        for (pair, book) in &mut self.books {
            book.do_price_computation_preprocessing();
            if book.is_saturated() {
                return Err(SpeedexError::AccumulatorSaturated {
                    pair: pair.to_string(),
                });
            }
        }
        self.sealed = true;
        tracing::info!(
            pairs = self.books.len(),
            offers = self.num_offers(),
            "Batch sealed"
        );
        Ok(())
    }

    // =================================================================
    // Pool discovery
    // =================================================================

    /// Load the pool entry for every configured pair that has one, at the
    /// configured fee tier.
    #[must_use]
    pub fn load_pools<L: LedgerAdaptor>(&self, ledger: &L) -> BTreeMap<PoolId, PoolEntry> {
        let mut pools = BTreeMap::new();
        if let Some(config) = &self.config {
            for (asset_a, asset_b) in config.canonical_pairs() {
                let pool_id = PoolId::for_constant_product(asset_a, asset_b, config.pool_fee_bps);
                if let Some(entry) = ledger.load_pool(&pool_id) {
                    pools.insert(pool_id, entry);
                }
            }
        }
        pools
    }
}

#[cfg(test)]
mod tests {
    use speedex_ledger::MemoryLedger;
    use speedex_types::{constants, AccountId, Asset, Price};

    use super::*;

    fn acct(byte: u8) -> AccountId {
        AccountId([byte; 32])
    }

    fn issuer() -> AccountId {
        acct(9)
    }

    fn usd() -> Asset {
        Asset::issued("USD", issuer())
    }

    fn config() -> SpeedexConfig {
        let mut config = SpeedexConfig::new();
        config.add_pair(Asset::Native, usd());
        config
    }

    fn ledger() -> MemoryLedger {
        let mut ledger = MemoryLedger::new();
        ledger.create_account(issuer(), 0, constants::ACCOUNT_FLAG_ISSUANCE_LIMIT);
        ledger.create_account(acct(1), 10_000, 0);
        ledger.create_trustline(
            acct(1),
            usd().into(),
            10_000,
            i64::MAX,
            constants::TRUSTLINE_FLAG_AUTHORIZED,
        );
        ledger
    }

    fn sell_native_op(amount: i64, price: Price, seq: i64) -> CreateIocOfferOp {
        CreateIocOfferOp {
            source: acct(1),
            sell_asset: Asset::Native,
            buy_asset: usd(),
            sell_amount: amount,
            min_price: price,
            seq_num: seq,
            op_index: 0,
        }
    }

    #[test]
    fn admission_happy_path() {
        let ledger = ledger();
        let mut batch = SpeedexBatch::new(Some(config()));

        let code = batch.create_ioc_offer(&ledger, &sell_native_op(100, Price::new(1, 1), 1));
        assert_eq!(code, OfferResultCode::Ok);
        assert_eq!(batch.num_offers(), 1);
        assert_eq!(
            batch.requirements().total_for(&acct(1), &Asset::Native),
            100
        );
    }

    #[test]
    fn no_config_means_no_admission() {
        let ledger = ledger();
        let mut batch = SpeedexBatch::new(None);
        let code = batch.create_ioc_offer(&ledger, &sell_native_op(100, Price::new(1, 1), 1));
        assert_eq!(code, OfferResultCode::NoSpeedexConfig);
    }

    #[test]
    fn unknown_pair_is_invalid() {
        let ledger = ledger();
        let mut batch = SpeedexBatch::new(Some(SpeedexConfig::new()));
        let code = batch.create_ioc_offer(&ledger, &sell_native_op(100, Price::new(1, 1), 1));
        assert_eq!(code, OfferResultCode::InvalidTradingPair);
    }

    #[test]
    fn non_commutative_asset_is_malformed() {
        // Issuer without the issuance-limit flag.
        let mut ledger = MemoryLedger::new();
        ledger.create_account(issuer(), 0, 0);
        ledger.create_account(acct(1), 10_000, 0);

        let mut batch = SpeedexBatch::new(Some(config()));
        let code = batch.create_ioc_offer(&ledger, &sell_native_op(100, Price::new(1, 1), 1));
        assert_eq!(code, OfferResultCode::Malformed);
    }

    #[test]
    fn bad_amount_or_price_is_malformed() {
        let ledger = ledger();
        let mut batch = SpeedexBatch::new(Some(config()));
        assert_eq!(
            batch.create_ioc_offer(&ledger, &sell_native_op(0, Price::new(1, 1), 1)),
            OfferResultCode::Malformed
        );
        assert_eq!(
            batch.create_ioc_offer(&ledger, &sell_native_op(100, Price::new(0, 1), 2)),
            OfferResultCode::Malformed
        );
        assert_eq!(batch.num_offers(), 0);
    }

    #[test]
    fn missing_trustline_is_malformed() {
        let mut ledger = MemoryLedger::new();
        ledger.create_account(issuer(), 0, constants::ACCOUNT_FLAG_ISSUANCE_LIMIT);
        ledger.create_account(acct(1), 10_000, 0);
        // No USD trustline for the buyer side.

        let mut batch = SpeedexBatch::new(Some(config()));
        let code = batch.create_ioc_offer(&ledger, &sell_native_op(100, Price::new(1, 1), 1));
        assert_eq!(code, OfferResultCode::Malformed);
    }

    #[test]
    fn over_balance_registration_is_malformed() {
        let ledger = ledger();
        let mut batch = SpeedexBatch::new(Some(config()));

        assert_eq!(
            batch.create_ioc_offer(&ledger, &sell_native_op(10_000, Price::new(1, 1), 1)),
            OfferResultCode::Ok
        );
        // The account's full native balance is already committed.
        assert_eq!(
            batch.create_ioc_offer(&ledger, &sell_native_op(1, Price::new(1, 1), 2)),
            OfferResultCode::Malformed
        );
        assert_eq!(batch.num_offers(), 1);
    }

    #[test]
    fn seal_freezes_admission() {
        let ledger = ledger();
        let mut batch = SpeedexBatch::new(Some(config()));
        batch
            .create_ioc_offer(&ledger, &sell_native_op(100, Price::new(1, 1), 1));
        batch.seal().unwrap();
        assert!(batch.is_sealed());

        assert_eq!(
            batch.create_ioc_offer(&ledger, &sell_native_op(100, Price::new(1, 1), 2)),
            OfferResultCode::Malformed
        );
        assert!(matches!(batch.seal(), Err(SpeedexError::BatchSealed)));
    }

    #[test]
    fn load_pools_finds_configured_pools() {
        let mut ledger = ledger();
        let entry = PoolEntry::new(Asset::Native, usd(), 1_000, 1_000, 30).unwrap();
        let id = ledger.create_pool(entry);

        let batch = SpeedexBatch::new(Some(config()));
        let pools = batch.load_pools(&ledger);
        assert_eq!(pools.len(), 1);
        assert!(pools.contains_key(&id));

        // A pool at a different fee tier is not consulted.
        let mut other_config = config();
        other_config.pool_fee_bps = 100;
        let batch = SpeedexBatch::new(Some(other_config));
        assert!(batch.load_pools(&ledger).is_empty());
    }
}

//! Settlement: applying a committed price vector to the ledger.
//!
//! Once the outer solver commits to per-asset prices, settlement walks every
//! active directed pair in canonical order. Per pair `S -> B`:
//!
//! 1. Capacity is what the reverse pair `B -> S` supplies at these prices --
//!    that is the value available to pay this pair's sellers.
//! 2. The pool trades first: its quote capped by capacity, truncated to a
//!    multiple of the sell price, paid the fee-grossed buy amount.
//! 3. Offers strictly below the price fill in full (IOC semantics; the
//!    feasibility gate already vouched for them).
//! 4. Offers exactly at the price fill in offer order against the remaining
//!    capacity; the boundary offer may fill partially, later ties drop.
//!
//! Everything runs inside one ledger transaction scope: any invariant
//! violation rolls the whole batch back.

use std::collections::BTreeMap;

use speedex_ledger::LedgerAdaptor;
use speedex_matchcore::{
    active_pairs, compute_clearing_digest, evaluate_feasibility, pair_prices, FeasibilityReport,
    PoolFrame, PriceVector,
};
use speedex_types::{
    AssetPair, IocOffer, OfferClearing, PoolClearing, PoolEntry, PoolId, Result, SpeedexError,
};

use crate::batch::SpeedexBatch;

/// Everything one cleared batch produced.
#[derive(Debug, Clone)]
pub struct BatchClearingOutcome {
    /// Pool trades, in pair order.
    pub pool_clearings: Vec<PoolClearing>,
    /// Offer fills, in pair order then offer order.
    pub offer_clearings: Vec<OfferClearing>,
    /// SHA-256 digest over the ordered records, for cross-node verification.
    pub digest: [u8; 32],
    /// The feasibility report the clearing was admitted under.
    pub report: FeasibilityReport,
}

/// Clear a sealed batch at the committed price vector.
///
/// # Errors
/// `BatchNotSealed` before sealing; `Infeasible` when the aggregate flows
/// cannot balance; any settlement invariant violation (after which the
/// ledger is rolled back to its pre-clearing state).
pub fn clear_batch<L: LedgerAdaptor>(
    batch: &SpeedexBatch,
    prices: &PriceVector,
    ledger: &mut L,
) -> Result<BatchClearingOutcome> {
    if !batch.is_sealed() {
        return Err(SpeedexError::BatchNotSealed);
    }
    // Registered debits were bounded by balances at admission; nothing may
    // have moved them since batch start.
    batch.requirements().validate(ledger)?;

    let mut pools = batch.load_pools(ledger);
    let report = evaluate_feasibility(prices, batch.books(), &pools)?;
    report.require_feasible()?;

    ledger.begin();
    match settle_all(batch, prices, &mut pools, &report, ledger) {
        Ok(outcome) => {
            ledger.commit()?;
            tracing::info!(
                pool_clearings = outcome.pool_clearings.len(),
                offer_clearings = outcome.offer_clearings.len(),
                digest = hex::encode(outcome.digest),
                "Batch cleared"
            );
            Ok(outcome)
        }
        Err(err) => {
            ledger.rollback()?;
            tracing::warn!(%err, "Batch settlement rolled back");
            Err(err)
        }
    }
}

fn settle_all<L: LedgerAdaptor>(
    batch: &SpeedexBatch,
    prices: &PriceVector,
    pools: &mut BTreeMap<PoolId, PoolEntry>,
    report: &FeasibilityReport,
    ledger: &mut L,
) -> Result<BatchClearingOutcome> {
    let mut pool_clearings = Vec::new();
    let mut offer_clearings = Vec::new();

    for pair in active_pairs(batch.books(), pools) {
        settle_pair(
            batch,
            prices,
            pools,
            report,
            &pair,
            &mut pool_clearings,
            &mut offer_clearings,
        )?;
    }

    for record in &pool_clearings {
        ledger.append_clearing_record(record.clone());
    }
    for entry in pools.values() {
        ledger.store_pool(entry.clone())?;
    }

    let digest = compute_clearing_digest(&pool_clearings, &offer_clearings);
    Ok(BatchClearingOutcome {
        pool_clearings,
        offer_clearings,
        digest,
        report: report.clone(),
    })
}

fn settle_pair(
    batch: &SpeedexBatch,
    prices: &PriceVector,
    pools: &mut BTreeMap<PoolId, PoolEntry>,
    report: &FeasibilityReport,
    pair: &AssetPair,
    pool_clearings: &mut Vec<PoolClearing>,
    offer_clearings: &mut Vec<OfferClearing>,
) -> Result<()> {
    let (sell_price, buy_price) = pair_prices(prices, pair)?;

    // What the other side supplies is what this side's sellers can be paid.
    let mut capacity = report
        .pair_values
        .get(&pair.flipped())
        .map_or(0, |values| values.max);

    // Pool first.
    let pool_entry = pools
        .values()
        .find(|entry| entry.trades(&pair.selling, &pair.buying))
        .cloned();
    if let Some(entry) = pool_entry {
        let mut frame = PoolFrame::new(entry, pair.clone())?;
        let quote = frame.amount_offered_for_sale_times_sell_price(sell_price, buy_price);
        let mut trade_value = quote.min(capacity);
        trade_value -= trade_value % u128::from(sell_price);

        if trade_value > 0 {
            let sell_amount = i64::try_from(trade_value / u128::from(sell_price))
                .map_err(|_| SpeedexError::AmountOverflow)?;
            let buy_amount = frame.required_buy_amount(trade_value, buy_price)?;
            let record = frame.transfer(sell_amount, buy_amount, sell_price, buy_price)?;
            tracing::debug!(pair = %pair, %record, "Pool cleared");
            pool_clearings.push(record);
            capacity -= trade_value;

            let entry = frame.into_entry();
            pools.insert(entry.pool_id, entry);
        }
    }

    // Offers. Strictly-below offers always fill in full; the marginal bucket
    // fills in offer order against the remaining capacity.
    let Some(book) = batch.books().get(pair) else {
        return Ok(());
    };
    let offers = book.offers()?;
    let strict = book.strict_prefix_len_at(sell_price, buy_price)?;
    let willing = book.prefix_len_at(sell_price, buy_price)?;

    for offer in &offers[..strict] {
        let value = offer.sell_amount as u128 * u128::from(sell_price);
        capacity = capacity.saturating_sub(value);
        offer_clearings.push(fill_record(pair, offer, offer.sell_amount, buy_price, sell_price)?);
    }

    let mut dropped: usize = 0;
    for offer in &offers[strict..willing] {
        let affordable = capacity / u128::from(sell_price);
        let units = (offer.sell_amount as u128).min(affordable);
        if units == 0 {
            dropped += 1;
            continue;
        }
        capacity -= units * u128::from(sell_price);
        // units <= sell_amount, so the narrowing cast is lossless.
        offer_clearings.push(fill_record(pair, offer, units as i64, buy_price, sell_price)?);
    }
    if dropped > 0 {
        tracing::warn!(pair = %pair, dropped, "Marginal offers dropped at the clearing price");
    }

    Ok(())
}

fn fill_record(
    pair: &AssetPair,
    offer: &IocOffer,
    sold_amount: i64,
    buy_price: u64,
    sell_price: u64,
) -> Result<OfferClearing> {
    let value = sold_amount as u128 * u128::from(sell_price);
    let bought_amount =
        i64::try_from(value / u128::from(buy_price)).map_err(|_| SpeedexError::AmountOverflow)?;
    Ok(OfferClearing {
        account: offer.account,
        seq_num: offer.seq_num,
        op_index: offer.op_index,
        selling: pair.selling.clone(),
        buying: pair.buying.clone(),
        sold_amount,
        bought_amount,
    })
}

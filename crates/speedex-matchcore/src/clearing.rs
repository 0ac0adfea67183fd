//! Feasibility evaluation for candidate clearing price vectors.
//!
//! The outer price solver proposes per-asset valuations; this module answers
//! whether the batch clears at them. Each directed pair supplies a *value
//! interval* at the candidate prices: offers strictly below the price (plus
//! the pool's quote) must trade, the marginal price bucket may trade in any
//! amount, and everything above stays out. The vector is feasible when, for
//! every asset, the sold and bought intervals overlap within a tolerance
//! covering per-pool truncation.

use std::collections::{BTreeMap, BTreeSet};

use speedex_types::{Asset, AssetPair, PoolEntry, PoolId, Result, SpeedexError};

use crate::orderbook::IocOrderbook;
use crate::pool::PoolFrame;

/// Candidate per-asset valuations. A `BTreeMap` keeps every walk over the
/// vector deterministic.
pub type PriceVector = BTreeMap<Asset, u64>;

/// The sell-side value interval of one directed pair at candidate prices:
/// `min` must trade (sub-price offers and the pool quote), `max` adds the
/// marginal price bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairValues {
    pub min: u128,
    pub max: u128,
}

/// Aggregate value flow intervals for one asset at the candidate prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetFlow {
    pub sold_min: u128,
    pub sold_max: u128,
    pub bought_min: u128,
    pub bought_max: u128,
    /// Permitted imbalance: per-pool rounding plus one price unit of slack.
    pub tolerance: u128,
}

impl AssetFlow {
    /// Whether some choice of marginal fills balances this asset's flows.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let lo = self.sold_min.max(self.bought_min);
        let hi = self.sold_max.min(self.bought_max);
        lo <= hi.saturating_add(self.tolerance)
    }
}

/// Outcome of evaluating one candidate price vector.
#[derive(Debug, Clone, Default)]
pub struct FeasibilityReport {
    /// Per-asset flow intervals in asset order.
    pub flows: BTreeMap<Asset, AssetFlow>,
    /// Per-pair sell-side value intervals, keyed by directed pair.
    pub pair_values: BTreeMap<AssetPair, PairValues>,
}

impl FeasibilityReport {
    /// Whether every asset's flows can balance.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.flows.values().all(AssetFlow::is_balanced)
    }

    /// The first (in asset order) unbalanced asset, if any.
    #[must_use]
    pub fn first_violation(&self) -> Option<(&Asset, &AssetFlow)> {
        self.flows.iter().find(|(_, flow)| !flow.is_balanced())
    }

    /// Promote the first violation into a batch-rejecting error.
    pub fn require_feasible(&self) -> Result<()> {
        match self.first_violation() {
            None => Ok(()),
            Some((asset, flow)) => Err(SpeedexError::Infeasible {
                asset: asset.clone(),
                sold: flow.sold_max,
                bought: flow.bought_max,
                tolerance: flow.tolerance,
            }),
        }
    }
}

/// Look up both components of a candidate price for a directed pair.
///
/// # Errors
/// `UnpricedAsset` for a missing entry, `ZeroPrice` for a zero valuation.
pub fn pair_prices(prices: &PriceVector, pair: &AssetPair) -> Result<(u64, u64)> {
    let sell = price_of(prices, &pair.selling)?;
    let buy = price_of(prices, &pair.buying)?;
    Ok((sell, buy))
}

fn price_of(prices: &PriceVector, asset: &Asset) -> Result<u64> {
    let price = *prices
        .get(asset)
        .ok_or_else(|| SpeedexError::UnpricedAsset(asset.clone()))?;
    if price == 0 {
        return Err(SpeedexError::ZeroPrice(asset.clone()));
    }
    Ok(price)
}

/// Every directed pair with a participant: each orderbook's pair, plus both
/// directions of each pool's pair.
#[must_use]
pub fn active_pairs(
    books: &BTreeMap<AssetPair, IocOrderbook>,
    pools: &BTreeMap<PoolId, PoolEntry>,
) -> BTreeSet<AssetPair> {
    let mut pairs: BTreeSet<AssetPair> = books.keys().cloned().collect();
    for pool in pools.values() {
        let forward = AssetPair::new(pool.asset_a.clone(), pool.asset_b.clone());
        pairs.insert(forward.flipped());
        pairs.insert(forward);
    }
    pairs
}

/// Sell-side value interval of one directed pair at the candidate prices.
pub fn pair_sell_values(
    book: Option<&IocOrderbook>,
    pool: Option<&PoolEntry>,
    pair: &AssetPair,
    sell_price: u64,
    buy_price: u64,
) -> Result<PairValues> {
    let mut values = PairValues::default();

    if let Some(book) = book {
        if book.is_saturated() {
            return Err(SpeedexError::AccumulatorSaturated {
                pair: pair.to_string(),
            });
        }
        values.min = book.strict_sell_value_at(sell_price, buy_price)?;
        values.max = book.sell_value_at(sell_price, buy_price)?;
    }

    if let Some(entry) = pool {
        let frame = PoolFrame::new(entry.clone(), pair.clone())?;
        let quote = frame.amount_offered_for_sale_times_sell_price(sell_price, buy_price);
        values.min = values.min.saturating_add(quote);
        values.max = values.max.saturating_add(quote);
    }

    Ok(values)
}

/// Evaluate a candidate price vector against the batch's orderbooks and the
/// pools the ledger holds for its pairs.
///
/// # Errors
/// Structural problems (missing or zero prices, saturated books) are errors;
/// a merely unbalanced vector comes back as an infeasible report.
pub fn evaluate_feasibility(
    prices: &PriceVector,
    books: &BTreeMap<AssetPair, IocOrderbook>,
    pools: &BTreeMap<PoolId, PoolEntry>,
) -> Result<FeasibilityReport> {
    let mut report = FeasibilityReport::default();

    for pair in active_pairs(books, pools) {
        let (sell_price, buy_price) = pair_prices(prices, &pair)?;
        let pool = pools
            .values()
            .find(|entry| entry.trades(&pair.selling, &pair.buying));
        let values = pair_sell_values(books.get(&pair), pool, &pair, sell_price, buy_price)?;

        let outflow = report.flows.entry(pair.selling.clone()).or_default();
        outflow.sold_min = outflow.sold_min.saturating_add(values.min);
        outflow.sold_max = outflow.sold_max.saturating_add(values.max);

        let inflow = report.flows.entry(pair.buying.clone()).or_default();
        inflow.bought_min = inflow.bought_min.saturating_add(values.min);
        inflow.bought_max = inflow.bought_max.saturating_add(values.max);

        report.pair_values.insert(pair, values);
    }

    // Tolerance: one quantum of truncation per pool touching the asset, a
    // couple of units of fee gross-up, plus one price unit of slack.
    for (asset, flow) in &mut report.flows {
        let price = u128::from(price_of(prices, asset)?);
        let pools_touching = pools
            .values()
            .filter(|entry| &entry.asset_a == asset || &entry.asset_b == asset)
            .count() as u128;
        flow.tolerance = (1 + 2 * pools_touching) * price;
    }

    Ok(report)
}

//! Liquidity pool frames.
//!
//! A [`PoolFrame`] adapts one [`PoolEntry`] to a directed trading pair: it
//! answers "how much would this pool sell at a candidate price" and applies
//! clearing trades under the constant-product invariant. The frame owns a
//! working copy of the entry; settlement writes the mutated entry back
//! through the ledger adaptor, so no pool handle outlives its transaction.
//!
//! All supply quotes deliberately undercompute (round-down positive term,
//! round-up subtracted term, truncate to a multiple of the sell price) so the
//! pool can always honor the quoted commitment at integer precision.

use speedex_types::{AssetPair, PoolClearing, PoolEntry, Result, SpeedexError};

use crate::math;

/// A pool entry oriented along a directed trading pair.
#[derive(Debug, Clone)]
pub struct PoolFrame {
    entry: PoolEntry,
    pair: AssetPair,
}

impl PoolFrame {
    /// Wrap a pool entry for the given direction.
    ///
    /// # Errors
    /// `WrongPoolPair` if the pair's assets are not the entry's assets.
    pub fn new(entry: PoolEntry, pair: AssetPair) -> Result<Self> {
        if !entry.trades(&pair.selling, &pair.buying) {
            return Err(SpeedexError::WrongPoolPair(entry.pool_id));
        }
        Ok(Self { entry, pair })
    }

    #[must_use]
    pub fn entry(&self) -> &PoolEntry {
        &self.entry
    }

    /// Surrender the (possibly mutated) entry for write-back.
    #[must_use]
    pub fn into_entry(self) -> PoolEntry {
        self.entry
    }

    /// Reserves as (sell side, buy side) for this frame's direction.
    fn sell_buy_reserves(&self) -> (i64, i64) {
        if self.pair.selling < self.pair.buying {
            (self.entry.reserve_a, self.entry.reserve_b)
        } else {
            (self.entry.reserve_b, self.entry.reserve_a)
        }
    }

    /// The worst price at which the pool sells any unit, as a fraction
    /// `(n, d)`: `buy_reserve / (sell_reserve net of fee)`.
    #[must_use]
    pub fn min_price_ratio(&self) -> (u64, u64) {
        let (sell_reserve, buy_reserve) = self.sell_buy_reserves();
        (
            buy_reserve as u64,
            math::subtract_fee(sell_reserve as u64, self.entry.fee_bps),
        )
    }

    // =================================================================
    // Supply quote
    // =================================================================

    /// The value (sell amount × sell price) this pool is willing to sell at
    /// candidate price `sell_price / buy_price`, always an underestimate of
    /// the mathematical amount, saturated to `i128::MAX`, and an exact
    /// multiple of `sell_price`.
    #[must_use]
    pub fn amount_offered_for_sale_times_sell_price(&self, sell_price: u64, buy_price: u64) -> u128 {
        let (sell_reserve, buy_reserve) = self.sell_buy_reserves();
        if sell_reserve <= 0 || sell_price == 0 {
            return 0;
        }

        let (min_n, min_d) = self.min_price_ratio();
        if min_d == 0 {
            return 0;
        }
        // The pool sells nothing at or below its spot-derived minimum.
        if math::ratio_lt(sell_price, buy_price, min_n, min_d) {
            return 0;
        }

        // sell_price * sqrt(sell_reserve * D) - sqrt(sell_reserve * sell_price * buy_reserve * buy_price)
        // with D = sell_reserve net of fee. Rounding underestimates the quote.
        let first_term = math::sqrt_product_round_down(sell_reserve as u64, min_d);
        let second_term_a = math::sqrt_product_round_up(buy_reserve as u64, buy_price);
        let second_term_b = math::sqrt_product_round_up(sell_reserve as u64, sell_price);

        let top = u128::from(sell_price) * u128::from(first_term);
        let bot = u128::from(second_term_a) * u128::from(second_term_b);
        if top < bot {
            return 0;
        }

        let mut total = top - bot;
        if total > i128::MAX as u128 {
            total = i128::MAX as u128;
        }

        // The pool settles integer sell units only; an offer can quote
        // amount * price exactly, the pool must truncate to floor(amount) * price.
        total -= total % u128::from(sell_price);
        total
    }

    // =================================================================
    // Settlement
    // =================================================================

    /// The buy amount settlement must pay the pool for a trade of
    /// `sell_value` (= sell amount × sell price): the value converted to buy
    /// units rounded up, grossed up for the incoming-side fee so that the
    /// fee-discounted credit still preserves the constant product.
    ///
    /// # Errors
    /// `AmountOverflow` if the grossed-up amount does not fit in `i64`.
    pub fn required_buy_amount(&self, sell_value: u128, buy_price: u64) -> Result<i64> {
        if sell_value == 0 || buy_price == 0 {
            return Ok(0);
        }
        let units = math::div_round_up(sell_value, u128::from(buy_price));
        let kept = u128::from(
            speedex_types::constants::BPS_DENOMINATOR.saturating_sub(self.entry.fee_bps),
        );
        if kept == 0 {
            // A 100% fee pool never quotes a positive sell_value.
            return Err(SpeedexError::ReserveOutOfRange);
        }
        let grossed = math::div_round_up(
            units * u128::from(speedex_types::constants::BPS_DENOMINATOR),
            kept,
        );
        i64::try_from(grossed).map_err(|_| SpeedexError::AmountOverflow)
    }

    /// Apply a clearing trade: the pool sells `sell_amount` and receives
    /// `buy_amount` at the committed prices. Emits the wire-form record.
    ///
    /// # Errors
    /// Any violated invariant (quote exceeded, negative amount, constant
    /// product shrinking, reserve leaving range) is fatal to the batch.
    pub fn transfer(
        &mut self,
        sell_amount: i64,
        buy_amount: i64,
        sell_price: u64,
        buy_price: u64,
    ) -> Result<PoolClearing> {
        self.check_valid_trade(sell_amount, buy_amount, sell_price, buy_price)?;

        let selling_canonical = self.pair.selling < self.pair.buying;
        let (sell_reserve, buy_reserve) = if selling_canonical {
            (&mut self.entry.reserve_a, &mut self.entry.reserve_b)
        } else {
            (&mut self.entry.reserve_b, &mut self.entry.reserve_a)
        };

        *sell_reserve = sell_reserve
            .checked_sub(sell_amount)
            .filter(|r| *r >= 0)
            .ok_or(SpeedexError::ReserveOutOfRange)?;
        *buy_reserve = buy_reserve
            .checked_add(buy_amount)
            .ok_or(SpeedexError::ReserveOutOfRange)?;

        Ok(PoolClearing {
            pool: self.entry.pool_id,
            sold_asset: self.pair.selling.clone(),
            bought_asset: self.pair.buying.clone(),
            sold_amount: sell_amount,
            bought_amount: buy_amount,
        })
    }

    fn check_valid_trade(
        &self,
        sell_amount: i64,
        buy_amount: i64,
        sell_price: u64,
        buy_price: u64,
    ) -> Result<()> {
        if sell_amount < 0 {
            return Err(SpeedexError::NegativeSellAmount(sell_amount));
        }
        if buy_amount < 0 {
            return Err(SpeedexError::NegativeBuyAmount(buy_amount));
        }

        let offered = self.amount_offered_for_sale_times_sell_price(sell_price, buy_price) as i128;
        // i64 * u64 fits i128: (2^63 - 1)(2^64 - 1) < 2^127 - 1.
        let sell_value = i128::from(sell_amount) * i128::from(sell_price);
        if sell_value > offered {
            return Err(SpeedexError::SellAmountExceedsOffer {
                sell_value,
                offered,
            });
        }

        let (old_sell, old_buy) = self.sell_buy_reserves();
        let prev_k = i128::from(old_sell) * i128::from(old_buy);
        let credited = math::fee_discounted(buy_amount, self.entry.fee_bps);
        let new_k = i128::from(old_sell - sell_amount)
            * (i128::from(old_buy) + i128::from(credited));
        if new_k < prev_k {
            return Err(SpeedexError::ConstantProductViolation {
                prev: prev_k,
                next: new_k,
            });
        }
        Ok(())
    }
}

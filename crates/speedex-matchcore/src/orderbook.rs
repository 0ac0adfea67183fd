//! The IOC orderbook for a single trading pair.
//!
//! Lifecycle: constructed empty at batch start, filled during admission,
//! frozen by [`IocOrderbook::do_price_computation_preprocessing`], then
//! read-only for the rest of the batch. Preprocessing sorts offers into the
//! deterministic total order and folds offers sharing a price ratio into
//! buckets carrying two prefix sums, after which every price-indexed query is
//! a binary search.

use speedex_types::{AssetPair, IocOffer, Result, SpeedexError};

use crate::math;

/// Cumulative supply at (and below) a candidate price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceCompStats {
    /// Total sell amount of offers with `min_price <= candidate`.
    pub cumulative_offered_for_sale: u128,
    /// The same offers weighted by their own minimum price in Q32.
    pub cumulative_offered_for_sale_times_price: u128,
}

/// One price level after preprocessing. Offers sharing a price ratio (for
/// example `100/100` and `200/200`) share a bucket; an at-price query always
/// includes the whole bucket.
#[derive(Debug, Clone)]
struct PriceBucket {
    price: speedex_types::Price,
    /// Prefix-inclusive cumulative sell amount up to this bucket.
    offered: u128,
    /// Prefix-inclusive cumulative Q32-weighted sell value up to this bucket.
    offered_times_price: u128,
    /// Exclusive end index of this bucket in the sorted offer vector.
    end: usize,
}

/// Per-pair container of IOC offers with price-indexed supply queries.
#[derive(Debug)]
pub struct IocOrderbook {
    pair: AssetPair,
    offers: Vec<IocOffer>,
    buckets: Vec<PriceBucket>,
    preprocessed: bool,
    saturated: bool,
}

impl IocOrderbook {
    /// Create a new empty orderbook for the given directed pair.
    #[must_use]
    pub fn new(pair: AssetPair) -> Self {
        Self {
            pair,
            offers: Vec::new(),
            buckets: Vec::new(),
            preprocessed: false,
            saturated: false,
        }
    }

    #[must_use]
    pub fn pair(&self) -> &AssetPair {
        &self.pair
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Whether a prefix-sum accumulator saturated during preprocessing.
    /// A saturated book rejects the whole batch.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    // =================================================================
    // Admission
    // =================================================================

    /// Add an offer during the admission phase.
    ///
    /// # Errors
    /// `BookFrozen` after preprocessing; `MalformedOffer` for non-positive
    /// amounts or prices (the admission operation screens these first).
    pub fn add_offer(&mut self, offer: IocOffer) -> Result<()> {
        if self.preprocessed {
            return Err(SpeedexError::BookFrozen);
        }
        if !offer.is_well_formed() {
            return Err(SpeedexError::MalformedOffer);
        }
        self.offers.push(offer);
        Ok(())
    }

    // =================================================================
    // Preprocessing
    // =================================================================

    /// Sort offers into the deterministic total order and build the prefix
    /// sums. Idempotent; the book is frozen afterwards.
    pub fn do_price_computation_preprocessing(&mut self) {
        if self.preprocessed {
            return;
        }
        self.offers.sort_unstable();

        let mut offered: u128 = 0;
        let mut offered_times_price: u128 = 0;

        for (idx, offer) in self.offers.iter().enumerate() {
            let weighted = math::q32_sell_value(offer.sell_amount, offer.min_price);

            offered = offered.saturating_add(offer.sell_amount as u128);
            offered_times_price = match offered_times_price.checked_add(weighted) {
                Some(sum) => sum,
                None => {
                    self.saturated = true;
                    u128::MAX
                }
            };

            match self.buckets.last_mut() {
                Some(bucket) if bucket.price == offer.min_price => {
                    bucket.offered = offered;
                    bucket.offered_times_price = offered_times_price;
                    bucket.end = idx + 1;
                }
                _ => self.buckets.push(PriceBucket {
                    price: offer.min_price,
                    offered,
                    offered_times_price,
                    end: idx + 1,
                }),
            }
        }

        self.preprocessed = true;
    }

    // =================================================================
    // Price-indexed queries
    // =================================================================

    /// Cumulative supply stats at candidate price `pn/pd`.
    ///
    /// # Errors
    /// `BookNotPreprocessed` before preprocessing.
    pub fn price_comp_stats(&self, pn: u64, pd: u64) -> Result<PriceCompStats> {
        let idx = self.bucket_index_le(pn, pd)?;
        Ok(if idx == 0 {
            PriceCompStats::default()
        } else {
            let bucket = &self.buckets[idx - 1];
            PriceCompStats {
                cumulative_offered_for_sale: bucket.offered,
                cumulative_offered_for_sale_times_price: bucket.offered_times_price,
            }
        })
    }

    /// Total sell amount of offers willing at `pn/pd`.
    pub fn supply_at(&self, pn: u64, pd: u64) -> Result<u128> {
        Ok(self.price_comp_stats(pn, pd)?.cumulative_offered_for_sale)
    }

    /// Total sell amount of offers strictly below `pn/pd` -- the part of the
    /// book that must trade at this price, excluding the marginal bucket.
    pub fn strict_supply_at(&self, pn: u64, pd: u64) -> Result<u128> {
        if !self.preprocessed {
            return Err(SpeedexError::BookNotPreprocessed);
        }
        let idx = self
            .buckets
            .partition_point(|bucket| bucket.price.lt_candidate(pn, pd));
        Ok(if idx == 0 {
            0
        } else {
            self.buckets[idx - 1].offered
        })
    }

    /// Supply strictly below the candidate, valued at the candidate price.
    pub fn strict_sell_value_at(&self, pn: u64, pd: u64) -> Result<u128> {
        Ok(self
            .strict_supply_at(pn, pd)?
            .saturating_mul(u128::from(pn)))
    }

    /// Q32 own-price-weighted supply of offers willing at `pn/pd`.
    pub fn supply_times_price_at(&self, pn: u64, pd: u64) -> Result<u128> {
        Ok(self
            .price_comp_stats(pn, pd)?
            .cumulative_offered_for_sale_times_price)
    }

    /// Supply valued at the candidate price: `supply_at * pn`, saturating.
    /// This is the quantity the clearing engine aggregates per asset.
    pub fn sell_value_at(&self, pn: u64, pd: u64) -> Result<u128> {
        Ok(self.supply_at(pn, pd)?.saturating_mul(u128::from(pn)))
    }

    /// `min(cap, sell_value_at)` -- bounds exposure when several pairs
    /// involve the same asset.
    pub fn sell_value_capped(&self, pn: u64, pd: u64, cap: u128) -> Result<u128> {
        Ok(self.sell_value_at(pn, pd)?.min(cap))
    }

    // =================================================================
    // Settlement support
    // =================================================================

    /// The offers in their deterministic processing order.
    ///
    /// # Errors
    /// `BookNotPreprocessed` before preprocessing.
    pub fn offers(&self) -> Result<&[IocOffer]> {
        if !self.preprocessed {
            return Err(SpeedexError::BookNotPreprocessed);
        }
        Ok(&self.offers)
    }

    /// Number of offers with `min_price <= pn/pd` (price bucket inclusive).
    pub fn prefix_len_at(&self, pn: u64, pd: u64) -> Result<usize> {
        let idx = self.bucket_index_le(pn, pd)?;
        Ok(if idx == 0 { 0 } else { self.buckets[idx - 1].end })
    }

    /// Number of offers with `min_price < pn/pd` (strictly below).
    pub fn strict_prefix_len_at(&self, pn: u64, pd: u64) -> Result<usize> {
        if !self.preprocessed {
            return Err(SpeedexError::BookNotPreprocessed);
        }
        let idx = self
            .buckets
            .partition_point(|bucket| bucket.price.lt_candidate(pn, pd));
        Ok(if idx == 0 { 0 } else { self.buckets[idx - 1].end })
    }

    fn bucket_index_le(&self, pn: u64, pd: u64) -> Result<usize> {
        if !self.preprocessed {
            return Err(SpeedexError::BookNotPreprocessed);
        }
        Ok(self
            .buckets
            .partition_point(|bucket| bucket.price.le_candidate(pn, pd)))
    }
}

#[cfg(test)]
mod tests {
    use speedex_types::{AccountId, Asset, Price};

    use super::*;

    fn pair() -> AssetPair {
        AssetPair::new(
            Asset::issued("SELL", AccountId([1; 32])),
            Asset::issued("BUY", AccountId([1; 32])),
        )
    }

    fn add(book: &mut IocOrderbook, p_n: i32, p_d: i32, amount: i64, idx: u64) {
        let offer = IocOffer::new(
            amount,
            Price::new(p_n, p_d),
            AccountId([7; 32]),
            idx as i64,
            0,
        );
        book.add_offer(offer).unwrap();
    }

    #[test]
    fn empty_orderbook() {
        let mut book = IocOrderbook::new(pair());
        book.do_price_computation_preprocessing();

        let stats = book.price_comp_stats(1, 1).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, 0);
        assert_eq!(stats.cumulative_offered_for_sale_times_price, 0);
    }

    #[test]
    fn one_offer() {
        let mut book = IocOrderbook::new(pair());
        let amount: i64 = 10_000;

        add(&mut book, 100, 100, amount, 1);
        book.do_price_computation_preprocessing();

        let stats = book.price_comp_stats(1, 1).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, amount as u128);
        assert_eq!(
            stats.cumulative_offered_for_sale_times_price,
            (amount as u128) << 32
        );

        let stats = book.price_comp_stats(0, 1).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, 0);
        assert_eq!(stats.cumulative_offered_for_sale_times_price, 0);

        let stats = book.price_comp_stats(100, 1).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, amount as u128);
        assert_eq!(
            stats.cumulative_offered_for_sale_times_price,
            (amount as u128) << 32
        );

        let stats = book.price_comp_stats(1, 100).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, 0);
        assert_eq!(stats.cumulative_offered_for_sale_times_price, 0);
    }

    #[test]
    fn offers_at_identical_price_point() {
        let mut book = IocOrderbook::new(pair());
        let amount: i64 = 10_000;

        add(&mut book, 100, 100, amount, 1);
        add(&mut book, 200, 200, amount, 2);
        add(&mut book, 300, 300, amount, 3);
        add(&mut book, 100, 200, amount, 4);
        add(&mut book, 200, 100, amount, 5);

        book.do_price_computation_preprocessing();

        let half_weighted = (amount as u128) << 31;

        let stats = book.price_comp_stats(1, 1).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, 4 * amount as u128);
        assert_eq!(
            stats.cumulative_offered_for_sale_times_price,
            half_weighted + ((3 * amount as u128) << 32)
        );

        let stats = book.price_comp_stats(101, 100).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, 4 * amount as u128);
        assert_eq!(
            stats.cumulative_offered_for_sale_times_price,
            half_weighted + ((3 * amount as u128) << 32)
        );

        let stats = book.price_comp_stats(1, 2).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, amount as u128);
        assert_eq!(stats.cumulative_offered_for_sale_times_price, half_weighted);

        let stats = book.price_comp_stats(1, 200).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, 0);
        assert_eq!(stats.cumulative_offered_for_sale_times_price, 0);

        // At 2/1 the 200/100 offer joins: 10000*2^31 + 50000*2^32.
        let stats = book.price_comp_stats(200, 100).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, 5 * amount as u128);
        assert_eq!(
            stats.cumulative_offered_for_sale_times_price,
            half_weighted + ((5 * amount as u128) << 32)
        );

        let stats = book.price_comp_stats(201, 100).unwrap();
        assert_eq!(stats.cumulative_offered_for_sale, 5 * amount as u128);
        assert_eq!(
            stats.cumulative_offered_for_sale_times_price,
            half_weighted + ((5 * amount as u128) << 32)
        );
    }

    #[test]
    fn sell_value_query() {
        let mut book = IocOrderbook::new(pair());
        let amount: i64 = 10_000;

        add(&mut book, 300, 100, amount, 1);
        book.do_price_computation_preprocessing();

        // Strictly above the candidate: excluded.
        assert_eq!(book.sell_value_at(299, 100).unwrap(), 0);
        // Exactly at the candidate: the whole price bucket is included.
        assert_eq!(book.sell_value_at(300, 100).unwrap(), 300 * amount as u128);
        assert_eq!(book.sell_value_at(400, 100).unwrap(), 400 * amount as u128);

        // The cap bounds the reported value.
        assert_eq!(book.sell_value_capped(400, 100, 0).unwrap(), 0);
        assert_eq!(
            book.sell_value_capped(400, 100, 200 * amount as u128).unwrap(),
            200 * amount as u128
        );
        assert_eq!(
            book.sell_value_capped(400, 100, u128::MAX).unwrap(),
            400 * amount as u128
        );
    }

    #[test]
    fn overflow_stress_does_not_wrap() {
        let mut book = IocOrderbook::new(pair());
        let amount = i64::MAX;

        add(&mut book, i32::MAX, 1, amount, 1);
        book.do_price_computation_preprocessing();
        assert!(!book.is_saturated());

        let value = book.sell_value_at(u64::MAX, 1).unwrap();
        assert_eq!(value, amount as u128 * u128::from(u64::MAX));

        let weighted = book.supply_times_price_at(u64::MAX, 1).unwrap();
        assert_eq!(weighted, (amount as u128 * i32::MAX as u128) << 32);
    }

    #[test]
    fn weighted_prefix_sum_saturates_and_reports() {
        let mut book = IocOrderbook::new(pair());
        // Four maximal offers push the Q32 accumulator past 2^128.
        for idx in 0..4 {
            add(&mut book, i32::MAX, 1, i64::MAX, idx);
        }
        book.do_price_computation_preprocessing();

        assert!(book.is_saturated());
        assert_eq!(
            book.supply_times_price_at(u64::MAX, 1).unwrap(),
            u128::MAX
        );
    }

    #[test]
    fn book_freezes_after_preprocessing() {
        let mut book = IocOrderbook::new(pair());
        add(&mut book, 1, 1, 10, 1);
        book.do_price_computation_preprocessing();

        let offer = IocOffer::new(10, Price::new(1, 1), AccountId([7; 32]), 99, 0);
        assert!(matches!(
            book.add_offer(offer),
            Err(SpeedexError::BookFrozen)
        ));
    }

    #[test]
    fn queries_require_preprocessing() {
        let book = IocOrderbook::new(pair());
        assert!(matches!(
            book.price_comp_stats(1, 1),
            Err(SpeedexError::BookNotPreprocessed)
        ));
        assert!(matches!(
            book.offers(),
            Err(SpeedexError::BookNotPreprocessed)
        ));
    }

    #[test]
    fn malformed_offers_rejected() {
        let mut book = IocOrderbook::new(pair());
        let bad_amount = IocOffer::new(0, Price::new(1, 1), AccountId([7; 32]), 0, 0);
        assert!(matches!(
            book.add_offer(bad_amount),
            Err(SpeedexError::MalformedOffer)
        ));
        let bad_price = IocOffer::new(10, Price::new(-1, 1), AccountId([7; 32]), 0, 0);
        assert!(matches!(
            book.add_offer(bad_price),
            Err(SpeedexError::MalformedOffer)
        ));
    }

    #[test]
    fn strict_supply_excludes_the_marginal_bucket() {
        let mut book = IocOrderbook::new(pair());
        add(&mut book, 1, 2, 100, 1);
        add(&mut book, 1, 1, 200, 2);
        add(&mut book, 2, 2, 300, 3);
        book.do_price_computation_preprocessing();

        assert_eq!(book.supply_at(1, 1).unwrap(), 600);
        assert_eq!(book.strict_supply_at(1, 1).unwrap(), 100);
        assert_eq!(book.strict_sell_value_at(1, 1).unwrap(), 100);
        assert_eq!(book.strict_supply_at(2, 1).unwrap(), 600);
    }

    #[test]
    fn prefix_lengths_split_at_the_candidate() {
        let mut book = IocOrderbook::new(pair());
        let amount: i64 = 100;
        add(&mut book, 1, 2, amount, 1);
        add(&mut book, 1, 1, amount, 2);
        add(&mut book, 2, 2, amount, 3);
        add(&mut book, 2, 1, amount, 4);
        book.do_price_computation_preprocessing();

        assert_eq!(book.prefix_len_at(1, 1).unwrap(), 3);
        assert_eq!(book.strict_prefix_len_at(1, 1).unwrap(), 1);
        assert_eq!(book.prefix_len_at(1, 2).unwrap(), 1);
        assert_eq!(book.strict_prefix_len_at(1, 2).unwrap(), 0);
        assert_eq!(book.prefix_len_at(3, 1).unwrap(), 4);
    }

    #[test]
    fn querying_at_max_price_returns_total_amount() {
        let mut book = IocOrderbook::new(pair());
        let mut total: u128 = 0;
        for idx in 1u64..=20 {
            add(&mut book, idx as i32, 7, (idx * 11) as i64, idx);
            total += (idx * 11) as u128;
        }
        book.do_price_computation_preprocessing();

        assert_eq!(book.supply_at(u64::MAX, 1).unwrap(), total);
        assert_eq!(book.supply_at(0, 1).unwrap(), 0);
    }

    #[test]
    fn preprocessing_is_idempotent() {
        let mut book = IocOrderbook::new(pair());
        add(&mut book, 1, 1, 10, 1);
        book.do_price_computation_preprocessing();
        let before = book.price_comp_stats(1, 1).unwrap();
        book.do_price_computation_preprocessing();
        assert_eq!(book.price_comp_stats(1, 1).unwrap(), before);
    }
}

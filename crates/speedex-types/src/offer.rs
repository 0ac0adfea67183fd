//! Immediate-or-cancel offers.
//!
//! An [`IocOffer`] either fills at the batch clearing price or is dropped;
//! nothing rests on the book across batches. Offers carry a deterministic
//! total order -- (price, account, sequence, op index) -- which is the sole
//! processing order everywhere, independent of submission order.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AccountId, Price};

/// A single immediate-or-cancel offer to sell `sell_amount` units at a
/// minimum price of `min_price`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IocOffer {
    pub sell_amount: i64,
    pub min_price: Price,
    pub account: AccountId,
    pub seq_num: i64,
    pub op_index: u32,
}

impl IocOffer {
    #[must_use]
    pub fn new(
        sell_amount: i64,
        min_price: Price,
        account: AccountId,
        seq_num: i64,
        op_index: u32,
    ) -> Self {
        Self {
            sell_amount,
            min_price,
            account,
            seq_num,
            op_index,
        }
    }

    /// Valid for admission: positive amount and a valid price.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.sell_amount > 0 && self.min_price.is_valid()
    }
}

impl Ord for IocOffer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.min_price
            .cmp(&other.min_price)
            .then_with(|| self.account.cmp(&other.account))
            .then_with(|| self.seq_num.cmp(&other.seq_num))
            .then_with(|| self.op_index.cmp(&other.op_index))
    }
}

impl PartialOrd for IocOffer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for IocOffer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IocOffer {}

impl fmt::Display for IocOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "offer[{} seq {} op {}] {} @ {}",
            self.account, self.seq_num, self.op_index, self.sell_amount, self.min_price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(price: Price, account: u8, seq: i64, op: u32) -> IocOffer {
        IocOffer::new(100, price, AccountId([account; 32]), seq, op)
    }

    #[test]
    fn orders_by_price_first() {
        let cheap = offer(Price::new(1, 2), 9, 9, 9);
        let dear = offer(Price::new(2, 1), 0, 0, 0);
        assert!(cheap < dear);
    }

    #[test]
    fn ties_break_by_account_seq_op() {
        let p = Price::new(1, 1);
        let a = offer(p, 1, 5, 0);
        let b = offer(p, 2, 0, 0);
        assert!(a < b);

        let c = offer(p, 1, 6, 0);
        assert!(a < c);

        let d = offer(p, 1, 5, 1);
        assert!(a < d);
    }

    #[test]
    fn equivalent_price_encodings_tie() {
        // 100/100 and 200/200 are the same ratio; the account tiebreak decides.
        let a = offer(Price::new(100, 100), 1, 0, 0);
        let b = offer(Price::new(200, 200), 2, 0, 0);
        assert!(a < b);
    }

    #[test]
    fn well_formedness() {
        assert!(offer(Price::new(1, 1), 0, 0, 0).is_well_formed());
        assert!(!IocOffer::new(0, Price::new(1, 1), AccountId([0; 32]), 0, 0).is_well_formed());
        assert!(!IocOffer::new(-5, Price::new(1, 1), AccountId([0; 32]), 0, 0).is_well_formed());
        assert!(!IocOffer::new(10, Price::new(0, 1), AccountId([0; 32]), 0, 0).is_well_formed());
    }

    #[test]
    fn sort_is_independent_of_insertion_order() {
        let p = Price::new(1, 1);
        let mut forward = vec![offer(p, 1, 0, 0), offer(p, 2, 0, 0), offer(Price::new(1, 2), 3, 0, 0)];
        let mut backward: Vec<_> = forward.iter().copied().rev().collect();
        forward.sort();
        backward.sort();
        for (a, b) in forward.iter().zip(backward.iter()) {
            assert_eq!(a.account, b.account);
        }
    }
}

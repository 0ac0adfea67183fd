//! Fixed-point arithmetic for supply computations.
//!
//! Every product that can exceed 63 bits runs in unsigned 128-bit integers.
//! Square roots use a dedicated Newton iteration on `u128` with explicit
//! round-up and round-down variants; rounding direction is always chosen so
//! that quoted supply underestimates the mathematical value.

use speedex_types::{constants, Price};

/// Floor of the square root of a `u128`.
#[must_use]
pub fn isqrt_u128(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    // Initial guess: 2^ceil(bits/2) >= sqrt(value); Newton descends to the floor.
    let bits = 128 - value.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    loop {
        let next = (x + value / x) >> 1;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// `floor(sqrt(a * b))` over the exact 128-bit product.
#[must_use]
pub fn sqrt_product_round_down(a: u64, b: u64) -> u64 {
    isqrt_u128(u128::from(a) * u128::from(b)) as u64
}

/// `ceil(sqrt(a * b))` over the exact 128-bit product.
#[must_use]
pub fn sqrt_product_round_up(a: u64, b: u64) -> u64 {
    let product = u128::from(a) * u128::from(b);
    let root = isqrt_u128(product);
    if root * root == product {
        root as u64
    } else {
        (root + 1) as u64
    }
}

/// `amount - floor(amount * fee_bps / 10000)`, i.e. the amount net of fee.
///
/// Returns 0 if the fee consumes the whole amount.
#[must_use]
pub fn subtract_fee(amount: u64, fee_bps: u32) -> u64 {
    let tax = (u128::from(amount) * u128::from(fee_bps)) / u128::from(constants::BPS_DENOMINATOR);
    if tax >= u128::from(amount) {
        0
    } else {
        amount - tax as u64
    }
}

/// `floor(amount * (10000 - fee_bps) / 10000)` -- the fee-discounted portion
/// of an incoming amount, as credited for the constant-product check.
#[must_use]
pub fn fee_discounted(amount: i64, fee_bps: u32) -> i64 {
    if amount <= 0 {
        return 0;
    }
    let kept = u128::from(constants::BPS_DENOMINATOR.saturating_sub(fee_bps));
    ((amount as u128 * kept) / u128::from(constants::BPS_DENOMINATOR)) as i64
}

/// `p1n/p1d < p2n/p2d` by 128-bit cross-multiplication.
#[must_use]
pub fn ratio_lt(p1n: u64, p1d: u64, p2n: u64, p2d: u64) -> bool {
    u128::from(p1n) * u128::from(p2d) < u128::from(p2n) * u128::from(p1d)
}

/// An offer's sell amount weighted by its own minimum price in Q32:
/// `(sell_amount * price.n) << 32 / price.d`.
///
/// With `sell_amount <= 2^63` and `price.n <= 2^31` the shifted intermediate
/// stays below 2^126, so the computation is exact in `u128`.
#[must_use]
pub fn q32_sell_value(sell_amount: i64, price: Price) -> u128 {
    debug_assert!(sell_amount > 0 && price.is_valid());
    let weighted = (sell_amount as u128 * price.n as u128) << constants::PRICE_Q32_SHIFT;
    weighted / price.d as u128
}

/// `ceil(a / b)`. `b` must be nonzero.
#[must_use]
pub fn div_round_up(a: u128, b: u128) -> u128 {
    (a + b - 1) / b
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn isqrt_small_values() {
        assert_eq!(isqrt_u128(0), 0);
        assert_eq!(isqrt_u128(1), 1);
        assert_eq!(isqrt_u128(2), 1);
        assert_eq!(isqrt_u128(3), 1);
        assert_eq!(isqrt_u128(4), 2);
        assert_eq!(isqrt_u128(99), 9);
        assert_eq!(isqrt_u128(100), 10);
    }

    #[test]
    fn isqrt_at_extremes() {
        assert_eq!(isqrt_u128(u128::MAX), (1u128 << 64) - 1);
        let square = (1u128 << 63) * (1u128 << 63);
        assert_eq!(isqrt_u128(square), 1u128 << 63);
        assert_eq!(isqrt_u128(square - 1), (1u128 << 63) - 1);
    }

    #[test]
    fn sqrt_product_rounding_directions() {
        // 10^12 * 0.997 is not a perfect square; down and up must straddle it.
        let down = sqrt_product_round_down(1_000_000, 997_000);
        let up = sqrt_product_round_up(1_000_000, 997_000);
        assert_eq!(up, down + 1);
        assert!(u128::from(down) * u128::from(down) < 997_000_000_000);
        assert!(u128::from(up) * u128::from(up) > 997_000_000_000);

        // Perfect square: both variants agree.
        assert_eq!(sqrt_product_round_down(1_000_000, 1_000_000), 1_000_000);
        assert_eq!(sqrt_product_round_up(1_000_000, 1_000_000), 1_000_000);
    }

    #[test]
    fn subtract_fee_basics() {
        assert_eq!(subtract_fee(1_000_000, 30), 997_000);
        assert_eq!(subtract_fee(1_000_000, 0), 1_000_000);
        assert_eq!(subtract_fee(1_000_000, 10_000), 0);
        assert_eq!(subtract_fee(0, 30), 0);
        // Fee rounds down, so tiny amounts keep everything.
        assert_eq!(subtract_fee(3, 30), 3);
    }

    #[test]
    fn fee_discounted_basics() {
        assert_eq!(fee_discounted(10_000, 30), 9_970);
        assert_eq!(fee_discounted(10_000, 0), 10_000);
        assert_eq!(fee_discounted(0, 30), 0);
        assert_eq!(fee_discounted(-5, 30), 0);
        // floor(9999 * 9970 / 10000) = 9969
        assert_eq!(fee_discounted(9_999, 30), 9_969);
    }

    #[test]
    fn ratio_lt_cross_products() {
        assert!(ratio_lt(1, 2, 1, 1));
        assert!(!ratio_lt(1, 1, 1, 1));
        assert!(!ratio_lt(3, 1, 2, 1));
        // Large components stay exact in u128.
        assert!(ratio_lt(u64::MAX - 1, u64::MAX, 1, 1));
    }

    #[test]
    fn q32_weighting() {
        assert_eq!(q32_sell_value(10_000, Price::new(100, 100)), 10_000u128 << 32);
        assert_eq!(q32_sell_value(10_000, Price::new(100, 200)), 10_000u128 << 31);
        assert_eq!(q32_sell_value(10_000, Price::new(200, 100)), 10_000u128 << 33);
        // Largest admissible offer stays well inside u128.
        let huge = q32_sell_value(i64::MAX, Price::new(i32::MAX, 1));
        assert_eq!(huge, (i64::MAX as u128 * i32::MAX as u128) << 32);
    }

    #[test]
    fn div_round_up_basics() {
        assert_eq!(div_round_up(10, 5), 2);
        assert_eq!(div_round_up(11, 5), 3);
        assert_eq!(div_round_up(0, 5), 0);
    }

    proptest! {
        #[test]
        fn isqrt_is_floor_sqrt(value in any::<u128>()) {
            let root = isqrt_u128(value);
            prop_assert!(root * root <= value);
            // (root + 1)^2 > value, guarding the squaring against overflow.
            if let Some(next) = root.checked_add(1).and_then(|r| r.checked_mul(r)) {
                prop_assert!(next > value);
            }
        }

        #[test]
        fn sqrt_rounding_brackets_product(a in any::<u64>(), b in any::<u64>()) {
            let product = u128::from(a) * u128::from(b);
            let down = u128::from(sqrt_product_round_down(a, b));
            let up = u128::from(sqrt_product_round_up(a, b));
            prop_assert!(down * down <= product);
            prop_assert!(up * up >= product);
            prop_assert!(up - down <= 1);
        }

        #[test]
        fn subtract_fee_never_exceeds_input(amount in any::<u64>(), fee in 0u32..=10_000) {
            prop_assert!(subtract_fee(amount, fee) <= amount);
        }
    }
}

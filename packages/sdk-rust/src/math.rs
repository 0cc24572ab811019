//! Quote math and amount scaling.
//!
//! Quotes work in UI units (`f64`); everything that lands in an instruction is
//! scaled to atomic units with checked integer arithmetic.

use crate::error::{Error, Result};
use crate::reserves::Reserves;
use crate::types::{SwapDirection, SwapQuote};

// ─── Constants ────────────────────────────────────────────────────────────────

/// Reserve of token A used when no pool state is available.
pub const MOCK_RESERVE_A: f64 = 100_000.0;
/// Reserve of token B used when no pool state is available.
pub const MOCK_RESERVE_B: f64 = 100.0;
/// 1 % swap fee.
pub const DEFAULT_FEE_RATE: f64 = 0.01;
/// Displayed price impact is clamped to this many percent.
pub const MAX_PRICE_IMPACT_PCT: f64 = 10.0;

// ─── Constant product ─────────────────────────────────────────────────────────

/// `(input·(1−fee)·reserve_out) / (reserve_in + input·(1−fee))`
///
/// Returns 0 when the denominator vanishes.
pub fn constant_product_out(amount_in: f64, reserve_in: f64, reserve_out: f64, fee_rate: f64) -> f64 {
    let after_fee = amount_in * (1.0 - fee_rate);
    let denom = reserve_in + after_fee;
    if denom <= 0.0 {
        return 0.0;
    }
    after_fee * reserve_out / denom
}

/// `min(input / reserve_in · 100, 10)`.
pub fn price_impact_pct(amount_in: f64, reserve_in: f64) -> f64 {
    if amount_in <= 0.0 {
        return 0.0;
    }
    if reserve_in <= 0.0 {
        return MAX_PRICE_IMPACT_PCT;
    }
    (amount_in / reserve_in * 100.0).min(MAX_PRICE_IMPACT_PCT)
}

/// Full quote for `amount_in` against `reserves`.
///
/// Pure: identical inputs always give an identical quote.
pub fn quote(
    amount_in:    f64,
    reserves:     &Reserves,
    direction:    SwapDirection,
    slippage_pct: f64,
) -> Result<SwapQuote> {
    if !amount_in.is_finite() || amount_in < 0.0 {
        return Err(Error::InvalidArgument(format!("amount_in must be a non-negative number, got {amount_in}")));
    }
    if !(0.0..=100.0).contains(&slippage_pct) {
        return Err(Error::InvalidArgument(format!("slippage {slippage_pct}% is out of range 0–100")));
    }
    if !(0.0..1.0).contains(&reserves.fee_rate) {
        return Err(Error::InvalidArgument(format!("fee rate {} must be in [0, 1)", reserves.fee_rate)));
    }
    if [reserves.reserve_a, reserves.reserve_b].iter().any(|r| r.is_nan() || *r < 0.0) {
        return Err(Error::InvalidArgument("reserves must be non-negative".into()));
    }

    let (reserve_in, reserve_out) = match direction {
        SwapDirection::AToB => (reserves.reserve_a, reserves.reserve_b),
        SwapDirection::BToA => (reserves.reserve_b, reserves.reserve_a),
    };

    let amount_out = constant_product_out(amount_in, reserve_in, reserve_out, reserves.fee_rate);
    let rate = if reserve_in > 0.0 { reserve_out / reserve_in } else { 0.0 };

    Ok(SwapQuote {
        amount_in,
        amount_out,
        rate,
        price_impact_pct: price_impact_pct(amount_in, reserve_in),
        fee:              amount_in * reserves.fee_rate,
        minimum_received: amount_out * (1.0 - slippage_pct / 100.0),
    })
}

// ─── Scaling ──────────────────────────────────────────────────────────────────

/// `10^decimals` as an integer.
pub fn decimal_factor(decimals: u8) -> Result<u64> {
    10u64.checked_pow(decimals as u32).ok_or(Error::MathOverflow)
}

/// Whole-token count × `10^decimals`, e.g. an initial supply.
pub fn scale_whole(amount: u64, decimals: u8) -> Result<u64> {
    amount.checked_mul(decimal_factor(decimals)?).ok_or(Error::MathOverflow)
}

/// Convert a UI amount to atomic units, rounding to the nearest unit
/// (`1.005` at 6 decimals is `1_005_000`, not `1_004_999`).
pub fn ui_to_atomic(amount: f64, decimals: u8) -> Result<u64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidArgument(format!("amount must be a non-negative number, got {amount}")));
    }
    let scaled = (amount * decimal_factor(decimals)? as f64).round();
    if scaled >= u64::MAX as f64 {
        return Err(Error::MathOverflow);
    }
    Ok(scaled as u64)
}

/// Convert atomic units to a UI amount.
pub fn atomic_to_ui(amount: u64, decimals: u8) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mock() -> Reserves {
        Reserves { reserve_a: MOCK_RESERVE_A, reserve_b: MOCK_RESERVE_B, fee_rate: DEFAULT_FEE_RATE, mints: None }
    }

    #[test]
    fn thousand_in_against_mock_reserves() {
        let q = quote(1000.0, &mock(), SwapDirection::AToB, 1.0).unwrap();
        let expected = 1000.0 * 0.99 * 100.0 / (100_000.0 + 990.0);
        assert!((q.amount_out - expected).abs() < 1e-12);
        assert!((q.amount_out - 0.9803).abs() < 1e-4);
        assert!((q.price_impact_pct - 1.0).abs() < 1e-12);
        assert!((q.fee - 10.0).abs() < 1e-12);
        assert!((q.rate - 0.001).abs() < 1e-12);
        assert!((q.minimum_received - q.amount_out * 0.99).abs() < 1e-12);
    }

    #[test]
    fn reverse_direction_swaps_reserves() {
        let q = quote(1.0, &mock(), SwapDirection::BToA, 0.0).unwrap();
        let expected = 0.99 * 100_000.0 / (100.0 + 0.99);
        assert!((q.amount_out - expected).abs() < 1e-9);
        assert_eq!(q.rate, 1000.0);
        assert_eq!(q.price_impact_pct, 1.0);
    }

    #[test]
    fn zero_input_quotes_zero() {
        let q = quote(0.0, &mock(), SwapDirection::AToB, 1.0).unwrap();
        assert_eq!(q.amount_out, 0.0);
        assert_eq!(q.price_impact_pct, 0.0);
        assert_eq!(q.minimum_received, 0.0);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(quote(-1.0, &mock(), SwapDirection::AToB, 1.0).is_err());
        assert!(quote(f64::NAN, &mock(), SwapDirection::AToB, 1.0).is_err());
        assert!(quote(1.0, &mock(), SwapDirection::AToB, 101.0).is_err());
        let free = Reserves { fee_rate: 1.0, ..mock() };
        assert!(quote(1.0, &free, SwapDirection::AToB, 1.0).is_err());
        let unknown_a = Reserves { reserve_a: f64::NAN, ..mock() };
        assert!(quote(1.0, &unknown_a, SwapDirection::AToB, 1.0).is_err());
        let unknown_b = Reserves { reserve_b: f64::NAN, ..mock() };
        assert!(quote(1.0, &unknown_b, SwapDirection::BToA, 1.0).is_err());
    }

    #[test]
    fn scaling() {
        assert_eq!(ui_to_atomic(1.5, 6).unwrap(), 1_500_000);
        assert_eq!(ui_to_atomic(0.1234567, 6).unwrap(), 123_457);
        assert_eq!(scale_whole(1_000_000, 6).unwrap(), 1_000_000_000_000);
        assert!(matches!(scale_whole(u64::MAX, 1), Err(Error::MathOverflow)));
        assert!(matches!(decimal_factor(20), Err(Error::MathOverflow)));
        assert_eq!(atomic_to_ui(100_000, 6), 0.1);
    }

    #[test]
    fn scaling_survives_binary_representation() {
        assert_eq!(ui_to_atomic(1.005, 6).unwrap(), 1_005_000);
        assert_eq!(ui_to_atomic(0.000249, 6).unwrap(), 249);
        assert_eq!(ui_to_atomic(0.29, 2).unwrap(), 29);
        assert_eq!(ui_to_atomic(2.0, 9).unwrap(), 2_000_000_000);
    }

    proptest! {
        #[test]
        fn printed_amounts_scale_exactly(units in 0u64..10_000_000_000) {
            let ui: f64 = format!("{}.{:06}", units / 1_000_000, units % 1_000_000).parse().unwrap();
            prop_assert_eq!(ui_to_atomic(ui, 6).unwrap(), units);
        }


        #[test]
        fn output_is_non_negative_and_increasing(
            a in 0.0f64..1e6,
            step in 1e-2f64..1e6,
            reserve_in in 1.0f64..1e9,
            reserve_out in 1.0f64..1e9,
            fee in 0.0f64..0.5,
        ) {
            let lo = constant_product_out(a, reserve_in, reserve_out, fee);
            let hi = constant_product_out(a + step, reserve_in, reserve_out, fee);
            prop_assert!(lo >= 0.0);
            prop_assert!(hi > lo);
        }

        #[test]
        fn price_impact_is_capped(amount in 0.0f64..1e15, reserve_in in 0.0f64..1e12) {
            prop_assert!(price_impact_pct(amount, reserve_in) <= MAX_PRICE_IMPACT_PCT);
        }

        #[test]
        fn quoting_is_idempotent(amount in 0.0f64..1e7, slippage in 0.0f64..100.0) {
            let first  = quote(amount, &mock(), SwapDirection::AToB, slippage).unwrap();
            let second = quote(amount, &mock(), SwapDirection::AToB, slippage).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}

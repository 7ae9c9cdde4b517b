//! 18-decimal fixed-point helpers.

use num_bigint::BigUint;

/// 1.0 in 18-decimal fixed point.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// 100% in basis points.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// `floor(a * b / denominator)` with a 256-bit intermediate.
///
/// Returns `None` when `denominator` is zero or the result does not fit in a
/// `u128`.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / denominator);
    }
    let wide = BigUint::from(a) * BigUint::from(b) / BigUint::from(denominator);
    u128::try_from(wide).ok()
}

/// `floor(amount * bps / 10_000)` without overflow for `bps <= 10_000`.
pub fn bps_share(amount: u128, bps: u16) -> u128 {
    let bps = u128::from(bps);
    (amount / BPS_DENOMINATOR) * bps + (amount % BPS_DENOMINATOR) * bps / BPS_DENOMINATOR
}

/// Scale whole units up to fixed point.
pub fn to_fixed(units: u128) -> Option<u128> {
    units.checked_mul(PRECISION)
}

/// Render a fixed-point amount as a decimal string, trimming trailing zeros.
pub fn format_fixed(value: u128) -> String {
    let whole = value / PRECISION;
    let frac = value % PRECISION;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:018}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mul_div_handles_wide_products() {
        let value = 24_000 * PRECISION;
        assert_eq!(mul_div(value, PRECISION, PRECISION), Some(value));
        assert_eq!(mul_div(value, 8 * PRECISION / 10, PRECISION), Some(19_200 * PRECISION));
    }

    #[test]
    fn mul_div_rejects_zero_denominator_and_overflow() {
        assert_eq!(mul_div(1, 1, 0), None);
        assert_eq!(mul_div(u128::MAX, u128::MAX, 1), None);
    }

    #[test]
    fn format_fixed_trims() {
        assert_eq!(format_fixed(24_000 * PRECISION), "24000");
        assert_eq!(format_fixed(PRECISION / 5), "0.2");
        assert_eq!(format_fixed(11 * PRECISION / 10), "1.1");
    }

    proptest! {
        #[test]
        fn bps_share_matches_wide_division(amount in any::<u128>(), bps in 0u16..=10_000) {
            let expected = mul_div(amount, u128::from(bps), BPS_DENOMINATOR).unwrap();
            prop_assert_eq!(bps_share(amount, bps), expected);
        }
    }
}

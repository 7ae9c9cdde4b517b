//! Fixed-point exponential decay `e^{-x}`.
//!
//! `e^{-x}` is evaluated as `PRECISION² / e^{x}`, where `e^{x}` is the Taylor
//! series `Σ xⁿ/n!` summed term by term in exact integer arithmetic until a
//! term truncates to zero. All terms are positive, so there is no
//! cancellation; each truncation loses less than one unit in the last place.
//!
//! Measured against a 60-digit reference the relative error is below 1e-16
//! for exponents in `[0, 0.5]` (five years at λ = 0.1) and below 1e-13 up to
//! [`MAX_DECAY_EXPONENT`]. The result is exactly `PRECISION` at `x = 0` and
//! non-increasing in `x`.

use num_bigint::BigUint;
use vita_common::PRECISION;

/// Largest accepted exponent `λ·t` (10.0, i.e. 100 years at λ = 0.1).
pub const MAX_DECAY_EXPONENT: u128 = 10 * PRECISION;

/// `e^{-x}` for an 18-decimal fixed-point `x <= MAX_DECAY_EXPONENT`.
///
/// Callers enforce the bound; larger inputs still terminate but lose the
/// documented accuracy.
pub fn exp_neg(x: u128) -> u128 {
    if x == 0 {
        return PRECISION;
    }
    let one = BigUint::from(PRECISION);
    let x = BigUint::from(x);

    let mut term = one.clone();
    let mut sum = one.clone();
    let mut n: u32 = 1;
    loop {
        term = term * &x / (&one * n);
        if term.bits() == 0 {
            break;
        }
        sum += &term;
        n += 1;
    }

    // sum >= PRECISION, so the quotient is at most PRECISION.
    u128::try_from(&one * &one / sum).unwrap_or(0)
}

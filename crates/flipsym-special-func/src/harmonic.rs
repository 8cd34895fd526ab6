//! Spherical-harmonic normalisation.
//!
//! Y_l^m(θ, φ) = sqrt((2l+1)/(4π) · (l-m)!/(l+m)!) · P_l^m(cos θ) · e^(imφ)
//!
//! The π under the root is kept apart so that the rational part stays exact.

use flipsym_integers::{Integer, Rational};

/// Rational part of the squared Y_l^m prefactor, `(2l+1)(l-m)! / (4 (l+m)!)`.
///
/// The full prefactor is `sqrt(ynm_norm_squared(l, m) / π)`.
///
/// # Panics
///
/// Panics if `m > l`.
#[must_use]
pub fn ynm_norm_squared(l: u32, m: u32) -> Rational {
    assert!(m <= l, "order {m} exceeds degree {l}");
    Rational::new(
        Integer::from(2 * l + 1) * Integer::factorial(l - m),
        Integer::new(4) * Integer::factorial(l + m),
    )
}

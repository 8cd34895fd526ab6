//! Legendre polynomials and associated Legendre functions.
//!
//! Legendre polynomials are orthogonal on [-1, 1] with weight 1:
//!
//! ∫₋₁¹ P_m(x) P_n(x) dx = 2/(2n+1) δ_mn
//!
//! The associated functions follow the Condon-Shortley convention:
//!
//! P_l^m(x) = (-1)^m (1 - x²)^(m/2) d^m/dx^m P_l(x)
//!
//! Only the polynomial factor `(-1)^m d^m/dx^m P_l` is returned here; the
//! caller decides how to represent `(1 - x²)^(m/2)` (for `x = cos t` it is
//! `sin(t)^m`).

use flipsym_integers::{Integer, Rational};
use num_traits::Zero;

/// Exact coefficients of P_l(x) in ascending powers of x.
///
/// The result has length `l + 1`; odd (even) powers vanish for even (odd) `l`.
#[must_use]
pub fn legendre_coefficients(l: u32) -> Vec<Rational> {
    let mut coeffs = vec![Rational::zero(); l as usize + 1];
    let scale = Integer::new(2).pow(l);
    for k in 0..=l / 2 {
        let magnitude = Integer::binomial(l, k) * Integer::binomial(2 * l - 2 * k, l);
        let value = Rational::new(magnitude, scale.clone());
        coeffs[(l - 2 * k) as usize] = if k % 2 == 0 { value } else { -value };
    }
    coeffs
}

/// Coefficients of the m-th derivative of a polynomial.
#[must_use]
pub fn derivative_coefficients(coeffs: &[Rational], order: u32) -> Vec<Rational> {
    let order = order as usize;
    if order >= coeffs.len() {
        return Vec::new();
    }
    coeffs
        .iter()
        .enumerate()
        .skip(order)
        .map(|(power, c)| {
            // power! / (power - order)!
            let falling = ((power - order + 1)..=power)
                .fold(Integer::new(1), |acc, f| acc * Integer::from(f as u64));
            c.clone() * Rational::from_integer(falling)
        })
        .collect()
}

/// Polynomial factor of P_l^m(x): the coefficients of `(-1)^m d^m/dx^m P_l(x)`.
///
/// Multiply by `(1 - x²)^(m/2)` to obtain P_l^m. Empty when `m > l`.
#[must_use]
pub fn assoc_legendre_coefficients(l: u32, m: u32) -> Vec<Rational> {
    let derived = derivative_coefficients(&legendre_coefficients(l), m);
    if m % 2 == 0 {
        derived
    } else {
        derived.into_iter().map(|c| -c).collect()
    }
}

/// Evaluates P_l(x) numerically using the three-term recurrence.
///
/// (n+1) P_{n+1}(x) = (2n+1) x P_n(x) - n P_{n-1}(x)
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn legendre_p(l: u32, x: f64) -> f64 {
    if l == 0 {
        return 1.0;
    }
    let mut p_prev = 1.0;
    let mut p_curr = x;
    for n in 1..l {
        let n = f64::from(n);
        let p_next = ((2.0 * n + 1.0) * x * p_curr - n * p_prev) / (n + 1.0);
        p_prev = p_curr;
        p_curr = p_next;
    }
    p_curr
}

//! Wide-angle bipolar decomposition.
//!
//! ```text
//! M_{l,l1,l2} = 1/4 ∫₋₁¹ [∫₋₁¹ B P_l1(mu1) dmu1] P_l2(mu2) dmu2
//! N_{l,l1,l2} = (4π)² Σ_{m,m1,m2} G(l,l1,l2;m,m1,m2)
//!               · (-1)^m Y_l^m(π - phi, 0)* · Y_l1^m1(theta/2, π)* · Y_l2^m2(theta/2, 0)*
//! ```
//!
//! Every azimuth is a multiple of π, so the harmonics are real and
//! conjugation does nothing. The separation harmonic is taken at the polar
//! angle `phi - π`, whose sine is `-sin(phi)`; that is where the `(-1)^m`
//! comes from, and the published term tables use this convention.
//!
//! The sum runs over every order triple. Gaunt coefficients outside the
//! selection rules are exact zeros and vanish from the sum on their own.

use flipsym_core::expand::{legendre_polynomial, surd_to_expr};
use flipsym_core::{expand_func, ExpandError, Expr, NormalForm};
use flipsym_integers::Rational;
use flipsym_integrate::integrate_normal_form;
use flipsym_simplify::Simplifier;
use flipsym_special_func::gaunt;

use crate::config::DecomposeConfig;
use crate::decomposer::{DecomposeError, TermPair};

/// Orders `-l..=l`.
#[allow(clippy::cast_possible_wrap)]
fn orders(l: u32) -> impl Iterator<Item = i32> {
    let l = l as i32;
    -l..=l
}

/// The unsimplified radial coefficient. It does not depend on `l`.
///
/// # Errors
///
/// Returns an error if either projection integral has no closed form.
pub fn m_term(kernel: &Expr, l1: u32, l2: u32, config: &DecomposeConfig) -> Result<Expr, DecomposeError> {
    let vars = &config.variables;
    let mu1 = Expr::from(vars.mu1.clone());
    let mu2 = Expr::from(vars.mu2.clone());

    let integrand = expand_func(&(kernel.clone() * Expr::legendre(l1, mu1)))?;
    let inner = integrate_normal_form(&NormalForm::from_expr(&integrand), &vars.mu1)?;
    let weight = NormalForm::from_expr(&legendre_polynomial(l2, &mu2));
    let outer = integrate_normal_form(&(&inner * &weight), &vars.mu2)?;
    Ok(outer.scale(&Rational::from_i64(1, 4)).to_expr())
}

/// `Y_l^m(theta, phi)*` for every order, expanded.
fn harmonics(l: u32, theta: &Expr, phi: &Expr) -> Result<Vec<NormalForm>, ExpandError> {
    orders(l)
        .map(|m| {
            expand_func(&Expr::ynm_conj(l, m, theta.clone(), phi.clone()))
                .map(|y| NormalForm::from_expr(&y))
        })
        .collect()
}

/// The unsimplified angular function.
///
/// # Errors
///
/// Returns an error if a harmonic cannot be expanded.
pub fn n_term(l: u32, l1: u32, l2: u32, config: &DecomposeConfig) -> Result<Expr, DecomposeError> {
    let half_theta = config.variables.theta_expr() / Expr::integer(2);
    let separation: Vec<NormalForm> = orders(l)
        .zip(harmonics(l, &(Expr::pi() - config.variables.phi_expr()), &Expr::zero())?)
        .map(|(m, y)| if m % 2 == 0 { y } else { -&y })
        .collect();
    let first = harmonics(l1, &half_theta, &Expr::pi())?;
    let second = harmonics(l2, &half_theta, &Expr::zero())?;

    let mut sum = NormalForm::zero();
    for (m, y) in orders(l).zip(&separation) {
        for (m1, y1) in orders(l1).zip(&first) {
            for (m2, y2) in orders(l2).zip(&second) {
                let coeff = NormalForm::from_expr(&surd_to_expr(&gaunt(l, l1, l2, m, m1, m2)));
                sum = &sum + &(&(&(&coeff * y) * y1) * y2);
            }
        }
    }

    // (4π)² / sqrt(π) from the Gaunt normalisation
    let prefactor = NormalForm::from_expr(&(Expr::integer(16) * Expr::pi().powi(3).sqrt()));
    Ok((&prefactor * &sum).to_expr())
}

/// Decomposes `kernel` at degrees `(l, l1, l2)`.
///
/// A vanishing M gives the empty pair without computing N.
///
/// # Errors
///
/// Returns an error if the kernel is outside the integrable class.
pub fn decompose_wide_angle(
    kernel: &Expr,
    l: u32,
    l1: u32,
    l2: u32,
    config: &DecomposeConfig,
) -> Result<TermPair, DecomposeError> {
    let simplifier = Simplifier::with_config(config.simplifier.clone());
    let m = simplifier.simplify_m(&m_term(kernel, l1, l2, config)?).expr;
    if m.is_zero() {
        return Ok(TermPair::zero());
    }
    let n = simplifier.simplify_n(&n_term(l, l1, l2, config)?).expr;
    Ok(TermPair { m, n })
}

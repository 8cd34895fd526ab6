//! Plane-parallel Legendre decomposition.
//!
//! ```text
//! M_l = (2l+1)/2 ∫₋₁¹ B(mu) P_l(mu) dmu
//! N_l = P_l(cos phi)
//! ```
//!
//! so that `B(cos phi) = Σ_l M_l N_l`.

use flipsym_core::{expand_func, Expr};
use flipsym_integrate::integrate_unit_interval;
use flipsym_simplify::Simplifier;

use crate::config::DecomposeConfig;
use crate::decomposer::{DecomposeError, TermPair};

/// The unsimplified radial coefficient `M_l`.
///
/// # Errors
///
/// Returns an error if the projection integral has no closed form.
pub fn m_term(kernel: &Expr, l: u32, config: &DecomposeConfig) -> Result<Expr, DecomposeError> {
    let mu = &config.variables.mu;
    let integrand = expand_func(&(kernel.clone() * Expr::legendre(l, Expr::from(mu.clone()))))?;
    let integral = integrate_unit_interval(&integrand, mu)?;
    Ok(Expr::rational(i64::from(2 * l + 1), 2) * integral)
}

/// The unsimplified angular function `N_l`.
///
/// # Errors
///
/// Never fails for a literal degree; the result type matches [`m_term`].
pub fn n_term(l: u32, config: &DecomposeConfig) -> Result<Expr, DecomposeError> {
    let phi = config.variables.phi_expr();
    Ok(expand_func(&Expr::legendre(l, phi.cos()))?)
}

/// Decomposes `kernel` at degree `l`.
///
/// M is simplified with the configured radial strategy, N with the angular
/// one. A vanishing M gives the empty pair without computing N.
///
/// # Errors
///
/// Returns an error if the kernel is outside the integrable class.
pub fn decompose_parallel(
    kernel: &Expr,
    l: u32,
    config: &DecomposeConfig,
) -> Result<TermPair, DecomposeError> {
    let simplifier = Simplifier::with_config(config.simplifier.clone());
    let m = simplifier.simplify_m(&m_term(kernel, l, config)?).expr;
    if m.is_zero() {
        return Ok(TermPair::zero());
    }
    let n = simplifier.simplify_n(&n_term(l, config)?).expr;
    Ok(TermPair { m, n })
}

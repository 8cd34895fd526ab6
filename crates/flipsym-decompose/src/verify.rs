//! Numerical checks of plane-parallel decompositions.
//!
//! The generated pairs must reconstruct the kernel:
//!
//! ```text
//! B(k, cos phi) ≈ Σ_l M_l(k) N_l(phi)
//! ```
//!
//! and each `M_l` must agree with a quadrature of its defining integral.

use std::cell::RefCell;

use flipsym_core::{Bindings, EvalError, Expr};
use flipsym_integrate::adaptive_integrate;
use flipsym_special_func::legendre_p;
use thiserror::Error;
use tracing::debug;

use crate::config::DecomposeConfig;
use crate::decomposer::TermPair;

/// Errors from the numerical checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// An expression could not be evaluated.
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// Adaptive quadrature ran out of subdivisions.
    #[error("quadrature did not converge (error estimate {0})")]
    NotConverged(String),
}

/// Largest `|B - Σ M N|` over `samples` angles evenly spread in `(0, π)`.
///
/// `params` binds `k` and the model parameters; `phi` and `mu` are bound
/// here.
///
/// # Errors
///
/// Returns an error if any expression has an unbound symbol.
#[allow(clippy::cast_precision_loss)]
pub fn verify_plane_parallel(
    kernel: &Expr,
    pairs: &[TermPair],
    params: &Bindings,
    config: &DecomposeConfig,
    samples: usize,
) -> Result<f64, VerifyError> {
    let vars = &config.variables;
    let mut worst = 0.0_f64;
    for i in 0..samples {
        let phi = std::f64::consts::PI * (i as f64 + 0.5) / samples as f64;
        let mut bindings = params.clone();
        bindings.insert(vars.phi.name(), phi);
        bindings.insert(vars.mu.name(), phi.cos());

        let exact = kernel.eval(&bindings)?;
        let mut approx = 0.0;
        for pair in pairs.iter().filter(|p| !p.is_empty()) {
            approx += pair.m.eval(&bindings)? * pair.n.eval(&bindings)?;
        }
        worst = worst.max((exact - approx).abs());
    }
    debug!(pairs = pairs.len(), samples, residual = worst, "verified reconstruction");
    Ok(worst)
}

/// `(2l+1)/2 ∫₋₁¹ B(mu) P_l(mu) dmu` by adaptive Gauss-Kronrod quadrature.
///
/// # Errors
///
/// Returns an error if the kernel cannot be evaluated or the quadrature does
/// not converge.
pub fn quadrature_coefficient(
    kernel: &Expr,
    l: u32,
    params: &Bindings,
    config: &DecomposeConfig,
) -> Result<f64, VerifyError> {
    let mu = config.variables.mu.name();
    let failure: RefCell<Option<EvalError>> = RefCell::new(None);
    let integrand = |x: f64| {
        let mut bindings = params.clone();
        bindings.insert(mu, x);
        match kernel.eval(&bindings) {
            Ok(value) => value * legendre_p(l, x),
            Err(err) => {
                failure.borrow_mut().get_or_insert(err);
                0.0
            }
        }
    };
    let result = adaptive_integrate(&integrand, -1.0, 1.0, 1e-13, 1e-12, 200);
    if let Some(err) = failure.into_inner() {
        return Err(err.into());
    }
    if !result.converged {
        return Err(VerifyError::NotConverged(format!("{:e}", result.error)));
    }
    Ok(f64::from(2 * l + 1) / 2.0 * result.value)
}

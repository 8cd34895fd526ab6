//! Exact integrals over `[-1, 1]`.
//!
//! The integrand is expanded into its normal form and integrated term by
//! term. A term must factor as
//!
//! ```text
//! c · x^n · exp(-A x² + rest) · (factors free of x)
//! ```
//!
//! with a non-negative integer `n`. Odd moments vanish by symmetry; even
//! moments follow from
//!
//! ```text
//! I_0    = sqrt(π/A) · erf(sqrt(A))
//! I_{2j} = (2j-1)/(2A) · I_{2j-2} - e^(-A)/A
//! ```
//!
//! and reduce to `2/(n+1)` when `A = 0`.

use std::collections::BTreeMap;

use flipsym_core::{Expr, Monomial, NormalForm, Symbol};
use flipsym_integers::Rational;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::trace;

/// Errors from [`integrate_unit_interval`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrateError {
    /// The variable appears with a power that is not a natural number.
    #[error("power {exponent} of `{var}` is not a non-negative integer")]
    NonPolynomial {
        /// Integration variable.
        var: Symbol,
        /// The offending exponent.
        exponent: Rational,
    },
    /// The variable appears inside another function or power.
    #[error("`{var}` occurs inside `{atom}`")]
    NestedVariable {
        /// Integration variable.
        var: Symbol,
        /// The atom containing it.
        atom: Expr,
    },
    /// An exponential whose argument is not quadratic in the variable.
    #[error("exponent `{arg}` is not a Gaussian in `{var}`")]
    NonGaussian {
        /// Integration variable.
        var: Symbol,
        /// The exponential argument.
        arg: Expr,
    },
    /// A Gaussian width that is not a sum of positive terms.
    #[error("Gaussian width `{0}` is not positive")]
    NonPositiveGaussian(Expr),
}

/// Computes `∫₋₁¹ expr d(var)` in closed form.
///
/// # Errors
///
/// Returns an error if a term of the expanded integrand is not a polynomial in
/// `var` times a centred Gaussian.
pub fn integrate_unit_interval(expr: &Expr, var: &Symbol) -> Result<Expr, IntegrateError> {
    let integrand = NormalForm::from_expr(expr);
    integrate_normal_form(&integrand, var).map(|nf| nf.to_expr())
}

/// [`integrate_unit_interval`] on an already expanded integrand.
///
/// # Errors
///
/// See [`integrate_unit_interval`].
pub fn integrate_normal_form(
    integrand: &NormalForm,
    var: &Symbol,
) -> Result<NormalForm, IntegrateError> {
    let atom = Expr::from(var.clone());
    let mut moments: FxHashMap<NormalForm, MomentTable> = FxHashMap::default();
    let mut total = NormalForm::zero();

    for (monomial, coeff) in integrand.terms() {
        let (power, factors) = split_power(monomial, var, &atom)?;
        let (width, rest) = split_gaussian(monomial.exp_arg(), var, &atom)?;

        let moment = if power % 2 == 1 {
            NormalForm::zero()
        } else {
            let table = match moments.entry(width.clone()) {
                std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
                std::collections::hash_map::Entry::Vacant(e) => {
                    e.insert(MomentTable::new(width)?)
                }
            };
            table.even_moment(power / 2)
        };
        if moment.is_zero() {
            continue;
        }

        let outer = NormalForm::term(
            coeff.clone(),
            Monomial::with_parts(monomial.radical().clone(), factors, rest),
        );
        total = &total + &(&outer * &moment);
    }
    trace!(var = %var, terms = total.len(), "integrated over unit interval");
    Ok(total)
}

/// Splits off `var^n`, checking that the other factors are free of `var`.
fn split_power(
    monomial: &Monomial,
    var: &Symbol,
    atom: &Expr,
) -> Result<(u32, BTreeMap<Expr, Rational>), IntegrateError> {
    let mut power = 0;
    let mut factors = BTreeMap::new();
    for (a, e) in monomial.factors() {
        if a == atom {
            power = e
                .to_i64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| IntegrateError::NonPolynomial {
                    var: var.clone(),
                    exponent: e.clone(),
                })?;
        } else if a.contains_symbol(var) {
            return Err(IntegrateError::NestedVariable {
                var: var.clone(),
                atom: a.clone(),
            });
        } else {
            factors.insert(a.clone(), e.clone());
        }
    }
    Ok((power, factors))
}

/// Splits an exponential argument as `-A·var² + rest`.
fn split_gaussian(
    arg: &NormalForm,
    var: &Symbol,
    atom: &Expr,
) -> Result<(NormalForm, NormalForm), IntegrateError> {
    let mut width = NormalForm::zero();
    let mut rest = NormalForm::zero();
    let non_gaussian = || IntegrateError::NonGaussian {
        var: var.clone(),
        arg: arg.to_expr(),
    };

    for (monomial, coeff) in arg.terms() {
        if !monomial.contains_symbol(var) {
            rest.push_term(coeff.clone(), monomial.clone());
            continue;
        }
        if monomial.exponent_of(atom) != Rational::from(2) || monomial.exp_arg().contains_symbol(var) {
            return Err(non_gaussian());
        }
        let mut factors = monomial.factors().clone();
        factors.remove(atom);
        if factors.keys().any(|a| a.contains_symbol(var)) {
            return Err(non_gaussian());
        }
        width.push_term(
            -coeff,
            Monomial::with_parts(monomial.radical().clone(), factors, monomial.exp_arg().clone()),
        );
    }
    Ok((width, rest))
}

/// Even moments `∫₋₁¹ x^{2j} e^(-A x²) dx` for one width `A`.
struct MomentTable {
    width: NormalForm,
    inverse: NormalForm,
    boundary: NormalForm,
    even: Vec<NormalForm>,
}

impl MomentTable {
    fn new(width: NormalForm) -> Result<Self, IntegrateError> {
        if width.is_zero() {
            return Ok(Self {
                width,
                inverse: NormalForm::zero(),
                boundary: NormalForm::zero(),
                even: Vec::new(),
            });
        }
        if width.terms().any(|(_, c)| !c.is_positive()) {
            return Err(IntegrateError::NonPositiveGaussian(width.to_expr()));
        }
        let half = Rational::from_i64(1, 2);
        // erf(s)/s is even in s, so any square root of A will do
        let root = width.pow_branch(&half);
        let inverse = width.pow_rational(&-Rational::one());
        // sqrt(π) A^{-1/2} erf(A^{1/2})
        let erf = NormalForm::from_expr(&root.to_expr().erf());
        let first = &(&NormalForm::atom_pow(Expr::pi(), half.clone()) * &root.pow_rational(&-Rational::one()))
            * &erf;
        let boundary = &(-&width).exp() * &inverse;
        Ok(Self {
            width,
            inverse,
            boundary,
            even: vec![first],
        })
    }

    fn even_moment(&mut self, j: u32) -> NormalForm {
        if self.width.is_zero() {
            return NormalForm::constant(Rational::from_i64(2, i64::from(2 * j + 1)));
        }
        while self.even.len() <= j as usize {
            let i = self.even.len();
            let previous = &self.even[i - 1];
            let odd = i64::try_from(2 * i - 1).unwrap_or(i64::MAX);
            let factor = Rational::from_i64(odd, 2);
            let next = &(&self.inverse * previous).scale(&factor) - &self.boundary;
            self.even.push(next);
        }
        self.even[j as usize].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipsym_core::{expand, Bindings};

    fn mu() -> Expr {
        Expr::symbol("mu")
    }

    fn var() -> Symbol {
        Symbol::new("mu")
    }

    #[test]
    fn test_polynomial_moments() {
        let r = integrate_unit_interval(&Expr::one(), &var()).unwrap();
        assert_eq!(r, Expr::integer(2));
        let r = integrate_unit_interval(&mu(), &var()).unwrap();
        assert!(r.is_zero());
        let r = integrate_unit_interval(&mu().powi(4), &var()).unwrap();
        assert_eq!(r, Expr::rational(2, 5));
    }

    #[test]
    fn test_legendre_orthogonality() {
        // ∫ P_2(mu)^2 = 2/5
        let p2 = Expr::rational(3, 2) * mu().powi(2) - Expr::rational(1, 2);
        let r = integrate_unit_interval(&(p2.clone() * p2), &var()).unwrap();
        assert_eq!(r, Expr::rational(2, 5));
        // ∫ P_1 P_3 = 0
        let p3 = Expr::rational(5, 2) * mu().powi(3) - Expr::rational(3, 2) * mu();
        assert!(integrate_unit_interval(&(mu() * p3), &var()).unwrap().is_zero());
    }

    #[test]
    fn test_outer_factors_are_kept() {
        // ∫ 100 mu^2 / k dmu = 200/(3k)
        let k = Expr::symbol("k");
        let e = Expr::integer(100) * mu().powi(2) / k.clone();
        let r = integrate_unit_interval(&e, &var()).unwrap();
        assert_eq!(r, expand(&(Expr::rational(200, 3) / k)));
    }

    #[test]
    fn test_gaussian_zeroth_moment() {
        // ∫ exp(-(k s mu)^2) dmu = sqrt(pi) erf(k s) / (k s)
        let k = Expr::symbol("k");
        let s = Expr::symbol("s");
        let e = (-(k.clone() * s.clone() * mu()).powi(2)).exp();
        let r = integrate_unit_interval(&e, &var()).unwrap();
        let ks = k * s;
        let expected = Expr::pi().sqrt() * ks.clone().erf() / ks;
        assert_eq!(r, expand(&expected));
    }

    #[test]
    fn test_gaussian_moments_match_quadrature() {
        let a = 0.7_f64;
        let k = Expr::symbol("k");
        for n in [0_i64, 2, 4, 6] {
            let e = mu().powi(n) * (-(k.clone() * mu()).powi(2)).exp();
            let r = integrate_unit_interval(&e, &var()).unwrap();
            let value = r.eval(&Bindings::new().with("k", a)).unwrap();
            let n = i32::try_from(n).unwrap();
            let quad = crate::integrate_gk31(&|x: f64| x.powi(n) * (-(a * x).powi(2)).exp(), -1.0, 1.0);
            assert!((value - quad.value).abs() < 1e-12, "n={n}: {value} vs {}", quad.value);
        }
    }

    #[test]
    fn test_gaussian_width_root_has_no_absolute_values() {
        // A = k² s² / 2 gives erf(sqrt(2) k s / 2)
        let k = Expr::symbol("k");
        let s = Expr::symbol("s");
        let e = (Expr::rational(-1, 2) * (k.clone() * s.clone() * mu()).powi(2)).exp();
        let r = integrate_unit_interval(&e, &var()).unwrap();
        let arg = Expr::mul([Expr::rational(1, 2), Expr::integer(2).sqrt(), k.clone(), s.clone()]);
        let expected = Expr::pi().sqrt() * arg.clone().erf() / arg;
        assert_eq!(r, expand(&expected));
        // the value is the same for either sign of k
        let b = Bindings::new().with("k", -0.9).with("s", 1.2);
        let quad = crate::integrate_gk31(&|x: f64| (-0.5 * (0.9 * 1.2 * x).powi(2)).exp(), -1.0, 1.0);
        assert!((r.eval(&b).unwrap() - quad.value).abs() < 1e-12);
    }

    #[test]
    fn test_root_of_square_is_rejected() {
        let e = mu().powi(2).sqrt();
        let err = integrate_unit_interval(&e, &var()).unwrap_err();
        assert!(matches!(err, IntegrateError::NestedVariable { .. }));
    }

    #[test]
    fn test_rest_of_exponent_survives() {
        // exp(-(mu1^2 + mu2^2)) integrated over mu1 keeps exp(-mu2^2)
        let mu1 = Expr::symbol("mu1");
        let mu2 = Expr::symbol("mu2");
        let e = (-(mu1.powi(2) + mu2.clone().powi(2))).exp();
        let r = integrate_unit_interval(&e, &Symbol::new("mu1")).unwrap();
        assert!(r.contains_symbol(&Symbol::new("mu2")));
        assert!(!r.contains_symbol(&Symbol::new("mu1")));
        let expected = Expr::pi().sqrt() * Expr::one().erf() * (-mu2.powi(2)).exp();
        assert_eq!(r, expand(&expected));
    }

    #[test]
    fn test_unsupported_integrands() {
        let err = integrate_unit_interval(&mu().recip(), &var()).unwrap_err();
        assert!(matches!(err, IntegrateError::NonPolynomial { .. }));
        let err = integrate_unit_interval(&mu().cos(), &var()).unwrap_err();
        assert!(matches!(err, IntegrateError::NestedVariable { .. }));
        let err = integrate_unit_interval(&mu().exp(), &var()).unwrap_err();
        assert!(matches!(err, IntegrateError::NonGaussian { .. }));
        let err = integrate_unit_interval(&mu().powi(2).exp(), &var()).unwrap_err();
        assert!(matches!(err, IntegrateError::NonPositiveGaussian(_)));
    }
}

//! Rewriting special functions into elementary ones.
//!
//! `legendre`, `assoc_legendre`, `ynm` and `ynm_c` nodes are replaced by
//! explicit polynomials in their argument, with exact coefficients taken
//! from `flipsym-special-func`. Spherical harmonics are only expanded on
//! azimuths that are integer multiples of π, where they are real.

use flipsym_integers::{Integer, Rational};
use flipsym_special_func::{
    assoc_legendre_coefficients, legendre_coefficients, ynm_norm_squared, Surd,
};
use num_traits::{One, Zero};
use thiserror::Error;

use crate::expr::{Expr, ExprNode, Func};
use crate::normal::NormalForm;

/// Errors from [`expand_func`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// A degree argument is not a non-negative integer literal.
    #[error("degree of {func} must be a non-negative integer, got {arg}")]
    NonIntegerDegree {
        /// Function name.
        func: &'static str,
        /// The offending argument.
        arg: Expr,
    },
    /// An order argument is not an integer literal.
    #[error("order of {func} must be an integer, got {arg}")]
    NonIntegerOrder {
        /// Function name.
        func: &'static str,
        /// The offending argument.
        arg: Expr,
    },
    /// The azimuth is not a multiple of π, so the harmonic is complex.
    #[error("spherical harmonic at azimuth {0} is not real")]
    ComplexAzimuth(Expr),
    /// A power with a zero base and a negative exponent.
    #[error("division by zero in {0}")]
    DivisionByZero(Expr),
    /// A function node with the wrong number of arguments.
    #[error("{func} expects {expected} arguments, got {got}")]
    Arity {
        /// Function name.
        func: &'static str,
        /// Expected argument count.
        expected: usize,
        /// Actual argument count.
        got: usize,
    },
}

/// Expands every special-function node in `expr`.
///
/// # Errors
///
/// Returns an error if a degree or order is not an integer literal, a
/// spherical harmonic has an azimuth that is not a multiple of π, or some
/// denominator is zero.
pub fn expand_func(expr: &Expr) -> Result<Expr, ExpandError> {
    expr.map_nodes(&mut |node| match node.node() {
        ExprNode::Function { func, args } => expand_node(*func, args),
        ExprNode::Pow { base, exp } if is_pole(base, exp) => {
            Err(ExpandError::DivisionByZero(node.clone()))
        }
        _ => Ok(None),
    })
}

fn is_pole(base: &Expr, exp: &Expr) -> bool {
    let negative = exp.as_number().map_or_else(
        || NormalForm::from_expr(exp).as_constant().is_some_and(|e| e.is_negative()),
        Rational::is_negative,
    );
    negative && (base.is_zero() || NormalForm::from_expr(base).is_zero())
}

fn expand_node(func: Func, args: &[Expr]) -> Result<Option<Expr>, ExpandError> {
    match func {
        Func::Legendre => {
            check_arity(func, args)?;
            let l = degree(func, &args[0])?;
            Ok(Some(legendre_polynomial(l, &args[1])))
        }
        Func::AssocLegendre => {
            check_arity(func, args)?;
            let l = degree(func, &args[0])?;
            let m = order(func, &args[1])?;
            Ok(Some(assoc_legendre_function(l, m, &args[2])))
        }
        Func::Ynm | Func::YnmConj => {
            check_arity(func, args)?;
            let l = degree(func, &args[0])?;
            let m = order(func, &args[1])?;
            spherical_harmonic(l, m, &args[2], &args[3]).map(Some)
        }
        Func::Sin | Func::Cos | Func::Exp | Func::Erf => Ok(None),
    }
}

fn check_arity(func: Func, args: &[Expr]) -> Result<(), ExpandError> {
    if args.len() == func.arity() {
        Ok(())
    } else {
        Err(ExpandError::Arity {
            func: func.name(),
            expected: func.arity(),
            got: args.len(),
        })
    }
}

fn degree(func: Func, arg: &Expr) -> Result<u32, ExpandError> {
    arg.as_number()
        .and_then(Rational::to_i64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ExpandError::NonIntegerDegree {
            func: func.name(),
            arg: arg.clone(),
        })
}

fn order(func: Func, arg: &Expr) -> Result<i32, ExpandError> {
    arg.as_number()
        .and_then(Rational::to_i64)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| ExpandError::NonIntegerOrder {
            func: func.name(),
            arg: arg.clone(),
        })
}

#[allow(clippy::cast_possible_wrap)]
fn polynomial(coeffs: &[Rational], x: &Expr) -> Expr {
    Expr::add(coeffs.iter().enumerate().filter(|(_, c)| !c.is_zero()).map(|(power, c)| {
        Expr::number(c.clone()) * x.clone().powi(power as i64)
    }))
}

/// The Legendre polynomial P_l(x) with exact coefficients.
#[must_use]
pub fn legendre_polynomial(l: u32, x: &Expr) -> Expr {
    polynomial(&legendre_coefficients(l), x)
}

/// P_l^m(x) with the Condon-Shortley phase.
///
/// When `x` is `±cos(t)` the factor `(1 - x²)^(1/2)` is written as `sin(t)`,
/// which holds for polar angles in `[0, π]`.
#[must_use]
pub fn assoc_legendre_function(l: u32, m: i32, x: &Expr) -> Expr {
    let order = m.unsigned_abs();
    if order > l {
        return Expr::zero();
    }
    let sine = match polar_angle(x) {
        Some(t) => t.sin(),
        None => (Expr::one() - x.clone().powi(2)).sqrt(),
    };
    let positive = assoc_legendre_with_sine(l, order, x, &sine);
    if m >= 0 {
        return positive;
    }
    // P_l^{-m} = (-1)^m (l-m)!/(l+m)! P_l^m
    let ratio = Rational::new(Integer::factorial(l - order), Integer::factorial(l + order));
    let ratio = if order % 2 == 0 { ratio } else { -ratio };
    Expr::number(ratio) * positive
}

fn polar_angle(x: &Expr) -> Option<Expr> {
    match x.node() {
        ExprNode::Function {
            func: Func::Cos,
            args,
        } => args.first().cloned(),
        ExprNode::Mul(_) => {
            let (c, rest) = x.split_coefficient();
            if c == -Rational::one() {
                polar_angle(&rest)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// `P_l^order(x)` for `order <= l`, with `sine` standing for `(1 - x²)^(1/2)`.
fn assoc_legendre_with_sine(l: u32, order: u32, x: &Expr, sine: &Expr) -> Expr {
    polynomial(&assoc_legendre_coefficients(l, order), x) * sine.clone().powi(i64::from(order))
}

/// Writes a surd as an expression.
#[must_use]
pub fn surd_to_expr(surd: &Surd) -> Expr {
    Expr::number(surd.coeff().clone())
        * Expr::number(Rational::from_integer(surd.radicand().clone())).sqrt()
}

/// Y_l^m(θ, φ) for `φ = nπ`, where it equals its own conjugate.
fn spherical_harmonic(l: u32, m: i32, theta: &Expr, phi: &Expr) -> Result<Expr, ExpandError> {
    let order = m.unsigned_abs();
    if order > l {
        return Ok(Expr::zero());
    }
    let (turns, rest) = NormalForm::from_expr(phi).split_pi();
    let turns = match turns.to_integer() {
        Some(n) if rest.is_zero() => n,
        _ => return Err(ExpandError::ComplexAzimuth(phi.clone())),
    };

    // e^{i|m|nπ} = (-1)^{|m|n}, and Y_l^{-m} = (-1)^m conj(Y_l^m)
    let mut odd = order % 2 == 1 && !turns.is_even();
    if m < 0 && order % 2 == 1 {
        odd = !odd;
    }
    let sign = if odd { -Rational::one() } else { Rational::one() };

    let Some(norm) = Surd::sqrt_of(&ynm_norm_squared(l, order)) else {
        return Ok(Expr::zero());
    };
    let legendre = assoc_legendre_with_sine(l, order, &theta.clone().cos(), &theta.clone().sin());
    Ok(Expr::mul([
        Expr::number(sign),
        surd_to_expr(&norm),
        Expr::pi().powi(-1).sqrt(),
        legendre,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normal::expand;

    fn x() -> Expr {
        Expr::symbol("x")
    }

    fn t() -> Expr {
        Expr::symbol("t")
    }

    #[test]
    fn test_legendre_expansion() {
        // P_2(x) = (3x^2 - 1)/2
        let p2 = expand_func(&Expr::legendre(2, x())).unwrap();
        let expected = Expr::rational(3, 2) * x().powi(2) - Expr::rational(1, 2);
        assert_eq!(expand(&p2), expand(&expected));
    }

    #[test]
    fn test_assoc_legendre_uses_sine() {
        // P_1^1(cos t) = -sin t
        let p = expand_func(&Expr::assoc_legendre(1, 1, t().cos())).unwrap();
        assert_eq!(expand(&p), -t().sin());
        // P_1^{-1}(cos t) = sin(t)/2
        let p = expand_func(&Expr::assoc_legendre(1, -1, t().cos())).unwrap();
        assert_eq!(expand(&p), Expr::rational(1, 2) * t().sin());
        assert!(expand_func(&Expr::assoc_legendre(1, 2, x())).unwrap().is_zero());
    }

    #[test]
    fn test_assoc_legendre_generic_argument() {
        // P_1^1(x) = -(1 - x^2)^(1/2)
        let p = expand_func(&Expr::assoc_legendre(1, 1, x())).unwrap();
        let expected = -(Expr::one() - x().powi(2)).sqrt();
        assert_eq!(expand(&p), expand(&expected));
    }

    #[test]
    fn test_ynm_values() {
        let zero = Expr::zero();
        // Y_0^0 = 1/(2 sqrt(pi))
        let y00 = expand_func(&Expr::ynm(0, 0, t(), zero.clone())).unwrap();
        let expected = Expr::rational(1, 2) * Expr::pi().powi(-1).sqrt();
        assert_eq!(expand(&y00), expand(&expected));

        // Y_1^1(t, 0) = -sqrt(3/(8 pi)) sin t, Y_1^{-1}(t, 0) = sqrt(3/(8 pi)) sin t
        let y11 = expand(&expand_func(&Expr::ynm(1, 1, t(), zero.clone())).unwrap());
        let y1m = expand(&expand_func(&Expr::ynm_conj(1, -1, t(), zero)).unwrap());
        assert_eq!(y11, expand(&-y1m.clone()));
        let coeff = Expr::rational(1, 4) * Expr::integer(6).sqrt();
        let expected = coeff * Expr::pi().powi(-1).sqrt() * t().sin();
        assert_eq!(y1m, expand(&expected));
    }

    #[test]
    fn test_ynm_at_pi_azimuth_flips_odd_orders() {
        let at_zero = expand_func(&Expr::ynm(2, 1, t(), Expr::zero())).unwrap();
        let at_pi = expand_func(&Expr::ynm(2, 1, t(), Expr::pi())).unwrap();
        assert_eq!(expand(&at_pi), expand(&-at_zero));
    }

    #[test]
    fn test_zero_denominators_are_rejected() {
        let err = expand_func(&(x() / Expr::zero())).unwrap_err();
        assert!(matches!(err, ExpandError::DivisionByZero(_)));
        let err = expand_func(&Expr::pow(Expr::zero(), Expr::integer(-1))).unwrap_err();
        assert!(matches!(err, ExpandError::DivisionByZero(_)));
        // a base that only vanishes once expanded
        let hidden = (x() + Expr::one()).powi(2) - x().powi(2) - Expr::integer(2) * x() - Expr::one();
        let err = expand_func(&(Expr::one() + hidden.recip())).unwrap_err();
        assert!(err.to_string().contains("division by zero"));
        assert!(expand_func(&x().recip()).is_ok());
        assert!(expand_func(&Expr::zero().sqrt()).unwrap().is_zero());
    }

    #[test]
    fn test_ynm_rejects_complex_azimuth() {
        let err = expand_func(&Expr::ynm(1, 1, t(), Expr::symbol("phi"))).unwrap_err();
        assert!(matches!(err, ExpandError::ComplexAzimuth(_)));
        let err = expand_func(&Expr::apply(Func::Legendre, [x(), x()])).unwrap_err();
        assert!(matches!(err, ExpandError::NonIntegerDegree { .. }));
    }
}

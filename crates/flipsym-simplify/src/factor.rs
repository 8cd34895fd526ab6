//! Content and common-factor extraction.
//!
//! A normal form is split as `content · common · quotient`:
//!
//! - `content` is the rational gcd of the coefficients, signed like the
//!   leading term
//! - `common` holds the smallest exponent of every atom over all terms
//!   (absent atoms count as exponent zero, so negative powers put the sum
//!   over a common denominator), the gcd of the radicals, and the part of the
//!   exponential arguments shared by every term
//! - `quotient` is what remains
//!
//! Expanding the product gives back the input exactly.

use std::collections::{BTreeMap, BTreeSet};

use flipsym_core::{Expr, Monomial, NormalForm};
use flipsym_integers::{Integer, Rational};
use num_traits::{One, Zero};

/// The three parts of a factored sum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Factored {
    /// Numeric content.
    pub content: Rational,
    /// Monomial common to all terms.
    pub common: Monomial,
    /// The remaining sum.
    pub quotient: NormalForm,
}

impl Factored {
    /// Rebuilds `content · common · quotient` without expanding.
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        Expr::mul([
            Expr::number(self.content.clone()),
            self.common.to_expr(),
            self.quotient.to_expr(),
        ])
    }
}

/// Splits `nf` into content, common monomial and quotient.
#[must_use]
pub fn factor_parts(nf: &NormalForm) -> Factored {
    if nf.is_zero() {
        return Factored {
            content: Rational::zero(),
            common: Monomial::one(),
            quotient: NormalForm::one(),
        };
    }

    let mut content = nf
        .terms()
        .fold(Rational::zero(), |g, (_, c)| g.gcd(c));
    if nf.leading_coefficient().is_some_and(Rational::is_negative) {
        content = -content;
    }

    let atoms: BTreeSet<&Expr> = nf.terms().flat_map(|(m, _)| m.factors().keys()).collect();
    let mut common_factors = BTreeMap::new();
    for atom in atoms {
        let lowest = nf
            .terms()
            .map(|(m, _)| m.exponent_of(atom))
            .min()
            .unwrap_or_else(Rational::zero);
        if !lowest.is_zero() {
            common_factors.insert(atom.clone(), lowest);
        }
    }

    let radical = nf
        .terms()
        .fold(Integer::zero(), |g, (m, _)| g.gcd(m.radical()));
    let radical = if radical.is_zero() { Integer::one() } else { radical };

    let common_exp = shared_exponent(nf);
    let common = Monomial::with_parts(radical, common_factors, common_exp);

    let mut quotient = NormalForm::zero();
    for (m, c) in nf.terms() {
        let factors = m
            .factors()
            .iter()
            .map(|(a, e)| (a.clone(), e - &common.exponent_of(a)))
            .chain(
                common
                    .factors()
                    .iter()
                    .filter(|(a, _)| !m.factors().contains_key(*a))
                    .map(|(a, e)| (a.clone(), -e.clone())),
            )
            .collect();
        let radical = m.radical().clone() / common.radical().clone();
        let exp_arg = m.exp_arg() - common.exp_arg();
        quotient.push_term(c / &content, Monomial::with_parts(radical, factors, exp_arg));
    }

    Factored {
        content,
        common,
        quotient,
    }
}

/// The terms shared by the exponential arguments of every term.
fn shared_exponent(nf: &NormalForm) -> NormalForm {
    let mut monomials = nf.terms().map(|(m, _)| m.exp_arg());
    let Some(first) = monomials.next() else {
        return NormalForm::zero();
    };
    let rest: Vec<&NormalForm> = monomials.collect();
    let mut shared = NormalForm::zero();
    for (m, c) in first.terms() {
        if rest.iter().all(|other| &other.coefficient(m) == c) {
            shared.push_term(c.clone(), m.clone());
        }
    }
    shared
}

/// Factored form of `nf`; single terms are returned as they are.
#[must_use]
pub fn factor(nf: &NormalForm) -> Expr {
    if nf.len() < 2 {
        return nf.to_expr();
    }
    factor_parts(nf).to_expr()
}

/// [`factor`] on an expression.
#[must_use]
pub fn factor_expr(expr: &Expr) -> Expr {
    factor(&NormalForm::from_expr(expr))
}

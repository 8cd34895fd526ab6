//! Expanded normal form.
//!
//! A [`NormalForm`] is a fully distributed sum of monomials with exact
//! rational coefficients. Each [`Monomial`] carries
//!
//! - a squarefree integer `radical`, standing for `sqrt(radical)`
//! - atom factors (symbols, π, canonical `cos`/`sin`/`erf` calls, opaque
//!   powers) with rational exponents
//! - a single exponential `exp(exp_arg)`
//!
//! Two expressions that are equal as polynomials in their atoms have equal
//! normal forms, and `NormalForm::from_expr(&nf.to_expr()) == nf`. The
//! simplifier leans on both facts for its fixed-point test.

use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

use flipsym_integers::{Integer, Rational};
use num_traits::{One, Zero};

use crate::expr::{is_even, is_positive_constant, powers_compose, Constant, Expr, ExprNode, Func};
use crate::symbol::Symbol;
use crate::trig::{canonical_erf, canonical_trig, TrigKind};

/// A product of atoms, a square root of a squarefree integer and one
/// exponential, without a numeric coefficient.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Monomial {
    radical: Integer,
    factors: BTreeMap<Expr, Rational>,
    exp_arg: NormalForm,
}

impl Monomial {
    /// The empty monomial 1.
    #[must_use]
    pub fn one() -> Self {
        Self {
            radical: Integer::one(),
            factors: BTreeMap::new(),
            exp_arg: NormalForm::zero(),
        }
    }

    /// A single atom raised to `exponent`.
    #[must_use]
    pub fn atom(atom: Expr, exponent: Rational) -> Self {
        let mut m = Self::one();
        if !exponent.is_zero() {
            m.factors.insert(atom, exponent);
        }
        m
    }

    /// Returns true for the empty monomial.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.radical.is_one() && self.factors.is_empty() && self.exp_arg.is_zero()
    }

    /// The squarefree radicand (1 when there is no root).
    #[must_use]
    pub fn radical(&self) -> &Integer {
        &self.radical
    }

    /// Atom factors and their exponents.
    #[must_use]
    pub fn factors(&self) -> &BTreeMap<Expr, Rational> {
        &self.factors
    }

    /// Argument of the exponential factor (zero when absent).
    #[must_use]
    pub fn exp_arg(&self) -> &NormalForm {
        &self.exp_arg
    }

    /// Exponent of `atom` in this monomial (zero when absent).
    #[must_use]
    pub fn exponent_of(&self, atom: &Expr) -> Rational {
        self.factors.get(atom).cloned().unwrap_or_else(Rational::zero)
    }

    /// Returns a copy with the given parts replaced.
    #[must_use]
    pub fn with_parts(
        radical: Integer,
        factors: BTreeMap<Expr, Rational>,
        exp_arg: NormalForm,
    ) -> Self {
        Self {
            radical,
            factors: factors.into_iter().filter(|(_, e)| !e.is_zero()).collect(),
            exp_arg,
        }
    }

    /// Product of two monomials, with the numeric factor split off.
    ///
    /// `sqrt(a) sqrt(b) = g sqrt((a/g)(b/g))` with `g = gcd(a, b)`.
    #[must_use]
    pub fn mul(&self, other: &Self) -> (Rational, Monomial) {
        let g = self.radical.gcd(&other.radical);
        let radical = (self.radical.clone() / g.clone()) * (other.radical.clone() / g.clone());
        let mut coeff = Rational::from_integer(g);

        let mut factors = self.factors.clone();
        for (atom, e) in &other.factors {
            let slot = factors.entry(atom.clone()).or_insert_with(Rational::zero);
            *slot = slot.clone() + e;
        }
        factors.retain(|_, e| !e.is_zero());

        // Number atoms whose exponents became integral fold into the coefficient.
        let integral: Vec<Expr> = factors
            .iter()
            .filter(|(atom, e)| atom.is_number() && !atom.is_zero() && e.is_integer())
            .map(|(atom, _)| atom.clone())
            .collect();
        for atom in integral {
            if let (Some(base), Some(e)) = (atom.as_number(), factors.remove(&atom)) {
                if let Some(n) = e.to_i64() {
                    coeff = coeff * base.powi(n);
                }
            }
        }

        let exp_arg = &self.exp_arg + &other.exp_arg;
        (
            coeff,
            Monomial {
                radical,
                factors,
                exp_arg,
            },
        )
    }

    /// Rebuilds the monomial as an expression.
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        let mut parts = Vec::with_capacity(self.factors.len() + 2);
        if !self.radical.is_one() {
            parts.push(Expr::number(Rational::from_integer(self.radical.clone())).sqrt());
        }
        for (atom, e) in &self.factors {
            parts.push(Expr::pow(atom.clone(), Expr::number(e.clone())));
        }
        if !self.exp_arg.is_zero() {
            parts.push(self.exp_arg.to_expr().exp());
        }
        Expr::mul(parts)
    }

    /// Returns true if `symbol` occurs in any factor or in the exponential.
    #[must_use]
    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        self.factors.keys().any(|a| a.contains_symbol(symbol)) || self.exp_arg.contains_symbol(symbol)
    }
}

/// A fully expanded sum of monomials with exact coefficients.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalForm {
    terms: BTreeMap<Monomial, Rational>,
}

impl NormalForm {
    /// The zero polynomial.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// The constant 1.
    #[must_use]
    pub fn one() -> Self {
        Self::constant(Rational::one())
    }

    /// A constant.
    #[must_use]
    pub fn constant(value: Rational) -> Self {
        Self::term(value, Monomial::one())
    }

    /// A single term `coeff * monomial`.
    #[must_use]
    pub fn term(coeff: Rational, monomial: Monomial) -> Self {
        let mut nf = Self::zero();
        nf.push_term(coeff, monomial);
        nf
    }

    /// A single atom to the first power.
    #[must_use]
    pub fn atom(atom: Expr) -> Self {
        Self::term(Rational::one(), Monomial::atom(atom, Rational::one()))
    }

    /// `atom^exponent` kept opaque.
    #[must_use]
    pub fn atom_pow(atom: Expr, exponent: Rational) -> Self {
        Self::term(Rational::one(), Monomial::atom(atom, exponent))
    }

    /// Returns true for the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true if there are no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterates over `(monomial, coefficient)` pairs in canonical order.
    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &Rational)> {
        self.terms.iter()
    }

    /// The value if this is a constant.
    #[must_use]
    pub fn as_constant(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::zero()),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(m, _)| m.is_one())
                .map(|(_, c)| c.clone()),
            _ => None,
        }
    }

    /// Coefficient of the first term in canonical order.
    #[must_use]
    pub fn leading_coefficient(&self) -> Option<&Rational> {
        self.terms.values().next()
    }

    /// Coefficient of `monomial` (zero when absent).
    #[must_use]
    pub fn coefficient(&self, monomial: &Monomial) -> Rational {
        self.terms.get(monomial).cloned().unwrap_or_else(Rational::zero)
    }

    /// Returns true if `symbol` occurs anywhere.
    #[must_use]
    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        self.terms.keys().any(|m| m.contains_symbol(symbol))
    }

    /// Adds `coeff * monomial` in place.
    pub fn push_term(&mut self, coeff: Rational, monomial: Monomial) {
        if coeff.is_zero() {
            return;
        }
        match self.terms.get_mut(&monomial) {
            Some(slot) => {
                *slot = slot.clone() + coeff;
                if slot.is_zero() {
                    self.terms.remove(&monomial);
                }
            }
            None => {
                self.terms.insert(monomial, coeff);
            }
        }
    }

    /// Multiplies every coefficient by `factor`.
    #[must_use]
    pub fn scale(&self, factor: &Rational) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
    }

    /// `self^n` by repeated squaring.
    #[must_use]
    pub fn pow_int(&self, n: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        let mut n = n;
        while n > 0 {
            if n & 1 == 1 {
                result = &result * &base;
            }
            n >>= 1;
            if n > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// `self^e` for a rational exponent.
    ///
    /// Symbols are real and may be negative, so a fractional power only
    /// distributes where that holds for every sign: over positive constants,
    /// radicals and exponentials, over even powers whose new exponent stays
    /// even, and onto a lone factor with exponent in `(-1, 1]`. The rest of
    /// the term is kept as one opaque power. Sums are expanded for natural
    /// exponents and kept opaque otherwise.
    #[must_use]
    pub fn pow_rational(&self, e: &Rational) -> Self {
        self.pow_with(e, monomial_power)
    }

    /// `self^e` with the power distributed over every factor regardless of
    /// sign.
    ///
    /// The result is one branch of the power. It is only correct where the
    /// caller needs an even function of the root, e.g. `erf(s)/s` for
    /// `s = A^(1/2)`.
    #[must_use]
    pub fn pow_branch(&self, e: &Rational) -> Self {
        self.pow_with(e, distribute_power)
    }

    fn pow_with(&self, e: &Rational, single: fn(&Rational, &Monomial, &Rational) -> Self) -> Self {
        if e.is_zero() {
            return Self::one();
        }
        if let Some(c) = self.as_constant() {
            return rational_power(&c, e);
        }
        if let Some(n) = e.to_i64().filter(|n| *n > 0) {
            if let Ok(n) = u32::try_from(n) {
                return self.pow_int(n);
            }
        }
        if self.terms.len() == 1 {
            if let Some((m, c)) = self.terms.iter().next() {
                return single(c, m, e);
            }
        }
        Self::atom_pow(self.to_expr(), e.clone())
    }

    /// `exp(self)` as a single monomial.
    #[must_use]
    pub fn exp(&self) -> Self {
        if self.is_zero() {
            return Self::one();
        }
        let mut m = Monomial::one();
        m.exp_arg = self.clone();
        Self::term(Rational::one(), m)
    }

    /// Expands an expression.
    #[must_use]
    pub fn from_expr(expr: &Expr) -> Self {
        match expr.node() {
            ExprNode::Number(r) => Self::constant(r.clone()),
            ExprNode::Symbol(_) | ExprNode::Constant(_) => Self::atom(expr.clone()),
            ExprNode::Add(args) => args
                .iter()
                .fold(Self::zero(), |acc, a| &acc + &Self::from_expr(a)),
            ExprNode::Mul(args) => {
                let mut acc = Self::one();
                for a in args {
                    acc = &acc * &Self::from_expr(a);
                    if acc.is_zero() {
                        break;
                    }
                }
                acc
            }
            ExprNode::Pow { base, exp } => {
                let exp_nf = Self::from_expr(exp);
                let base_nf = Self::from_expr(base);
                match exp_nf.as_constant() {
                    Some(e) => base_nf.pow_rational(&e),
                    None => Self::atom(Expr::pow(base_nf.to_expr(), exp_nf.to_expr())),
                }
            }
            ExprNode::Function { func, args } => {
                let expanded: Vec<Self> = args.iter().map(Self::from_expr).collect();
                match (func, expanded.as_slice()) {
                    (Func::Exp, [arg]) => arg.exp(),
                    (Func::Cos, [arg]) => canonical_trig(TrigKind::Cos, arg),
                    (Func::Sin, [arg]) => canonical_trig(TrigKind::Sin, arg),
                    (Func::Erf, [arg]) => canonical_erf(arg),
                    _ => Self::atom(Expr::apply(
                        *func,
                        expanded.iter().map(NormalForm::to_expr),
                    )),
                }
            }
        }
    }

    /// Rebuilds the sum as an expression.
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        Expr::add(
            self.terms
                .iter()
                .map(|(m, c)| Expr::mul([Expr::number(c.clone()), m.to_expr()])),
        )
    }

    /// The π-linear part and the rest: `self = c·π + rest`.
    #[must_use]
    pub fn split_pi(&self) -> (Rational, NormalForm) {
        let pi = Monomial::atom(Expr::new(ExprNode::Constant(Constant::Pi)), Rational::one());
        let mut rest = self.clone();
        let c = rest.terms.remove(&pi).unwrap_or_else(Rational::zero);
        (c, rest)
    }
}

/// `r^e` for rational `r` and `e`.
///
/// Half-integer powers of positive rationals become coefficient and radical;
/// other irrational powers stay as opaque number atoms.
#[must_use]
pub fn rational_power(r: &Rational, e: &Rational) -> NormalForm {
    if let Some(n) = e.to_i64() {
        if r.is_zero() && n < 0 {
            return NormalForm::atom_pow(Expr::number(r.clone()), e.clone());
        }
        return NormalForm::constant(r.powi(n));
    }
    if r.is_zero() {
        return if e.is_positive() {
            NormalForm::zero()
        } else {
            NormalForm::atom_pow(Expr::zero(), e.clone())
        };
    }
    if r.is_positive() && e.denominator() == Integer::new(2) {
        if let Some(p) = e.numerator().to_i64() {
            let v = r.powi(p);
            let den = v.denominator();
            if let Some((square, free)) = (v.numerator() * den.clone()).split_square() {
                let mut m = Monomial::one();
                m.radical = free;
                return NormalForm::term(Rational::new(square, den), m);
            }
        }
    }
    NormalForm::atom_pow(Expr::number(r.clone()), e.clone())
}

/// `(c·m)^e` distributed over every factor.
fn distribute_power(coeff: &Rational, m: &Monomial, e: &Rational) -> NormalForm {
    let mut result = rational_power(coeff, e);
    if !m.radical.is_one() {
        let half = e * &Rational::from_i64(1, 2);
        result = &result * &rational_power(&Rational::from_integer(m.radical.clone()), &half);
    }
    let mut rest = Monomial::one();
    rest.factors = m.factors.iter().map(|(a, x)| (a.clone(), x * e)).collect();
    rest.exp_arg = m.exp_arg.scale(e);
    &result * &NormalForm::term(Rational::one(), rest)
}

/// `(c·m)^e`, distributing only where the identity holds for real atoms.
fn monomial_power(coeff: &Rational, m: &Monomial, e: &Rational) -> NormalForm {
    if e.is_integer() {
        return distribute_power(coeff, m, e);
    }
    let mut result = NormalForm::one();
    if !m.radical.is_one() {
        let half = e * &Rational::from_i64(1, 2);
        result = rational_power(&Rational::from_integer(m.radical.clone()), &half);
    }
    let mut rest = Monomial::one();
    rest.exp_arg = m.exp_arg.scale(e);

    // Factors of unknown sign, powered together.
    let mut signed = Monomial::one();
    for (atom, a) in &m.factors {
        if is_positive_constant(atom) || (is_even(a) && is_even(&(a * e))) {
            push_factor(&mut rest, atom.clone(), a * e);
        } else if is_even(a) {
            // |x|^(ae), kept as (x^a)^e
            push_factor(&mut rest, Expr::pow(atom.clone(), Expr::number(a.clone())), e.clone());
        } else {
            signed.factors.insert(atom.clone(), a.clone());
        }
    }

    let single = match signed.factors.iter().next() {
        Some((atom, a)) if signed.factors.len() == 1 && powers_compose(a, e) => Some((atom.clone(), a * e)),
        _ => None,
    };
    if signed.factors.is_empty() {
        result = &result * &rational_power(coeff, e);
    } else if let (Some((atom, ae)), false) = (single, coeff.is_negative()) {
        result = &result * &rational_power(coeff, e);
        push_factor(&mut rest, atom, ae);
    } else {
        // (-c·S)^e = c^e (-S)^e for c > 0
        let magnitude = coeff.abs();
        let sign = if coeff.is_negative() { -Rational::one() } else { Rational::one() };
        result = &result * &rational_power(&magnitude, e);
        push_factor(&mut rest, NormalForm::term(sign, signed).to_expr(), e.clone());
    }
    &result * &NormalForm::term(Rational::one(), rest)
}

fn push_factor(m: &mut Monomial, atom: Expr, exponent: Rational) {
    let slot = m.factors.entry(atom).or_insert_with(Rational::zero);
    *slot = slot.clone() + exponent;
    m.factors.retain(|_, e| !e.is_zero());
}

/// Opaque powers whose exponent became an integer, which must be expanded
/// again to stay canonical.
fn needs_settling(m: &Monomial) -> bool {
    m.factors.iter().any(|(atom, e)| {
        e.is_integer()
            && match atom.node() {
                ExprNode::Pow { exp, .. } => exp.is_number(),
                ExprNode::Mul(_) => true,
                _ => false,
            }
    })
}

impl Add for &NormalForm {
    type Output = NormalForm;

    fn add(self, rhs: Self) -> NormalForm {
        let (mut acc, other) = if self.terms.len() >= rhs.terms.len() {
            (self.clone(), rhs)
        } else {
            (rhs.clone(), self)
        };
        for (m, c) in &other.terms {
            acc.push_term(c.clone(), m.clone());
        }
        acc
    }
}

impl Sub for &NormalForm {
    type Output = NormalForm;

    fn sub(self, rhs: Self) -> NormalForm {
        self + &(-rhs)
    }
}

impl Neg for &NormalForm {
    type Output = NormalForm;

    fn neg(self) -> NormalForm {
        self.scale(&-Rational::one())
    }
}

impl Mul for &NormalForm {
    type Output = NormalForm;

    fn mul(self, rhs: Self) -> NormalForm {
        let mut acc = NormalForm::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &rhs.terms {
                let (k, m) = ma.mul(mb);
                if needs_settling(&m) {
                    acc = &acc + &NormalForm::from_expr(&m.to_expr()).scale(&(ca * cb * k));
                } else {
                    acc.push_term(ca * cb * k, m);
                }
            }
        }
        acc
    }
}

impl From<&Expr> for NormalForm {
    fn from(expr: &Expr) -> Self {
        Self::from_expr(expr)
    }
}

/// Expands `expr` into its canonical distributed form.
#[must_use]
pub fn expand(expr: &Expr) -> Expr {
    NormalForm::from_expr(expr).to_expr()
}

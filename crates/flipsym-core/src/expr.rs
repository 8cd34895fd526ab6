//! Expression trees.
//!
//! An [`Expr`] is an immutable, reference-counted tree. Cloning is a pointer
//! copy, so kernels and intermediate results can be shared freely between
//! worker threads. Nodes are built through smart constructors that keep a
//! light canonical form:
//!
//! - sums are flattened, numbers folded, like terms collected, zeros dropped
//! - products are flattened, numbers folded, like bases merged, ones dropped
//! - powers with trivial or numeric arguments are evaluated
//!
//! Structural equality and the total order on [`ExprNode`] are what the
//! simplifier's fixed-point test and the normal form rely on.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use flipsym_integers::{Integer, Rational};
use num_traits::{One, Zero};
use smallvec::{smallvec, SmallVec};

use crate::symbol::Symbol;

/// Argument storage for n-ary nodes.
pub type Args = SmallVec<[Expr; 4]>;

/// Named mathematical constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    /// The circle constant π.
    Pi,
}

/// Function heads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Func {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Natural exponential.
    Exp,
    /// Error function.
    Erf,
    /// Legendre polynomial `legendre(l, x)`.
    Legendre,
    /// Associated Legendre function `assoc_legendre(l, m, x)`.
    AssocLegendre,
    /// Spherical harmonic `ynm(l, m, theta, phi)`.
    Ynm,
    /// Complex conjugate of a spherical harmonic.
    YnmConj,
}

impl Func {
    /// Every function head, in declaration order.
    pub const ALL: [Func; 8] = [
        Func::Sin,
        Func::Cos,
        Func::Exp,
        Func::Erf,
        Func::Legendre,
        Func::AssocLegendre,
        Func::Ynm,
        Func::YnmConj,
    ];

    /// The name used by the printers and the parser.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Exp => "exp",
            Func::Erf => "erf",
            Func::Legendre => "legendre",
            Func::AssocLegendre => "assoc_legendre",
            Func::Ynm => "ynm",
            Func::YnmConj => "ynm_c",
        }
    }

    /// Number of arguments.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Func::Sin | Func::Cos | Func::Exp | Func::Erf => 1,
            Func::Legendre => 2,
            Func::AssocLegendre => 3,
            Func::Ynm | Func::YnmConj => 4,
        }
    }

    /// Looks a function head up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// An expression node.
///
/// Variant order defines the canonical order of sibling arguments: numbers
/// sort first, then symbols, constants, sums, products, powers, functions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExprNode {
    /// An exact rational literal.
    Number(Rational),
    /// A real variable.
    Symbol(Symbol),
    /// A named constant.
    Constant(Constant),
    /// Sum of at least two terms.
    Add(Args),
    /// Product of at least two factors; a numeric coefficient comes first.
    Mul(Args),
    /// Power expression: base^exp.
    Pow {
        /// The base of the power.
        base: Expr,
        /// The exponent.
        exp: Expr,
    },
    /// A function application.
    Function {
        /// The function head.
        func: Func,
        /// The arguments.
        args: Args,
    },
}

/// A shared, immutable expression.
#[derive(Clone)]
pub struct Expr(Arc<ExprNode>);

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for Expr {}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.0, &other.0) {
            Ordering::Equal
        } else {
            self.0.cmp(&other.0)
        }
    }
}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

impl Expr {
    /// Wraps a node without any canonicalisation.
    #[must_use]
    pub fn new(node: ExprNode) -> Self {
        Self(Arc::new(node))
    }

    /// Returns the underlying node.
    #[must_use]
    pub fn node(&self) -> &ExprNode {
        &self.0
    }

    /// A rational literal.
    #[must_use]
    pub fn number(value: impl Into<Rational>) -> Self {
        Self::new(ExprNode::Number(value.into()))
    }

    /// An integer literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::number(value)
    }

    /// The rational literal `numerator / denominator`.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn rational(numerator: i64, denominator: i64) -> Self {
        Self::number(Rational::from_i64(numerator, denominator))
    }

    /// The literal 0.
    #[must_use]
    pub fn zero() -> Self {
        Self::integer(0)
    }

    /// The literal 1.
    #[must_use]
    pub fn one() -> Self {
        Self::integer(1)
    }

    /// A symbol.
    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Self::new(ExprNode::Symbol(Symbol::new(name)))
    }

    /// The constant π.
    #[must_use]
    pub fn pi() -> Self {
        Self::new(ExprNode::Constant(Constant::Pi))
    }

    /// Canonical sum of `terms`.
    pub fn add(terms: impl IntoIterator<Item = Expr>) -> Self {
        let mut constant = Rational::zero();
        let mut collected: BTreeMap<Expr, Rational> = BTreeMap::new();
        let mut pending: Vec<Expr> = terms.into_iter().collect();
        pending.reverse();

        while let Some(term) = pending.pop() {
            match term.node() {
                ExprNode::Number(r) => constant = constant + r,
                ExprNode::Add(args) => pending.extend(args.iter().rev().cloned()),
                _ => {
                    let (coeff, rest) = term.split_coefficient();
                    let slot = collected.entry(rest).or_insert_with(Rational::zero);
                    *slot = slot.clone() + &coeff;
                }
            }
        }

        let mut args: Args = SmallVec::new();
        if !constant.is_zero() {
            args.push(Self::number(constant));
        }
        for (rest, coeff) in collected {
            if !coeff.is_zero() {
                args.push(Self::scaled(coeff, rest));
            }
        }
        match args.len() {
            0 => Self::zero(),
            1 => args.remove(0),
            _ => Self::new(ExprNode::Add(args)),
        }
    }

    /// Canonical product of `factors`.
    pub fn mul(factors: impl IntoIterator<Item = Expr>) -> Self {
        let mut coeff = Rational::one();
        let mut powers: BTreeMap<Expr, Vec<Expr>> = BTreeMap::new();
        let mut numeric_powers: Vec<Expr> = Vec::new();
        let mut pending: Vec<Expr> = factors.into_iter().collect();

        while let Some(factor) = pending.pop() {
            match factor.node() {
                ExprNode::Number(r) => {
                    if r.is_zero() {
                        return Self::zero();
                    }
                    coeff = coeff * r;
                }
                ExprNode::Mul(args) => pending.extend(args.iter().cloned()),
                // Powers of numbers stay apart so radicals are never merged.
                ExprNode::Pow { base, .. } if base.is_number() => numeric_powers.push(factor),
                ExprNode::Pow { base, exp } => {
                    powers.entry(base.clone()).or_default().push(exp.clone());
                }
                _ => powers.entry(factor).or_default().push(Self::one()),
            }
        }

        let mut args: Vec<Expr> = Vec::with_capacity(powers.len() + numeric_powers.len());
        for (base, exps) in powers {
            let merged = Self::pow(base, Self::add(exps));
            match merged.node() {
                ExprNode::Number(r) => coeff = coeff * r,
                _ => args.push(merged),
            }
        }
        if coeff.is_zero() {
            return Self::zero();
        }
        args.extend(numeric_powers);
        args.sort();

        if args.is_empty() {
            return Self::number(coeff);
        }
        if coeff.is_one() && args.len() == 1 {
            return args.remove(0);
        }
        let mut all: Args = SmallVec::with_capacity(args.len() + 1);
        if !coeff.is_one() {
            all.push(Self::number(coeff));
        }
        all.extend(args);
        Self::new(ExprNode::Mul(all))
    }

    /// Canonical power `base^exp`.
    #[must_use]
    pub fn pow(base: Expr, exp: Expr) -> Self {
        let raw = |base: &Expr, exp: &Expr| {
            Self::new(ExprNode::Pow {
                base: base.clone(),
                exp: exp.clone(),
            })
        };
        let Some(e) = exp.as_number() else {
            return raw(&base, &exp);
        };
        if e.is_zero() {
            return Self::one();
        }
        if e.is_one() {
            return base;
        }
        match base.node() {
            ExprNode::Number(b) if b.is_one() => Self::one(),
            ExprNode::Number(b) if b.is_zero() => {
                if e.is_positive() {
                    Self::zero()
                } else {
                    raw(&base, &exp)
                }
            }
            ExprNode::Number(b) => {
                if let Some(n) = e.to_i64() {
                    return Self::number(b.powi(n));
                }
                if b.is_positive() && e.denominator() == Integer::new(2) {
                    if let (Some(root), Some(n)) = (b.sqrt_exact(), e.numerator().to_i64()) {
                        return Self::number(root.powi(n));
                    }
                }
                raw(&base, &exp)
            }
            ExprNode::Pow {
                base: inner,
                exp: inner_exp,
            } => match inner_exp.as_number() {
                Some(a) if is_positive_constant(inner) || powers_compose(a, e) => {
                    Self::pow(inner.clone(), Self::number(a * e))
                }
                _ => raw(&base, &exp),
            },
            _ => raw(&base, &exp),
        }
    }

    /// `self^n` for an integer exponent.
    #[must_use]
    pub fn powi(self, n: i64) -> Self {
        Self::pow(self, Self::integer(n))
    }

    /// Square root.
    #[must_use]
    pub fn sqrt(self) -> Self {
        Self::pow(self, Self::rational(1, 2))
    }

    /// Reciprocal.
    #[must_use]
    pub fn recip(self) -> Self {
        self.powi(-1)
    }

    /// Applies a function head, folding the values at zero.
    #[must_use]
    pub fn apply(func: Func, args: impl IntoIterator<Item = Expr>) -> Self {
        let args: Args = args.into_iter().collect();
        if args.len() == 1 && args[0].is_zero() {
            match func {
                Func::Sin | Func::Erf => return Self::zero(),
                Func::Cos | Func::Exp => return Self::one(),
                _ => {}
            }
        }
        Self::new(ExprNode::Function { func, args })
    }

    /// sin(self)
    #[must_use]
    pub fn sin(self) -> Self {
        Self::apply(Func::Sin, [self])
    }

    /// cos(self)
    #[must_use]
    pub fn cos(self) -> Self {
        Self::apply(Func::Cos, [self])
    }

    /// exp(self)
    #[must_use]
    pub fn exp(self) -> Self {
        Self::apply(Func::Exp, [self])
    }

    /// erf(self)
    #[must_use]
    pub fn erf(self) -> Self {
        Self::apply(Func::Erf, [self])
    }

    /// The unexpanded Legendre polynomial P_l(x).
    #[must_use]
    pub fn legendre(l: u32, x: Expr) -> Self {
        Self::apply(Func::Legendre, [Self::number(l), x])
    }

    /// The unexpanded associated Legendre function P_l^m(x).
    #[must_use]
    pub fn assoc_legendre(l: u32, m: i32, x: Expr) -> Self {
        Self::apply(Func::AssocLegendre, [Self::number(l), Self::number(m), x])
    }

    /// The unexpanded spherical harmonic Y_l^m(theta, phi).
    #[must_use]
    pub fn ynm(l: u32, m: i32, theta: Expr, phi: Expr) -> Self {
        Self::apply(Func::Ynm, [Self::number(l), Self::number(m), theta, phi])
    }

    /// The unexpanded conjugate spherical harmonic conj(Y_l^m(theta, phi)).
    #[must_use]
    pub fn ynm_conj(l: u32, m: i32, theta: Expr, phi: Expr) -> Self {
        Self::apply(Func::YnmConj, [Self::number(l), Self::number(m), theta, phi])
    }

    /// Returns the literal value if this is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<&Rational> {
        match self.node() {
            ExprNode::Number(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the symbol if this is a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.node() {
            ExprNode::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this is a numeric literal.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self.node(), ExprNode::Number(_))
    }

    /// Returns true if this is the literal 0.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_number().is_some_and(Zero::is_zero)
    }

    /// Returns true if this is the literal 1.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.as_number().is_some_and(One::is_one)
    }

    /// Returns the children of this node.
    #[must_use]
    pub fn children(&self) -> Args {
        match self.node() {
            ExprNode::Number(_) | ExprNode::Symbol(_) | ExprNode::Constant(_) => SmallVec::new(),
            ExprNode::Add(args) | ExprNode::Mul(args) | ExprNode::Function { args, .. } => {
                args.clone()
            }
            ExprNode::Pow { base, exp } => smallvec![base.clone(), exp.clone()],
        }
    }

    /// Total number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Expr::node_count).sum::<usize>()
    }

    /// Every symbol occurring in the expression.
    #[must_use]
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        if let ExprNode::Symbol(s) = self.node() {
            out.insert(s.clone());
        }
        for child in self.children() {
            child.collect_symbols(out);
        }
    }

    /// Returns true if `symbol` occurs anywhere in the expression.
    #[must_use]
    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        match self.node() {
            ExprNode::Symbol(s) => s == symbol,
            _ => self.children().iter().any(|c| c.contains_symbol(symbol)),
        }
    }

    /// Splits a leading numeric coefficient: `3*x*y` gives `(3, x*y)`.
    #[must_use]
    pub fn split_coefficient(&self) -> (Rational, Expr) {
        if let ExprNode::Mul(args) = self.node() {
            if let Some(c) = args[0].as_number() {
                let rest: Args = args[1..].iter().cloned().collect();
                let rest = if rest.len() == 1 {
                    rest[0].clone()
                } else {
                    Self::new(ExprNode::Mul(rest))
                };
                return (c.clone(), rest);
            }
        }
        if let Some(c) = self.as_number() {
            return (c.clone(), Self::one());
        }
        (Rational::one(), self.clone())
    }

    /// Returns true if the leading numeric coefficient is negative.
    #[must_use]
    pub fn is_negative_term(&self) -> bool {
        self.split_coefficient().0.is_negative()
    }

    /// `coeff * rest` where `rest` carries no numeric coefficient.
    fn scaled(coeff: Rational, rest: Expr) -> Self {
        if coeff.is_one() {
            return rest;
        }
        if rest.is_one() {
            return Self::number(coeff);
        }
        let mut args: Args = smallvec![Self::number(coeff)];
        match rest.node() {
            ExprNode::Mul(inner) => args.extend(inner.iter().cloned()),
            _ => args.push(rest),
        }
        Self::new(ExprNode::Mul(args))
    }

    /// Rebuilds the tree bottom-up, replacing nodes for which `f` returns `Some`.
    ///
    /// Rebuilt nodes go through the smart constructors.
    pub fn map_nodes<E>(&self, f: &mut impl FnMut(&Expr) -> Result<Option<Expr>, E>) -> Result<Expr, E> {
        let rebuilt = match self.node() {
            ExprNode::Number(_) | ExprNode::Symbol(_) | ExprNode::Constant(_) => self.clone(),
            ExprNode::Add(args) => {
                Self::add(args.iter().map(|a| a.map_nodes(f)).collect::<Result<Vec<_>, E>>()?)
            }
            ExprNode::Mul(args) => {
                Self::mul(args.iter().map(|a| a.map_nodes(f)).collect::<Result<Vec<_>, E>>()?)
            }
            ExprNode::Pow { base, exp } => Self::pow(base.map_nodes(f)?, exp.map_nodes(f)?),
            ExprNode::Function { func, args } => Self::apply(
                *func,
                args.iter().map(|a| a.map_nodes(f)).collect::<Result<Vec<_>, E>>()?,
            ),
        };
        Ok(f(&rebuilt)?.unwrap_or(rebuilt))
    }
}

/// Returns true for an even integer.
pub(crate) fn is_even(r: &Rational) -> bool {
    r.to_integer().is_some_and(|n| n.is_even())
}

/// Returns true for π and positive numbers.
pub(crate) fn is_positive_constant(expr: &Expr) -> bool {
    match expr.node() {
        ExprNode::Constant(_) => true,
        ExprNode::Number(r) => r.is_positive(),
        _ => false,
    }
}

/// Whether `(x^a)^e = x^(ae)` holds for every real `x`.
///
/// True for integer `e`, for `-1 < a <= 1`, and when `a` and `ae` are both
/// even.
pub(crate) fn powers_compose(a: &Rational, e: &Rational) -> bool {
    e.is_integer()
        || (*a > -Rational::one() && *a <= Rational::one())
        || (is_even(a) && is_even(&(a * e)))
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<Rational> for Expr {
    fn from(value: Rational) -> Self {
        Self::number(value)
    }
}

impl From<Symbol> for Expr {
    fn from(value: Symbol) -> Self {
        Self::new(ExprNode::Symbol(value))
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::add([self, rhs])
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::add([self, -rhs])
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul([self, rhs])
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::mul([self, rhs.recip()])
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::mul([Expr::integer(-1), self])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::symbol("x")
    }

    fn y() -> Expr {
        Expr::symbol("y")
    }

    #[test]
    fn test_add_folds_and_collects() {
        let e = Expr::add([x(), Expr::integer(2), x(), Expr::integer(-2)]);
        assert_eq!(e, Expr::mul([Expr::integer(2), x()]));
        assert!(Expr::add([x(), -x()]).is_zero());
        assert_eq!(Expr::add(Vec::new()), Expr::zero());
    }

    #[test]
    fn test_add_is_order_independent() {
        let a = Expr::add([x(), y(), Expr::integer(3)]);
        let b = Expr::add([Expr::integer(3), y(), x()]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mul_merges_powers() {
        let e = x() * x() * y();
        assert_eq!(e, Expr::mul([x().powi(2), y()]));
        assert_eq!(x() * x().recip(), Expr::one());
        assert!((x() * Expr::zero()).is_zero());
    }

    #[test]
    fn test_mul_keeps_radicals_apart() {
        let two = Expr::integer(2).sqrt();
        let three = Expr::integer(3).sqrt();
        let e = two.clone() * three;
        assert!(matches!(e.node(), ExprNode::Mul(args) if args.len() == 2));
        // Folded only by the normal form.
        assert!(matches!((two.clone() * two).node(), ExprNode::Mul(args) if args.len() == 2));
    }

    #[test]
    fn test_pow_numeric() {
        assert_eq!(Expr::integer(4).sqrt(), Expr::integer(2));
        assert_eq!(Expr::rational(9, 4).sqrt(), Expr::rational(3, 2));
        assert_eq!(Expr::integer(2).powi(-2), Expr::rational(1, 4));
        assert!(matches!(Expr::integer(2).sqrt().node(), ExprNode::Pow { .. }));
        assert_eq!(x().powi(4).sqrt(), x().powi(2));
        assert_eq!(x().sqrt().sqrt(), Expr::pow(x(), Expr::rational(1, 4)));
        assert_eq!(Expr::pi().powi(3).sqrt(), Expr::pow(Expr::pi(), Expr::rational(3, 2)));
    }

    #[test]
    fn test_pow_keeps_sign_of_real_symbols() {
        // sqrt(x^2) = |x|, not x
        let e = x().powi(2).sqrt();
        assert!(matches!(e.node(), ExprNode::Pow { base, .. } if *base == x().powi(2)));
        assert_ne!(x().recip().sqrt(), x().sqrt().recip());
        assert_eq!(x().powi(2).sqrt().powi(2), x().powi(2));
    }

    #[test]
    fn test_apply_folds_zero() {
        assert!(Expr::zero().sin().is_zero());
        assert!(Expr::zero().cos().is_one());
        assert!(Expr::zero().exp().is_one());
        assert!(Expr::zero().erf().is_zero());
        assert!(!x().cos().is_one());
    }

    #[test]
    fn test_split_coefficient() {
        let e = Expr::mul([Expr::integer(-3), x(), y()]);
        let (c, rest) = e.split_coefficient();
        assert_eq!(c, Rational::from(-3));
        assert_eq!(rest, x() * y());
        assert!(e.is_negative_term());
    }

    #[test]
    fn test_free_symbols() {
        let e = Expr::symbol("k") * Expr::symbol("mu").cos() + Expr::pi();
        let names: Vec<String> = e.free_symbols().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["k", "mu"]);
        assert!(e.contains_symbol(&Symbol::new("mu")));
        assert!(!e.contains_symbol(&Symbol::new("phi")));
    }

    #[test]
    fn test_func_names_round_trip() {
        for func in Func::ALL {
            assert_eq!(Func::from_name(func.name()), Some(func));
        }
        assert_eq!(Func::from_name("tan"), None);
    }
}

//! Canonical trigonometric and error-function atoms.
//!
//! Arguments are already expanded. An angle `c·π + rest` is reduced so that
//!
//! - `rest` has a positive leading coefficient (parity of cos, sin)
//! - `c` lies in `[0, 2)`, and whole quarter turns are absorbed by swapping
//!   `cos` and `sin`
//! - for purely numeric angles, `c` lies in `(0, 1]`
//!
//! so that equal values of the form `cos(θ + π)` and `-cos(θ)` meet on the same atom.

use flipsym_integers::Rational;
use num_traits::{One, Zero};

use crate::expr::{Expr, ExprNode, Func};
use crate::normal::NormalForm;

/// The two circular functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrigKind {
    /// Cosine.
    Cos,
    /// Sine.
    Sin,
}

impl TrigKind {
    /// The matching function head.
    #[must_use]
    pub const fn func(self) -> Func {
        match self {
            TrigKind::Cos => Func::Cos,
            TrigKind::Sin => Func::Sin,
        }
    }

    /// Builds the raw `kind(angle)` atom without any reduction.
    #[must_use]
    pub fn atom(self, angle: &NormalForm) -> Expr {
        Expr::new(ExprNode::Function {
            func: self.func(),
            args: std::iter::once(angle.to_expr()).collect(),
        })
    }
}

/// Canonical `kind(angle)` as a normal form.
#[must_use]
pub fn canonical_trig(kind: TrigKind, angle: &NormalForm) -> NormalForm {
    let (c, rest) = angle.split_pi();
    let (kind, sign, c, rest) = reduce(kind, c, rest);
    if rest.is_zero() && c.is_zero() {
        return match kind {
            TrigKind::Cos => NormalForm::constant(sign),
            TrigKind::Sin => NormalForm::zero(),
        };
    }
    let pi = NormalForm::atom(Expr::pi());
    let angle = &rest + &pi.scale(&c);
    NormalForm::term(sign, crate::normal::Monomial::atom(kind.atom(&angle), Rational::one()))
}

/// Reduces `kind(c·π + rest)` to `sign · kind'(c'·π + rest')`.
fn reduce(
    kind: TrigKind,
    c: Rational,
    rest: NormalForm,
) -> (TrigKind, Rational, Rational, NormalForm) {
    let mut kind = kind;
    let mut sign = Rational::one();
    let mut c = c;
    let mut rest = rest;

    let negate = match rest.leading_coefficient() {
        Some(lead) => lead.is_negative(),
        None => c.is_negative(),
    };
    if negate {
        rest = -&rest;
        c = -c;
        if kind == TrigKind::Sin {
            sign = -sign;
        }
    }

    // c mod 2
    let two = Rational::from(2);
    let turns = Rational::from_integer((&c / &two).floor());
    c = c - two.clone() * turns;

    let doubled = &c * &two;
    if let Some(q) = doubled.to_i64() {
        let (shifted, flip) = quarter_shift(kind, q);
        kind = shifted;
        if flip {
            sign = -sign;
        }
        c = Rational::zero();
    } else if rest.is_zero() && c > Rational::one() {
        // cos(cπ) = cos((2 - c)π), sin(cπ) = -sin((2 - c)π)
        c = two - c;
        if kind == TrigKind::Sin {
            sign = -sign;
        }
    }
    (kind, sign, c, rest)
}

/// `kind(x + qπ/2)` as `(kind', negated)` for `q` in `0..4`.
fn quarter_shift(kind: TrigKind, q: i64) -> (TrigKind, bool) {
    match (kind, q.rem_euclid(4)) {
        (TrigKind::Cos, 0) => (TrigKind::Cos, false),
        (TrigKind::Cos, 1) => (TrigKind::Sin, true),
        (TrigKind::Cos, 2) => (TrigKind::Cos, true),
        (TrigKind::Cos, _) => (TrigKind::Sin, false),
        (TrigKind::Sin, 0) => (TrigKind::Sin, false),
        (TrigKind::Sin, 1) => (TrigKind::Cos, false),
        (TrigKind::Sin, 2) => (TrigKind::Sin, true),
        (TrigKind::Sin, _) => (TrigKind::Cos, true),
    }
}

/// Canonical `erf(arg)`: odd, so the argument's leading coefficient is made positive.
#[must_use]
pub fn canonical_erf(arg: &NormalForm) -> NormalForm {
    if arg.is_zero() {
        return NormalForm::zero();
    }
    let negative = arg.leading_coefficient().is_some_and(Rational::is_negative);
    let (sign, arg) = if negative {
        (-Rational::one(), -arg)
    } else {
        (Rational::one(), arg.clone())
    };
    let atom = Expr::new(ExprNode::Function {
        func: Func::Erf,
        args: std::iter::once(arg.to_expr()).collect(),
    });
    NormalForm::term(sign, crate::normal::Monomial::atom(atom, Rational::one()))
}

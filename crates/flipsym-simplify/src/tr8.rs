//! Trigonometric power reduction (TR8).
//!
//! Products and natural powers of `sin`/`cos` are rewritten as linear
//! combinations of `sin`/`cos` of sums of angles:
//!
//! ```text
//! cos a cos b = (cos(a - b) + cos(a + b)) / 2
//! sin a sin b = (cos(a - b) - cos(a + b)) / 2
//! sin a cos b = (sin(a + b) + sin(a - b)) / 2
//! ```
//!
//! After the rewrite every term carries at most one trigonometric atom, so
//! applying TR8 twice gives the same normal form.

use std::collections::BTreeMap;

use flipsym_core::trig::canonical_trig;
use flipsym_core::{Expr, ExprNode, Func, Monomial, NormalForm, TrigKind};
use flipsym_integers::Rational;
use num_traits::{One, Zero};

/// A finite Fourier sum `Σ c · kind(angle)`.
///
/// `cos(0)` stands for the constant term.
#[derive(Clone, Debug)]
struct Fourier {
    terms: BTreeMap<(TrigKind, NormalForm), Rational>,
}

impl Fourier {
    fn one() -> Self {
        let mut terms = BTreeMap::new();
        terms.insert((TrigKind::Cos, NormalForm::zero()), Rational::one());
        Self { terms }
    }

    fn push(&mut self, kind: TrigKind, angle: NormalForm, coeff: Rational) {
        if coeff.is_zero() {
            return;
        }
        let slot = self.terms.entry((kind, angle)).or_insert_with(Rational::zero);
        *slot = slot.clone() + coeff;
    }

    /// Multiplies by a single `kind(angle)`.
    fn mul_atom(&self, kind: TrigKind, angle: &NormalForm) -> Self {
        let half = Rational::from_i64(1, 2);
        let mut out = Self {
            terms: BTreeMap::new(),
        };
        for ((k, a), c) in &self.terms {
            if c.is_zero() {
                continue;
            }
            let c = c * &half;
            let sum = a + angle;
            let diff = a - angle;
            match (k, kind) {
                (TrigKind::Cos, TrigKind::Cos) => {
                    out.push(TrigKind::Cos, diff, c.clone());
                    out.push(TrigKind::Cos, sum, c);
                }
                (TrigKind::Sin, TrigKind::Sin) => {
                    out.push(TrigKind::Cos, diff, c.clone());
                    out.push(TrigKind::Cos, sum, -c);
                }
                (TrigKind::Sin, TrigKind::Cos) => {
                    out.push(TrigKind::Sin, sum, c.clone());
                    out.push(TrigKind::Sin, diff, c);
                }
                (TrigKind::Cos, TrigKind::Sin) => {
                    out.push(TrigKind::Sin, sum, c.clone());
                    out.push(TrigKind::Sin, diff, -c);
                }
            }
        }
        out
    }

    fn into_normal_form(self) -> NormalForm {
        self.terms
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .fold(NormalForm::zero(), |acc, ((kind, angle), c)| {
                &acc + &canonical_trig(kind, &angle).scale(&c)
            })
    }
}

/// The kind and expanded angle of a `sin`/`cos` atom.
fn trig_atom(atom: &Expr) -> Option<(TrigKind, NormalForm)> {
    let ExprNode::Function { func, args } = atom.node() else {
        return None;
    };
    let kind = match func {
        Func::Cos => TrigKind::Cos,
        Func::Sin => TrigKind::Sin,
        _ => return None,
    };
    match args.as_slice() {
        [angle] => Some((kind, NormalForm::from_expr(angle))),
        _ => None,
    }
}

/// Applies the product-to-sum identities to every term of `nf`.
#[must_use]
pub fn tr8(nf: &NormalForm) -> NormalForm {
    let mut out = NormalForm::zero();
    for (monomial, coeff) in nf.terms() {
        let mut series = Fourier::one();
        let mut rest = BTreeMap::new();
        for (atom, e) in monomial.factors() {
            let power = e.to_i64().and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0);
            match (trig_atom(atom), power) {
                (Some((kind, angle)), Some(n)) => {
                    for _ in 0..n {
                        series = series.mul_atom(kind, &angle);
                    }
                }
                _ => {
                    rest.insert(atom.clone(), e.clone());
                }
            }
        }
        let rest = Monomial::with_parts(monomial.radical().clone(), rest, monomial.exp_arg().clone());
        let term = NormalForm::term(coeff.clone(), rest);
        out = &out + &(&term * &series.into_normal_form());
    }
    out
}

/// [`tr8`] on an expression.
#[must_use]
pub fn tr8_expr(expr: &Expr) -> Expr {
    tr8(&NormalForm::from_expr(expr)).to_expr()
}

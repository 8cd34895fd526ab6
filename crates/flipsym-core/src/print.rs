//! Printing expressions.
//!
//! Three renderings are provided:
//!
//! - `Display`: infix with `**`, `sqrt(...)` and `/`, close to what a
//!   computer algebra system prints
//! - [`Expr::to_python`]: the same layout with `math.` function names, so the
//!   output is valid Python source
//! - [`Expr::to_sexpr`]: the prefix form read back by [`crate::parse`]

use std::fmt::{self, Write as _};

use flipsym_integers::Rational;
use num_traits::One;

use crate::expr::{Constant, Expr, ExprNode, Func};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Plain,
    Python,
}

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

struct Printer {
    style: Style,
}

impl Printer {
    fn constant(&self, c: Constant) -> &'static str {
        match (c, self.style) {
            (Constant::Pi, Style::Plain) => "pi",
            (Constant::Pi, Style::Python) => "math.pi",
        }
    }

    fn sqrt_name(&self) -> &'static str {
        match self.style {
            Style::Plain => "sqrt",
            Style::Python => "math.sqrt",
        }
    }

    fn func_call(&self, func: Func, args: &[Expr]) -> String {
        let printed: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
        match self.style {
            Style::Plain => format!("{}({})", func.name(), printed.join(", ")),
            Style::Python => match (func, printed.as_slice()) {
                (Func::Sin | Func::Cos | Func::Exp | Func::Erf, _) => {
                    format!("math.{}({})", func.name(), printed.join(", "))
                }
                (Func::Legendre, [l, x]) => format!("scipy.special.eval_legendre({l}, {x})"),
                (Func::AssocLegendre, [l, m, x]) => format!("scipy.special.lpmv({m}, {l}, {x})"),
                (Func::Ynm, [l, m, t, p]) => format!("scipy.special.sph_harm({m}, {l}, {p}, {t})"),
                (Func::YnmConj, [l, m, t, p]) => {
                    format!("np.conj(scipy.special.sph_harm({m}, {l}, {p}, {t}))")
                }
                _ => format!("{}({})", func.name(), printed.join(", ")),
            },
        }
    }

    fn expr(&self, e: &Expr) -> String {
        self.with_prec(e, 0)
    }

    /// Prints `e`, parenthesised if it binds looser than `outer`.
    fn with_prec(&self, e: &Expr, outer: u8) -> String {
        let (text, prec) = self.render(e);
        if prec <= outer {
            format!("({text})")
        } else {
            text
        }
    }

    fn render(&self, e: &Expr) -> (String, u8) {
        match e.node() {
            ExprNode::Number(r) => {
                if r.is_integer() && !r.is_negative() {
                    (r.to_string(), PREC_ATOM)
                } else if r.is_integer() {
                    (r.to_string(), PREC_ADD)
                } else {
                    (r.to_string(), PREC_MUL)
                }
            }
            ExprNode::Symbol(s) => (s.to_string(), PREC_ATOM),
            ExprNode::Constant(c) => (self.constant(*c).to_string(), PREC_ATOM),
            ExprNode::Function { func, args } => (self.func_call(*func, args), PREC_ATOM),
            ExprNode::Add(args) => (self.sum(args), PREC_ADD),
            ExprNode::Mul(_) | ExprNode::Pow { .. } => {
                let (negative, body, prec) = self.term(e);
                if negative {
                    (format!("-{body}"), PREC_ADD)
                } else {
                    (body, prec)
                }
            }
        }
    }

    fn sum(&self, args: &[Expr]) -> String {
        // Constants go last.
        let mut ordered: Vec<&Expr> = args.iter().filter(|a| !a.is_number()).collect();
        ordered.extend(args.iter().filter(|a| a.is_number()));

        let mut out = String::new();
        for (i, term) in ordered.into_iter().enumerate() {
            let (negative, body) = match term.node() {
                ExprNode::Number(r) if r.is_negative() => (true, (-r).to_string()),
                ExprNode::Number(r) => (false, r.to_string()),
                _ => {
                    let (negative, body, _) = self.term(term);
                    (negative, body)
                }
            };
            match (i, negative) {
                (0, true) => out.push('-'),
                (0, false) => {}
                (_, true) => out.push_str(" - "),
                (_, false) => out.push_str(" + "),
            }
            out.push_str(&body);
        }
        out
    }

    /// A product or power as `(negative, magnitude, precedence)`.
    fn term(&self, e: &Expr) -> (bool, String, u8) {
        let (coeff, rest) = e.split_coefficient();
        let factors: Vec<Expr> = match rest.node() {
            ExprNode::Mul(args) => args.to_vec(),
            _ if rest.is_one() => Vec::new(),
            _ => vec![rest.clone()],
        };

        let mut numer: Vec<String> = Vec::new();
        let mut denom: Vec<String> = Vec::new();
        let magnitude = coeff.abs();
        if !magnitude.numerator().is_one() || factors.is_empty() {
            numer.push(magnitude.numerator().to_string());
        }
        if !magnitude.denominator().is_one() {
            denom.push(magnitude.denominator().to_string());
        }

        for factor in &factors {
            match factor.node() {
                ExprNode::Pow { base, exp } => match exp.as_number() {
                    Some(x) if x.is_negative() => {
                        denom.push(self.power_expr(base, &Expr::number(-x)));
                    }
                    _ => numer.push(self.power_expr(base, exp)),
                },
                _ => numer.push(self.with_prec(factor, PREC_MUL)),
            }
        }

        let single = numer.len() + denom.len() == 1;
        let num = if numer.is_empty() {
            "1".to_string()
        } else {
            numer.join("*")
        };
        let body = match denom.len() {
            0 => num,
            1 => format!("{num}/{}", denom[0]),
            _ => format!("{num}/({})", denom.join("*")),
        };
        let prec = match factors.as_slice() {
            [factor] if single && denom.is_empty() => match factor.node() {
                ExprNode::Pow { .. } => PREC_POW,
                _ => PREC_ATOM,
            },
            _ => PREC_MUL,
        };
        (coeff.is_negative(), body, prec)
    }

    fn power_expr(&self, base: &Expr, exp: &Expr) -> String {
        if let Some(x) = exp.as_number() {
            if *x == Rational::from_i64(1, 2) {
                return format!("{}({})", self.sqrt_name(), self.expr(base));
            }
            if x.is_one() {
                return self.with_prec(base, PREC_MUL);
            }
        }
        let base = self.with_prec(base, PREC_POW);
        let exp = match exp.as_number() {
            Some(x) if x.is_integer() && !x.is_negative() => x.to_string(),
            Some(x) => format!("({x})"),
            None => self.with_prec(exp, PREC_POW),
        };
        format!("{base}**{exp}")
    }

    fn sexpr(e: &Expr, out: &mut String) {
        match e.node() {
            ExprNode::Number(r) => {
                let _ = write!(out, "{r}");
            }
            ExprNode::Symbol(s) => out.push_str(s.name()),
            ExprNode::Constant(Constant::Pi) => out.push_str("pi"),
            ExprNode::Add(args) => Self::sexpr_list("+", args, out),
            ExprNode::Mul(args) => Self::sexpr_list("*", args, out),
            ExprNode::Pow { base, exp } => Self::sexpr_list("^", &[base.clone(), exp.clone()], out),
            ExprNode::Function { func, args } => Self::sexpr_list(func.name(), args, out),
        }
    }

    fn sexpr_list(head: &str, args: &[Expr], out: &mut String) {
        out.push('(');
        out.push_str(head);
        for a in args {
            out.push(' ');
            Self::sexpr(a, out);
        }
        out.push(')');
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Printer { style: Style::Plain }.expr(self))
    }
}

impl Expr {
    /// Renders the expression as Python source using the `math` module.
    #[must_use]
    pub fn to_python(&self) -> String {
        Printer {
            style: Style::Python,
        }
        .expr(self)
    }

    /// Renders the expression in prefix form, e.g. `(* 2 (^ x 3))`.
    #[must_use]
    pub fn to_sexpr(&self) -> String {
        let mut out = String::new();
        Printer::sexpr(self, &mut out);
        out
    }
}

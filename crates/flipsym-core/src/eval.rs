//! Floating-point evaluation of expressions.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::expand::{expand_func, ExpandError};
use crate::expr::{Constant, Expr, ExprNode, Func};
use crate::symbol::Symbol;

/// Values for the free symbols of an expression.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    values: FxHashMap<Symbol, f64>,
}

impl Bindings {
    /// Empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a binding.
    pub fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(Symbol::new(name), value);
    }

    /// Looks a symbol up.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.values.get(symbol).copied()
    }
}

/// Errors from [`Expr::eval`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A symbol without a value.
    #[error("no value bound for symbol `{0}`")]
    Unbound(Symbol),
    /// A special function could not be expanded.
    #[error(transparent)]
    Expand(#[from] ExpandError),
}

impl Expr {
    /// Evaluates the expression in double precision.
    ///
    /// Special functions are expanded first, so `ynm` needs a real azimuth.
    ///
    /// # Errors
    ///
    /// Returns an error for unbound symbols or unexpandable special functions.
    pub fn eval(&self, bindings: &Bindings) -> Result<f64, EvalError> {
        match self.node() {
            ExprNode::Number(r) => Ok(r.to_f64()),
            ExprNode::Symbol(s) => bindings.get(s).ok_or_else(|| EvalError::Unbound(s.clone())),
            ExprNode::Constant(Constant::Pi) => Ok(std::f64::consts::PI),
            ExprNode::Add(args) => args.iter().map(|a| a.eval(bindings)).sum(),
            ExprNode::Mul(args) => args.iter().map(|a| a.eval(bindings)).product(),
            ExprNode::Pow { base, exp } => {
                let b = base.eval(bindings)?;
                match exp.as_number().and_then(|e| e.to_i64()) {
                    Some(n) => Ok(b.powi(i32::try_from(n).unwrap_or(i32::MAX))),
                    None => Ok(b.powf(exp.eval(bindings)?)),
                }
            }
            ExprNode::Function { func, args } => match (func, args.as_slice()) {
                (Func::Sin, [a]) => Ok(a.eval(bindings)?.sin()),
                (Func::Cos, [a]) => Ok(a.eval(bindings)?.cos()),
                (Func::Exp, [a]) => Ok(a.eval(bindings)?.exp()),
                (Func::Erf, [a]) => Ok(flipsym_special_func::erf(a.eval(bindings)?)),
                _ => expand_func(self)?.eval(bindings),
            },
        }
    }
}

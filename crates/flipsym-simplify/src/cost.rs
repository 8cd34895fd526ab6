//! Cost model for choosing between equivalent forms.
//!
//! Counts arithmetic operations the way a printed expression would be
//! evaluated: an `n`-ary sum or product costs `n - 1`, every power and
//! function call costs one, and a non-integer coefficient costs one division.

use flipsym_core::{Expr, ExprNode};

/// Number of operations needed to evaluate `expr`.
#[must_use]
pub fn count_ops(expr: &Expr) -> usize {
    match expr.node() {
        ExprNode::Number(r) => usize::from(!r.is_integer()) + usize::from(r.is_negative()),
        ExprNode::Symbol(_) | ExprNode::Constant(_) => 0,
        ExprNode::Add(args) | ExprNode::Mul(args) => {
            args.len() - 1 + args.iter().map(count_ops).sum::<usize>()
        }
        ExprNode::Pow { base, exp } => 1 + count_ops(base) + count_ops(exp),
        ExprNode::Function { args, .. } => 1 + args.iter().map(count_ops).sum::<usize>(),
    }
}

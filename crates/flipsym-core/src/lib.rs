//! # flipsym-core
//!
//! Symbolic expressions for the flipsym term generator.
//!
//! This crate provides:
//! - Shareable, immutable expression trees with canonicalising constructors
//! - An expanded normal form with exact coefficients and squarefree radicals
//! - Canonical trigonometric atoms (parity, half and quarter turns of π)
//! - Expansion of Legendre functions and real spherical harmonics
//! - Infix, Python and prefix printers, a prefix parser and serde support
//! - Double-precision evaluation for numerical checks
//!
//! ## Design Principles
//!
//! - **Shared by reference count**: `Expr` clones are pointer copies, so one
//!   kernel can be handed to every worker thread
//! - **Exact arithmetic**: coefficients are rationals, roots are kept as
//!   squarefree radicals, nothing is rounded until evaluation
//! - **Deterministic**: every canonical order is a total order on the tree, so
//!   identical inputs print identical output

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod eval;
pub mod expand;
pub mod expr;
pub mod normal;
pub mod parse;
pub mod print;
pub mod symbol;
pub mod trig;

#[cfg(test)]
mod proptests;

pub use eval::{Bindings, EvalError};
pub use expand::{expand_func, ExpandError};
pub use expr::{Constant, Expr, ExprNode, Func};
pub use normal::{expand, Monomial, NormalForm};
pub use parse::{parse, ParseError};
pub use symbol::Symbol;
pub use trig::TrigKind;

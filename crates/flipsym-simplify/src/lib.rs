//! # flipsym-simplify
//!
//! Iterative simplification of M and N terms.
//!
//! Two strategies share one fixed-point loop:
//!
//! - [`Strategy::Direct`]: pick the cheapest of the expanded, factored and
//!   power-reduced forms, then refine
//! - [`Strategy::TrigFirst`]: refine from the start
//!
//! A refinement is [`tr8`] (product-to-sum for `sin`/`cos`) followed by
//! [`factor`] (content, common monomial and common exponential). The loop
//! stops at a fixed point or after a fixed number of refinements; running out
//! of budget is reported in [`Simplified::converged`], never as an error.
//!
//! ## Example
//!
//! ```
//! use flipsym_simplify::Simplifier;
//!
//! let simplifier = Simplifier::new();
//! let result = simplifier
//!     .simplify_str("(+ (^ (sin x) 2) (^ (cos x) 2))", "trig-first")
//!     .unwrap();
//! assert_eq!(result.expr.to_string(), "1");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cost;
pub mod engine;
pub mod factor;
pub mod strategy;
pub mod tr8;

#[cfg(test)]
mod proptests;

pub use cost::count_ops;
pub use engine::{simplify, Simplified, Simplifier, SimplifierConfig, DEFAULT_MAX_ITERATIONS};
pub use factor::{factor, factor_parts, Factored};
pub use strategy::{SimplifyError, Strategy};
pub use tr8::tr8;

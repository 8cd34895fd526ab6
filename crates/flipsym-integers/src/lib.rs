//! # flipsym-integers
//!
//! Exact integer and rational arithmetic for the flipsym term generator.
//!
//! This crate wraps `dashu` to provide:
//! - Arbitrary precision integers (`Integer`) with factorials and exact roots
//! - Arbitrary precision rationals (`Rational`) with exact square roots
//!
//! Every coefficient that flows through the decomposition pipeline
//! (Legendre coefficients, Wigner symbols, Gaussian moments) is exact.
//! Factorials in the coupling coefficients overflow machine words well
//! before the degree ranges used by the published models.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod integer;
pub mod rational;

#[cfg(test)]
mod proptests;

pub use integer::Integer;
pub use rational::Rational;

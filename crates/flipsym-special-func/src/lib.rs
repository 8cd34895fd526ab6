//! Special functions for the flipsym term generator.
//!
//! This crate provides the exact coefficients behind every special function
//! that appears in a multipole decomposition:
//!
//! - **Legendre polynomials**: P_l(x) = 2^-l Σ (-1)^k C(l,k) C(2l-2k,l) x^(l-2k)
//! - **Associated Legendre functions**: P_l^m(x) = (-1)^m (1-x²)^(m/2) d^m/dx^m P_l(x)
//! - **Spherical harmonics**: normalisation of Y_l^m with the Condon-Shortley phase
//! - **Wigner 3j symbols and Gaunt coefficients**: exact surds via the Racah formula
//! - **Error function**: numeric erf(x) = (2/√π) ∫₀ˣ e^(-t²) dt for evaluation
//!
//! Everything except the error function is exact: coefficients are
//! [`Rational`](flipsym_integers::Rational) values or [`Surd`]s, never floats.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error_func;
pub mod harmonic;
pub mod legendre;
pub mod wigner;

#[cfg(test)]
mod proptests;

pub use error_func::{erf, erfc};
pub use harmonic::ynm_norm_squared;
pub use legendre::{assoc_legendre_coefficients, legendre_coefficients, legendre_p};
pub use wigner::{gaunt, wigner_3j, Surd};

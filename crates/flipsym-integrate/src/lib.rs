//! Integration over the unit interval for the flipsym term generator.
//!
//! Multipole projections integrate a kernel times Legendre polynomials over
//! a direction cosine in `[-1, 1]`. Every kernel of the published models is a
//! polynomial in the cosine times an optional Gaussian damping factor, so the
//! integral always has a closed form in terms of `erf`:
//!
//! ```text
//! ∫₋₁¹ x^n e^(-A x²) dx
//! ```
//!
//! - [`definite`]: exact moments of that class, term by term over the
//!   expanded integrand
//! - [`numerical`]: Gauss-Kronrod quadrature used to verify the symbolic
//!   results

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod definite;
pub mod numerical;

#[cfg(test)]
mod proptests;

pub use definite::{integrate_normal_form, integrate_unit_interval, IntegrateError};
pub use numerical::{adaptive_integrate, integrate_gk15, integrate_gk31, AdaptiveResult, GKResult};

//! Numerical quadrature.
//!
//! Used only to check symbolic projections: the multipole coefficients
//! produced by [`crate::definite`] are compared against quadrature of the
//! same integrand.
//!
//! - **Gauss-Kronrod**: fixed G7K15 and G15K31 rules with error estimates
//! - **Adaptive**: bisection of the worst subinterval until tolerance

pub mod adaptive;
pub mod gauss_kronrod;

pub use adaptive::{adaptive_integrate, AdaptiveResult};
pub use gauss_kronrod::{integrate_gk15, integrate_gk31, GKResult, GaussKronrodRule};

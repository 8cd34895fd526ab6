//! Decomposition settings.

use flipsym_core::{Expr, Symbol};
use flipsym_simplify::SimplifierConfig;
use serde::{Deserialize, Serialize};

/// Names of the symbols the decomposers integrate over or introduce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variables {
    /// Wavenumber.
    pub k: Symbol,
    /// Direction cosine of the plane-parallel kernel.
    pub mu: Symbol,
    /// First direction cosine of the wide-angle kernel.
    pub mu1: Symbol,
    /// Second direction cosine of the wide-angle kernel.
    pub mu2: Symbol,
    /// Opening angle between the two lines of sight.
    pub theta: Symbol,
    /// Angle between the separation and the bisector.
    pub phi: Symbol,
}

impl Default for Variables {
    fn default() -> Self {
        Self {
            k: Symbol::new("k"),
            mu: Symbol::new("mu"),
            mu1: Symbol::new("mu1"),
            mu2: Symbol::new("mu2"),
            theta: Symbol::new("theta"),
            phi: Symbol::new("phi"),
        }
    }
}

impl Variables {
    /// `theta` as an expression.
    #[must_use]
    pub fn theta_expr(&self) -> Expr {
        Expr::from(self.theta.clone())
    }

    /// `phi` as an expression.
    #[must_use]
    pub fn phi_expr(&self) -> Expr {
        Expr::from(self.phi.clone())
    }
}

/// Configuration shared by every job of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    /// Simplifier budget and strategies.
    pub simplifier: SimplifierConfig,
    /// Symbol names.
    pub variables: Variables,
}

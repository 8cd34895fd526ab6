//! The decomposer seam.

use flipsym_core::{ExpandError, Expr};
use flipsym_integrate::IntegrateError;
use thiserror::Error;
use tracing::debug;

use crate::config::DecomposeConfig;
use crate::grid::Job;
use crate::key::JobKey;
use crate::{plane_parallel, wide_angle};

/// Errors from decomposing one job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecomposeError {
    /// The projection integral has no closed form in the supported class.
    #[error(transparent)]
    Integrate(#[from] IntegrateError),
    /// A special function could not be expanded.
    #[error(transparent)]
    Expand(#[from] ExpandError),
}

/// The radial (M) and angular (N) parts of one multipole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermPair {
    /// Radial coefficient, a function of `k` and the model parameters.
    pub m: Expr,
    /// Angular basis function of `theta` and `phi`.
    pub n: Expr,
}

impl TermPair {
    /// The empty pair `(0, 0)`.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            m: Expr::zero(),
            n: Expr::zero(),
        }
    }

    /// Returns true if either member is zero; such pairs are not emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.m.is_zero() || self.n.is_zero()
    }
}

/// Turns one job into its term pair.
///
/// Implementations are shared across worker threads.
pub trait Decomposer: Sync {
    /// Decomposes `job`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot be projected in closed form.
    fn decompose(&self, job: &Job) -> Result<TermPair, DecomposeError>;
}

/// Dispatches on the key geometry to the plane-parallel or wide-angle
/// decomposition.
#[derive(Clone, Debug, Default)]
pub struct MultipoleDecomposer {
    config: DecomposeConfig,
}

impl MultipoleDecomposer {
    /// Creates a decomposer with the given configuration.
    #[must_use]
    pub fn new(config: DecomposeConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &DecomposeConfig {
        &self.config
    }
}

impl Decomposer for MultipoleDecomposer {
    fn decompose(&self, job: &Job) -> Result<TermPair, DecomposeError> {
        let pair = match &job.key {
            JobKey::PlaneParallel { l, .. } => {
                plane_parallel::decompose_parallel(&job.kernel, *l, &self.config)?
            }
            JobKey::WideAngle { l, l1, l2, .. } => {
                wide_angle::decompose_wide_angle(&job.kernel, *l, *l1, *l2, &self.config)?
            }
        };
        debug!(key = %job.key, empty = pair.is_empty(), "decomposed");
        Ok(pair)
    }
}

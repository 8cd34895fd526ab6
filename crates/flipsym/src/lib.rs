//! # flipsym
//!
//! Symbolic generation of the M/N terms of peculiar-velocity covariance
//! models.
//!
//! A model's kernels `B(k, mu)` are projected onto Legendre polynomials
//! (plane-parallel) or bipolar spherical harmonics (wide-angle), giving pairs
//! of a radial coefficient `M(k)` and an angular function `N(theta, phi)`.
//! The pairs are simplified and written out as a Python module.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flipsym::prelude::*;
//!
//! let model = preset("carreres23").unwrap();
//! let generated = decompose_model(&model, &GenerateOptions::default()).unwrap();
//! write_model(default_output_path(&model), &model, &generated.grid, &generated.pool).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::{Path, PathBuf};

use tracing::info;

pub use flipsym_core as core;
pub use flipsym_decompose as decompose;
pub use flipsym_emit as emit;
pub use flipsym_integers as integers;
pub use flipsym_integrate as integrate;
pub use flipsym_models as models;
pub use flipsym_simplify as simplify;
pub use flipsym_special_func as special_func;

use flipsym_decompose::{
    build_jobs, run, DecomposeConfig, DecomposeError, Decomposer, DispatchError, GridError,
    ModelSpec, MultipoleDecomposer, TaskGrid, TermPair,
};
use flipsym_emit::{write_model, EmitError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{decompose_key, decompose_model, default_output_path, generate, GenerateOptions, Generated};
    pub use flipsym_core::{parse, Bindings, Expr, NormalForm, Symbol};
    pub use flipsym_decompose::{
        build_jobs, run, DecomposeConfig, Geometry, JobKey, ModelSpec, MultipoleDecomposer, TaskGrid,
        TermPair,
    };
    pub use flipsym_emit::{render_model, write_model};
    pub use flipsym_integers::{Integer, Rational};
    pub use flipsym_models::{load_model, preset, PRESETS};
    pub use flipsym_simplify::{Simplifier, SimplifierConfig, Strategy};
}

/// Errors from the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model does not form a valid task grid.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// A job failed or the pool could not be built.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// A single decomposition failed.
    #[error(transparent)]
    Decompose(#[from] DecomposeError),
    /// The output could not be rendered or written.
    #[error(transparent)]
    Emit(#[from] EmitError),
    /// No job of the model has this key.
    #[error("model `{model}` has no job `{key}`")]
    UnknownKey {
        /// Model name.
        model: String,
        /// The requested key.
        key: String,
    },
}

/// Options of a generation run.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Worker threads; 1 runs on the calling thread.
    pub workers: usize,
    /// Symbol names and simplifier settings.
    pub config: DecomposeConfig,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
            config: DecomposeConfig::default(),
        }
    }
}

/// A decomposed model: the task grid and its index-aligned result pool.
#[derive(Clone, Debug)]
pub struct Generated {
    /// Jobs in grid order.
    pub grid: TaskGrid,
    /// `pool[i]` is the pair of `grid.jobs()[i]`.
    pub pool: Vec<TermPair>,
}

impl Generated {
    /// Number of pairs with both members non-zero.
    #[must_use]
    pub fn non_empty(&self) -> usize {
        self.pool.iter().filter(|p| !p.is_empty()).count()
    }
}

/// `./<model name>/flip_terms.py`.
#[must_use]
pub fn default_output_path(model: &ModelSpec) -> PathBuf {
    Path::new(".").join(&model.name).join("flip_terms.py")
}

/// Builds the task grid of `model` and decomposes every job.
///
/// # Errors
///
/// Returns an error if the grid is invalid or any job fails.
pub fn decompose_model(model: &ModelSpec, options: &GenerateOptions) -> Result<Generated, Error> {
    let grid = build_jobs(model)?;
    let decomposer = MultipoleDecomposer::new(options.config.clone());
    let pool = run(grid.jobs(), &decomposer, options.workers)?;
    Ok(Generated { grid, pool })
}

/// Decomposes `model` and writes the Python module to `path`.
///
/// Nothing is written unless every job succeeds.
///
/// # Errors
///
/// Returns an error if decomposition or writing fails.
pub fn generate(model: &ModelSpec, path: impl AsRef<Path>, options: &GenerateOptions) -> Result<Generated, Error> {
    let generated = decompose_model(model, options)?;
    write_model(path.as_ref(), model, &generated.grid, &generated.pool)?;
    info!(
        model = %model.name,
        jobs = generated.grid.len(),
        functions = generated.non_empty(),
        "generation finished"
    );
    Ok(generated)
}

/// Decomposes the single job of `model` whose key renders as `key`.
///
/// # Errors
///
/// Returns an error if the grid is invalid, no job has that key, or the
/// decomposition fails.
pub fn decompose_key(model: &ModelSpec, key: &str, config: &DecomposeConfig) -> Result<TermPair, Error> {
    let grid = build_jobs(model)?;
    let job = grid.find(key.trim()).ok_or_else(|| Error::UnknownKey {
        model: model.name.clone(),
        key: key.to_string(),
    })?;
    Ok(MultipoleDecomposer::new(config.clone()).decompose(job)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipsym_core::Expr;
    use flipsym_models::preset;

    #[test]
    fn test_default_output_path() {
        let model = preset("lai22").unwrap();
        assert_eq!(default_output_path(&model), Path::new("./lai22/flip_terms.py"));
    }

    #[test]
    fn test_decompose_key() {
        let model = preset("adamsblake20").unwrap();
        let pair = decompose_key(&model, "vv_0_2", &DecomposeConfig::default()).unwrap();
        // 5/2 ∫ 10⁴ mu² P_2 / k² = 2/3 · 10⁴ / k²
        let expected = Expr::rational(20000, 3) / Expr::symbol("k").powi(2);
        assert_eq!(
            flipsym_core::NormalForm::from_expr(&pair.m),
            flipsym_core::NormalForm::from_expr(&expected)
        );
    }

    #[test]
    fn test_unknown_key() {
        let model = preset("carreres23").unwrap();
        let err = decompose_key(&model, "vv_0_3_0_0", &DecomposeConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownKey { .. }));
        assert!(err.to_string().contains("vv_0_3_0_0"));
    }
}

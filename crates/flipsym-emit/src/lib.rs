//! # flipsym-emit
//!
//! Writes a decomposed model as a Python module.
//!
//! For every non-empty pair the module defines
//!
//! ```python
//! def M_{type}_{term}_{l}_{j}(params):
//!     def func(k):
//!         return(...)
//!     return(func)
//!
//! def N_{type}_{term}_{l}_{j}(theta,phi):
//!     return(...)
//! ```
//!
//! followed by the `dictionary_terms`, `dictionary_lmax` and
//! `dictionary_subterms` tables and the `multi_index_model` flag.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod python;
pub mod repr;

#[cfg(test)]
mod proptests;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flipsym_decompose::{GridError, ModelSpec, TaskGrid, TermPair};
use thiserror::Error;
use tracing::info;

pub use python::{python_source, render_model};
pub use repr::{PyDict, PyRepr};

/// Errors from rendering or writing a model.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The pool does not have one pair per job.
    #[error("result pool has {results} entries for {jobs} jobs")]
    PoolMismatch {
        /// Number of jobs in the grid.
        jobs: usize,
        /// Number of pairs in the pool.
        results: usize,
    },
    /// The model implies a key the grid does not contain.
    #[error("job {0} is not in the task grid")]
    MissingKey(String),
    /// The model's degree bounds do not match its geometry.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The output file could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Renders the model and writes it to `path`, creating parent directories.
///
/// Nothing is written if rendering fails.
///
/// # Errors
///
/// Returns an error if rendering fails or the file cannot be written.
pub fn write_model(
    path: impl AsRef<Path>,
    model: &ModelSpec,
    grid: &TaskGrid,
    pool: &[TermPair],
) -> Result<(), EmitError> {
    let path = path.as_ref();
    let text = render_model(model, grid, pool)?;
    let io_err = |source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, text).map_err(io_err)?;
    info!(path = %path.display(), model = %model.name, "wrote model");
    Ok(())
}

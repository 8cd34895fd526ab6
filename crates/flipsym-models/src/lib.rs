//! # flipsym-models
//!
//! Covariance models ready for decomposition.
//!
//! Models come from two places:
//! - [`preset`]: the built-in models listed in [`PRESETS`]
//! - [`load_model`]: a JSON description, with kernels as s-expressions
//!
//! ## Example
//!
//! ```
//! use flipsym_models::preset;
//!
//! let model = preset("carreres23").unwrap();
//! assert_eq!(model.types[0].name, "vv");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod presets;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flipsym_decompose::{build_jobs, GridError, ModelSpec};
use thiserror::Error;
use tracing::{debug, warn};

/// Names accepted by [`preset`].
pub const PRESETS: [&str; 4] = ["adamsblake20", "lai22", "carreres23", "ravouxcarreres"];

/// Errors from loading a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No preset has this name.
    #[error("unknown model `{0}` (available: adamsblake20, lai22, carreres23, ravouxcarreres)")]
    UnknownPreset(String),
    /// The model file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Model file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The JSON is malformed or a kernel does not parse.
    #[error("invalid model description: {0}")]
    Json(#[from] serde_json::Error),
    /// The model's terms do not form a valid task grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// The built-in model `name`.
///
/// # Errors
///
/// Returns [`ModelError::UnknownPreset`] for a name not in [`PRESETS`].
pub fn preset(name: &str) -> Result<ModelSpec, ModelError> {
    let model = match name.trim() {
        "adamsblake20" => presets::adamsblake20(),
        "lai22" => presets::lai22(),
        "carreres23" => presets::carreres23(),
        "ravouxcarreres" => presets::ravouxcarreres(),
        other => {
            warn!(name = other, "unknown model preset");
            return Err(ModelError::UnknownPreset(other.to_string()));
        }
    };
    Ok(model)
}

/// Parses and validates a JSON model description.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, a kernel does not parse, or the
/// terms do not match the geometry.
pub fn parse_model(json: &str) -> Result<ModelSpec, ModelError> {
    let model: ModelSpec = serde_json::from_str(json)?;
    let grid = build_jobs(&model)?;
    debug!(model = %model.name, jobs = grid.len(), "parsed model description");
    Ok(model)
}

/// Reads a JSON model description from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or [`parse_model`] fails.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelSpec, ModelError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_model(&json)
}

/// Serialises `model` as pretty-printed JSON readable by [`parse_model`].
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn to_json(model: &ModelSpec) -> Result<String, ModelError> {
    Ok(serde_json::to_string_pretty(model)?)
}

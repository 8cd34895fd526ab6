//! Rendering of a term pool as a Python module.

use std::fmt::Write;

use flipsym_core::Expr;
use flipsym_decompose::{Geometry, GridError, JobKey, ModelSpec, TaskGrid, TermPair, TermSpec};
use tracing::debug;

use crate::repr::{PyDict, PyRepr};
use crate::EmitError;

const HEADER: &str = "import numpy as np\nimport scipy\n\n\n";

/// Python source for `expr` using numpy and scipy names.
#[must_use]
pub fn python_source(expr: &Expr) -> String {
    expr.to_python()
        .replace("math.erf", "scipy.special.erf")
        .replace("math.", "np.")
}

/// Keys of one `(type, term, l)` group, in grid order.
fn group_keys(
    geometry: Geometry,
    ty: &str,
    term: &TermSpec,
    l: u32,
) -> Result<Vec<JobKey>, GridError> {
    match (geometry, term.sub_degrees) {
        (Geometry::PlaneParallel, None) => Ok(vec![JobKey::PlaneParallel {
            ty: ty.to_string(),
            term: term.index.clone(),
            l,
        }]),
        (Geometry::WideAngle, Some(bounds)) => {
            let mut keys = Vec::new();
            for l1 in 0..=bounds.l1max {
                for l2 in 0..=bounds.l2max {
                    keys.push(JobKey::WideAngle {
                        ty: ty.to_string(),
                        term: term.index.clone(),
                        l,
                        l1,
                        l2,
                    });
                }
            }
            Ok(keys)
        }
        (Geometry::WideAngle, None) => Err(GridError::MissingSubDegrees {
            ty: ty.to_string(),
            term: term.index.clone(),
        }),
        (Geometry::PlaneParallel, Some(_)) => Err(GridError::UnexpectedSubDegrees {
            ty: ty.to_string(),
            term: term.index.clone(),
        }),
    }
}

fn write_pair(out: &mut String, name: &str, params: &str, pair: &TermPair) {
    let _ = write!(
        out,
        "def M_{name}({params}):\n    def func(k):\n        return({})\n    return(func)\n\n",
        python_source(&pair.m)
    );
    let _ = write!(
        out,
        "def N_{name}(theta,phi):\n    return({})\n\n",
        python_source(&pair.n)
    );
}

/// Renders the Python module for `model`.
///
/// `pool[i]` must be the pair of `grid.jobs()[i]`. Pairs with a zero member
/// are skipped; the surviving pairs of each `{type}_{term}_{l}` group are
/// numbered from 0 and counted in `dictionary_subterms`.
///
/// # Errors
///
/// Returns an error if the pool and grid lengths differ, or if a key implied
/// by the model is not in the grid.
pub fn render_model(model: &ModelSpec, grid: &TaskGrid, pool: &[TermPair]) -> Result<String, EmitError> {
    if pool.len() != grid.len() {
        return Err(EmitError::PoolMismatch {
            jobs: grid.len(),
            results: pool.len(),
        });
    }

    let params = model
        .additional_parameters
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(",");

    let mut out = String::from(HEADER);
    let mut terms = PyDict::new();
    let mut lmax = PyDict::new();
    let mut subterms = PyDict::new();
    let mut functions = 0usize;

    for ty in &model.types {
        terms.insert(
            ty.name.as_str(),
            ty.terms.iter().map(|t| t.index.clone()).collect::<Vec<_>>(),
        );
        lmax.insert(ty.name.as_str(), ty.terms.iter().map(|t| t.lmax).collect::<Vec<_>>());

        for term in &ty.terms {
            for l in 0..=term.lmax {
                let mut j = 0usize;
                for key in group_keys(model.geometry, &ty.name, term, l)? {
                    let position = grid
                        .position(&key)
                        .ok_or_else(|| EmitError::MissingKey(key.to_string()))?;
                    let pair = &pool[position];
                    if pair.is_empty() {
                        continue;
                    }
                    write_pair(&mut out, &format!("{}_{j}", key.group()), &params, pair);
                    j += 1;
                }
                subterms.insert(format!("{}_{}_{l}", ty.name, term.index), j);
                functions += j;
            }
        }
    }

    let _ = writeln!(out, "dictionary_terms = {}", terms.to_py_repr());
    let _ = writeln!(out, "dictionary_lmax = {}", lmax.to_py_repr());
    let _ = writeln!(out, "dictionary_subterms = {}", subterms.to_py_repr());
    let _ = writeln!(out, "multi_index_model = {}", model.multi_index_model.to_py_repr());

    debug!(model = %model.name, pairs = functions, bytes = out.len(), "rendered model");
    Ok(out)
}

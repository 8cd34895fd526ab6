//! Model descriptions and the task grid.
//!
//! A [`ModelSpec`] lists correlation types, each with its terms; every term
//! has a kernel and inclusive degree bounds. [`build_jobs`] flattens that into
//! one [`Job`] per degree combination, in a fixed order:
//!
//! ```text
//! for type in declaration order
//!   for term in declaration order
//!     for l in 0..=lmax
//!       for l1 in 0..=l1max      (wide-angle only)
//!         for l2 in 0..=l2max    (wide-angle only)
//! ```

use flipsym_core::{Expr, Symbol};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::key::{Geometry, JobKey};

/// Errors from [`build_jobs`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A wide-angle term without `l1max`/`l2max`.
    #[error("wide-angle term {ty}_{term} needs l1max and l2max")]
    MissingSubDegrees {
        /// Type name.
        ty: String,
        /// Term index.
        term: String,
    },
    /// A plane-parallel term with `l1max`/`l2max`.
    #[error("plane-parallel term {ty}_{term} cannot have l1max or l2max")]
    UnexpectedSubDegrees {
        /// Type name.
        ty: String,
        /// Term index.
        term: String,
    },
    /// Two types with the same name.
    #[error("duplicate type `{0}`")]
    DuplicateType(String),
    /// Two terms with the same index in one type.
    #[error("duplicate term `{term}` in type `{ty}`")]
    DuplicateTerm {
        /// Type name.
        ty: String,
        /// Term index.
        term: String,
    },
    /// A type or term name that cannot appear in a generated identifier.
    #[error("`{0}` is not a valid type or term name")]
    InvalidName(String),
}

/// Inclusive bounds of the two wide-angle sub-degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDegreeBounds {
    /// Largest degree in the first direction cosine.
    pub l1max: u32,
    /// Largest degree in the second direction cosine.
    pub l2max: u32,
}

/// One term of a correlation type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSpec {
    /// Term index, used verbatim in generated names.
    pub index: String,
    /// The kernel `B`.
    pub kernel: Expr,
    /// Largest leading degree.
    pub lmax: u32,
    /// Sub-degree bounds, required in wide-angle mode only.
    #[serde(flatten)]
    pub sub_degrees: Option<SubDegreeBounds>,
}

impl TermSpec {
    /// A plane-parallel term.
    #[must_use]
    pub fn plane_parallel(index: &str, kernel: Expr, lmax: u32) -> Self {
        Self {
            index: index.to_string(),
            kernel,
            lmax,
            sub_degrees: None,
        }
    }

    /// A wide-angle term.
    #[must_use]
    pub fn wide_angle(index: &str, kernel: Expr, lmax: u32, l1max: u32, l2max: u32) -> Self {
        Self {
            index: index.to_string(),
            kernel,
            lmax,
            sub_degrees: Some(SubDegreeBounds { l1max, l2max }),
        }
    }
}

/// A correlation type and its terms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Type name, e.g. `gg`, `gv`, `vv`.
    pub name: String,
    /// Terms in declaration order.
    pub terms: Vec<TermSpec>,
}

/// A complete model description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model name; the default output directory.
    pub name: String,
    /// Observer geometry.
    pub geometry: Geometry,
    /// Extra parameters of the generated M functions, besides `k`.
    #[serde(default)]
    pub additional_parameters: Vec<Symbol>,
    /// Whether term indices are `{i}_{m}` pairs.
    #[serde(default)]
    pub multi_index_model: bool,
    /// Types in declaration order.
    pub types: Vec<TypeSpec>,
}

/// One unit of work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    /// Grid position.
    pub key: JobKey,
    /// Kernel of the key's type and term; shared with the other degrees.
    pub kernel: Expr,
}

/// The flattened job list and its key index.
#[derive(Clone, Debug, Default)]
pub struct TaskGrid {
    jobs: Vec<Job>,
    index: FxHashMap<JobKey, usize>,
}

impl TaskGrid {
    /// Jobs in grid order.
    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Number of jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns true if there are no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Position of `key` in the job list.
    #[must_use]
    pub fn position(&self, key: &JobKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// The job whose key renders as `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.key.to_string() == name)
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Expands `model` into its task grid.
///
/// # Errors
///
/// Returns an error if sub-degree bounds do not match the geometry, a type or
/// term name is repeated, or a name cannot be used in an identifier.
pub fn build_jobs(model: &ModelSpec) -> Result<TaskGrid, GridError> {
    let mut grid = TaskGrid::default();
    let mut types = FxHashSet::default();

    for ty in &model.types {
        if !valid_name(&ty.name) {
            return Err(GridError::InvalidName(ty.name.clone()));
        }
        if !types.insert(ty.name.as_str()) {
            return Err(GridError::DuplicateType(ty.name.clone()));
        }
        let mut terms = FxHashSet::default();
        for term in &ty.terms {
            if !valid_name(&term.index) {
                return Err(GridError::InvalidName(term.index.clone()));
            }
            if !terms.insert(term.index.as_str()) {
                return Err(GridError::DuplicateTerm {
                    ty: ty.name.clone(),
                    term: term.index.clone(),
                });
            }
            push_term(&mut grid, model.geometry, &ty.name, term)?;
        }
    }

    debug!(model = %model.name, jobs = grid.len(), "built task grid");
    Ok(grid)
}

fn push_term(
    grid: &mut TaskGrid,
    geometry: Geometry,
    ty: &str,
    term: &TermSpec,
) -> Result<(), GridError> {
    let mut push = |key: JobKey| {
        grid.index.insert(key.clone(), grid.jobs.len());
        grid.jobs.push(Job {
            key,
            kernel: term.kernel.clone(),
        });
    };

    match (geometry, term.sub_degrees) {
        (Geometry::PlaneParallel, None) => {
            for l in 0..=term.lmax {
                push(JobKey::PlaneParallel {
                    ty: ty.to_string(),
                    term: term.index.clone(),
                    l,
                });
            }
            Ok(())
        }
        (Geometry::WideAngle, Some(bounds)) => {
            for l in 0..=term.lmax {
                for l1 in 0..=bounds.l1max {
                    for l2 in 0..=bounds.l2max {
                        push(JobKey::WideAngle {
                            ty: ty.to_string(),
                            term: term.index.clone(),
                            l,
                            l1,
                            l2,
                        });
                    }
                }
            }
            Ok(())
        }
        (Geometry::PlaneParallel, Some(_)) => Err(GridError::UnexpectedSubDegrees {
            ty: ty.to_string(),
            term: term.index.clone(),
        }),
        (Geometry::WideAngle, None) => Err(GridError::MissingSubDegrees {
            ty: ty.to_string(),
            term: term.index.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipsym_core::parse;

    fn kernel(s: &str) -> Expr {
        parse(s).unwrap()
    }

    fn plane_model() -> ModelSpec {
        ModelSpec {
            name: "toy".to_string(),
            geometry: Geometry::PlaneParallel,
            additional_parameters: vec![],
            multi_index_model: false,
            types: vec![
                TypeSpec {
                    name: "gg".to_string(),
                    terms: vec![
                        TermSpec::plane_parallel("0", Expr::one(), 2),
                        TermSpec::plane_parallel("1", kernel("(^ mu 2)"), 1),
                    ],
                },
                TypeSpec {
                    name: "vv".to_string(),
                    terms: vec![TermSpec::plane_parallel("0", kernel("(/ (^ mu 2) (^ k 2))"), 0)],
                },
            ],
        }
    }

    #[test]
    fn test_plane_parallel_order() {
        let grid = build_jobs(&plane_model()).unwrap();
        let names: Vec<String> = grid.jobs().iter().map(|j| j.key.to_string()).collect();
        assert_eq!(names, ["gg_0_0", "gg_0_1", "gg_0_2", "gg_1_0", "gg_1_1", "vv_0_0"]);
        for (i, job) in grid.jobs().iter().enumerate() {
            assert_eq!(grid.position(&job.key), Some(i));
        }
    }

    fn wide_model() -> ModelSpec {
        ModelSpec {
            name: "toy".to_string(),
            geometry: Geometry::WideAngle,
            additional_parameters: vec![],
            multi_index_model: false,
            types: vec![TypeSpec {
                name: "vv".to_string(),
                terms: vec![TermSpec::wide_angle("0", kernel("(* mu1 mu2)"), 1, 1, 1)],
            }],
        }
    }

    #[test]
    fn test_wide_angle_order() {
        let grid = build_jobs(&wide_model()).unwrap();
        assert_eq!(grid.len(), 8);
        assert_eq!(grid.jobs()[0].key.to_string(), "vv_0_0_0_0");
        assert_eq!(grid.jobs()[1].key.to_string(), "vv_0_0_0_1");
        assert_eq!(grid.jobs()[2].key.to_string(), "vv_0_0_1_0");
        assert_eq!(grid.jobs()[7].key.to_string(), "vv_0_1_1_1");
        assert!(grid.find("vv_0_1_0_1").is_some());
    }

    #[test]
    fn test_deterministic() {
        let a = build_jobs(&plane_model()).unwrap();
        let b = build_jobs(&plane_model()).unwrap();
        assert_eq!(a.jobs(), b.jobs());
        assert_eq!(a.index, b.index);
        for (i, job) in a.jobs().iter().enumerate() {
            assert_eq!(a.position(&job.key), Some(i));
            assert_eq!(b.position(&job.key), Some(i));
        }

        let wide_a = build_jobs(&wide_model()).unwrap();
        let wide_b = build_jobs(&wide_model()).unwrap();
        assert_eq!(wide_a.jobs(), wide_b.jobs());
        assert_eq!(wide_a.index, wide_b.index);
    }

    #[test]
    fn test_kernels_are_shared() {
        let grid = build_jobs(&plane_model()).unwrap();
        assert_eq!(grid.jobs()[3].kernel, grid.jobs()[4].kernel);
    }

    #[test]
    fn test_validation() {
        let mut model = plane_model();
        model.types[0].terms[0].sub_degrees = Some(SubDegreeBounds { l1max: 1, l2max: 1 });
        assert!(matches!(build_jobs(&model), Err(GridError::UnexpectedSubDegrees { .. })));

        let mut model = plane_model();
        model.geometry = Geometry::WideAngle;
        assert!(matches!(build_jobs(&model), Err(GridError::MissingSubDegrees { .. })));

        let mut model = plane_model();
        model.types[1].name = "gg".to_string();
        assert_eq!(build_jobs(&model).unwrap_err(), GridError::DuplicateType("gg".to_string()));

        let mut model = plane_model();
        model.types[0].terms[1].index = "0".to_string();
        assert!(matches!(build_jobs(&model), Err(GridError::DuplicateTerm { .. })));

        let mut model = plane_model();
        model.types[0].name = "g-g".to_string();
        assert!(matches!(build_jobs(&model), Err(GridError::InvalidName(_))));
    }

    #[test]
    fn test_json_model() {
        let json = r#"{
            "name": "carreres23",
            "geometry": "wide_angle",
            "types": [
                { "name": "vv", "terms": [
                    { "index": "0", "kernel": "(/ (* 10000 mu1 mu2) (^ k 2))",
                      "lmax": 2, "l1max": 1, "l2max": 1 } ] } ]
        }"#;
        let model: ModelSpec = serde_json::from_str(json).unwrap();
        assert!(model.additional_parameters.is_empty());
        let term = &model.types[0].terms[0];
        assert_eq!(term.sub_degrees, Some(SubDegreeBounds { l1max: 1, l2max: 1 }));
        assert_eq!(build_jobs(&model).unwrap().len(), 12);

        let back: ModelSpec = serde_json::from_str(&serde_json::to_string(&model).unwrap()).unwrap();
        assert_eq!(back, model);
    }
}

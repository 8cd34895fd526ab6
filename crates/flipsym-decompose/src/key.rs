//! Job keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Observer geometry of a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    /// One line of sight; Legendre decomposition in `mu`.
    PlaneParallel,
    /// Two lines of sight; bipolar decomposition in `mu1`, `mu2`.
    WideAngle,
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Geometry::PlaneParallel => "plane-parallel",
            Geometry::WideAngle => "wide-angle",
        })
    }
}

/// Identifies one cell of the task grid.
///
/// Ordering is lexicographic by type, term, then degrees; grid order follows
/// declaration order instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobKey {
    /// A plane-parallel job.
    PlaneParallel {
        /// Correlation type, e.g. `gg`.
        ty: String,
        /// Term index within the type.
        term: String,
        /// Legendre degree.
        l: u32,
    },
    /// A wide-angle job.
    WideAngle {
        /// Correlation type, e.g. `gg`.
        ty: String,
        /// Term index within the type.
        term: String,
        /// Degree of the separation harmonic.
        l: u32,
        /// Degree in the first direction cosine.
        l1: u32,
        /// Degree in the second direction cosine.
        l2: u32,
    },
}

impl JobKey {
    /// Correlation type.
    #[must_use]
    pub fn ty(&self) -> &str {
        match self {
            JobKey::PlaneParallel { ty, .. } | JobKey::WideAngle { ty, .. } => ty,
        }
    }

    /// Term index.
    #[must_use]
    pub fn term(&self) -> &str {
        match self {
            JobKey::PlaneParallel { term, .. } | JobKey::WideAngle { term, .. } => term,
        }
    }

    /// Leading degree.
    #[must_use]
    pub fn l(&self) -> u32 {
        match self {
            JobKey::PlaneParallel { l, .. } | JobKey::WideAngle { l, .. } => *l,
        }
    }

    /// The geometry this key belongs to.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        match self {
            JobKey::PlaneParallel { .. } => Geometry::PlaneParallel,
            JobKey::WideAngle { .. } => Geometry::WideAngle,
        }
    }

    /// The `{type}_{term}_{l}` prefix shared by all sub-degrees.
    #[must_use]
    pub fn group(&self) -> String {
        format!("{}_{}_{}", self.ty(), self.term(), self.l())
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKey::PlaneParallel { ty, term, l } => write!(f, "{ty}_{term}_{l}"),
            JobKey::WideAngle {
                ty,
                term,
                l,
                l1,
                l2,
            } => write!(f, "{ty}_{term}_{l}_{l1}_{l2}"),
        }
    }
}

//! # flipsym-decompose
//!
//! Multipole decomposition of model kernels into M and N terms.
//!
//! This crate provides:
//! - [`plane_parallel`]: Legendre projection on one direction cosine
//! - [`wide_angle`]: projection on two direction cosines recombined with
//!   Gaunt-weighted spherical harmonics
//! - [`grid`]: typed model descriptions and the flattened task grid
//! - [`dispatch`]: an order-preserving run over a bounded rayon pool
//! - [`verify`]: numerical reconstruction and quadrature checks
//!
//! ## Example
//!
//! ```
//! use flipsym_core::{parse, Expr};
//! use flipsym_decompose::{plane_parallel::decompose_parallel, DecomposeConfig};
//!
//! let kernel = parse("(^ mu 2)").unwrap();
//! let pair = decompose_parallel(&kernel, 2, &DecomposeConfig::default()).unwrap();
//! assert_eq!(pair.m, Expr::rational(2, 3));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod decomposer;
pub mod dispatch;
pub mod grid;
pub mod key;
pub mod plane_parallel;
pub mod verify;
pub mod wide_angle;

#[cfg(test)]
mod proptests;

pub use config::{DecomposeConfig, Variables};
pub use decomposer::{DecomposeError, Decomposer, MultipoleDecomposer, TermPair};
pub use dispatch::{run, DispatchError};
pub use grid::{build_jobs, GridError, Job, ModelSpec, SubDegreeBounds, TaskGrid, TermSpec, TypeSpec};
pub use key::{Geometry, JobKey};
pub use verify::{quadrature_coefficient, verify_plane_parallel, VerifyError};

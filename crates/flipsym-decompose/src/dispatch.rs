//! Order-preserving parallel dispatch.
//!
//! Jobs are independent and CPU-bound. With more than one worker they run on
//! a dedicated rayon pool of exactly that size; the indexed parallel map keeps
//! `result[i]` aligned with `jobs[i]` whatever the completion order.

use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::decomposer::{DecomposeError, Decomposer, TermPair};
use crate::grid::Job;
use crate::key::JobKey;

/// Errors from [`run`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A worker count of zero.
    #[error("worker count must be at least 1")]
    NoWorkers,
    /// The thread pool could not be created.
    #[error("failed to build thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    /// A job failed; the run is abandoned.
    #[error("job {key} failed: {source}")]
    Job {
        /// Key of the failing job.
        key: JobKey,
        /// The decomposition error.
        #[source]
        source: DecomposeError,
    },
}

fn run_one<D: Decomposer + ?Sized>(decomposer: &D, job: &Job) -> Result<TermPair, DispatchError> {
    decomposer.decompose(job).map_err(|source| DispatchError::Job {
        key: job.key.clone(),
        source,
    })
}

/// Decomposes every job, returning results in job order.
///
/// # Errors
///
/// Returns [`DispatchError::NoWorkers`] for `worker_count == 0`, and the first
/// failing job otherwise. No partial results are returned.
pub fn run<D: Decomposer + ?Sized>(
    jobs: &[Job],
    decomposer: &D,
    worker_count: usize,
) -> Result<Vec<TermPair>, DispatchError> {
    if worker_count == 0 {
        return Err(DispatchError::NoWorkers);
    }
    info!(jobs = jobs.len(), workers = worker_count, "dispatching");
    let start = Instant::now();

    let pool = if worker_count == 1 {
        jobs.iter().map(|job| run_one(decomposer, job)).collect::<Result<Vec<_>, _>>()?
    } else {
        let threads = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("flipsym-worker-{i}"))
            .build()?;
        threads.install(|| {
            jobs.par_iter()
                .map(|job| run_one(decomposer, job))
                .collect::<Result<Vec<_>, _>>()
        })?
    };

    debug!(
        elapsed_ms = start.elapsed().as_millis(),
        empty = pool.iter().filter(|p| p.is_empty()).count(),
        "dispatch finished"
    );
    Ok(pool)
}

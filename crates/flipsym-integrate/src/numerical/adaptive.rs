//! Adaptive quadrature.
//!
//! Repeatedly bisects the subinterval with the largest error estimate until
//! the total estimate falls below tolerance.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::gauss_kronrod::GaussKronrodRule;

/// Result of adaptive integration.
#[derive(Clone, Copy, Debug)]
pub struct AdaptiveResult {
    /// Integral estimate.
    pub value: f64,
    /// Estimated absolute error.
    pub error: f64,
    /// Number of integrand evaluations.
    pub evaluations: usize,
    /// Number of subintervals at exit.
    pub intervals: usize,
    /// Whether the tolerance was reached.
    pub converged: bool,
}

#[derive(Clone, Debug)]
struct Interval {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.error == other.error
    }
}

impl Eq for Interval {}

impl PartialOrd for Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap by error
        self.error.total_cmp(&other.error)
    }
}

/// Integrates `f` over `[a, b]` to `max(abs_tol, rel_tol·|value|)`.
///
/// Gives up after `max_subdivisions` bisections and reports
/// `converged == false`.
pub fn adaptive_integrate<F: Fn(f64) -> f64>(
    f: &F,
    a: f64,
    b: f64,
    abs_tol: f64,
    rel_tol: f64,
    max_subdivisions: usize,
) -> AdaptiveResult {
    let rule = GaussKronrodRule::g7k15();
    let tolerance = |value: f64| abs_tol.max(rel_tol * value.abs());

    let initial = rule.integrate(f, a, b);
    let mut heap = BinaryHeap::new();
    heap.push(Interval {
        a,
        b,
        value: initial.value,
        error: initial.error,
    });
    let mut total_value = initial.value;
    let mut total_error = initial.error;
    let mut evaluations = initial.evaluations;

    let mut subdivisions = 0;
    while total_error > tolerance(total_value) && subdivisions < max_subdivisions {
        let Some(worst) = heap.pop() else { break };
        subdivisions += 1;

        let mid = (worst.a + worst.b) / 2.0;
        let left = rule.integrate(f, worst.a, mid);
        let right = rule.integrate(f, mid, worst.b);
        evaluations += left.evaluations + right.evaluations;

        total_value += left.value + right.value - worst.value;
        total_error += left.error + right.error - worst.error;

        heap.push(Interval {
            a: worst.a,
            b: mid,
            value: left.value,
            error: left.error,
        });
        heap.push(Interval {
            a: mid,
            b: worst.b,
            value: right.value,
            error: right.error,
        });
    }

    AdaptiveResult {
        value: total_value,
        error: total_error,
        evaluations,
        intervals: heap.len(),
        converged: total_error <= tolerance(total_value),
    }
}

//! The simplification engine.
//!
//! Both strategies run the same fixed-point loop: rewrite, compare with the
//! previous expression, stop when nothing changes or when the iteration
//! budget is spent. The refinement step is TR8 followed by factoring; the
//! strategies differ only in the first rewrite.

use flipsym_core::{parse, Expr, NormalForm};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cost::count_ops;
use crate::factor::factor;
use crate::strategy::{SimplifyError, Strategy};
use crate::tr8::tr8;

/// Default refinement budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Configuration for the simplification engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifierConfig {
    /// Maximum number of refinements.
    pub max_iterations: usize,
    /// Strategy for radial (M) terms.
    pub m_strategy: Strategy,
    /// Strategy for angular (N) terms.
    pub n_strategy: Strategy,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            m_strategy: Strategy::Direct,
            n_strategy: Strategy::TrigFirst,
        }
    }
}

/// Outcome of one simplifier call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Simplified {
    /// The last expression produced.
    pub expr: Expr,
    /// Number of refinements run.
    pub iterations: usize,
    /// Whether a fixed point was reached within the budget.
    pub converged: bool,
}

/// The main simplification engine.
#[derive(Clone, Debug, Default)]
pub struct Simplifier {
    config: SimplifierConfig,
}

impl Simplifier {
    /// Creates a simplifier with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simplifier with custom configuration.
    #[must_use]
    pub fn with_config(config: SimplifierConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &SimplifierConfig {
        &self.config
    }

    /// Simplifies with an explicit strategy.
    #[must_use]
    pub fn simplify(&self, expr: &Expr, strategy: Strategy) -> Simplified {
        simplify(expr, strategy, self.config.max_iterations)
    }

    /// Simplifies a radial term.
    #[must_use]
    pub fn simplify_m(&self, expr: &Expr) -> Simplified {
        self.simplify(expr, self.config.m_strategy)
    }

    /// Simplifies an angular term.
    #[must_use]
    pub fn simplify_n(&self, expr: &Expr) -> Simplified {
        self.simplify(expr, self.config.n_strategy)
    }

    /// Simplifies an s-expression with a strategy given by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression cannot be parsed or the strategy
    /// is unknown.
    pub fn simplify_str(&self, expr: &str, strategy: &str) -> Result<Simplified, SimplifyError> {
        let strategy: Strategy = strategy.parse()?;
        let parsed = parse(expr)?;
        Ok(self.simplify(&parsed, strategy))
    }
}

/// Simplifies `expr` with `strategy`, running at most `max_iterations`
/// refinements.
///
/// Always returns the last expression; `converged` is false when the budget
/// ran out before a fixed point.
#[must_use]
pub fn simplify(expr: &Expr, strategy: Strategy, max_iterations: usize) -> Simplified {
    let first = match strategy {
        Strategy::Direct => general,
        Strategy::TrigFirst => refine,
    };
    let outcome = fixed_point(expr.clone(), first, refine, max_iterations);
    debug!(
        %strategy,
        iterations = outcome.iterations,
        converged = outcome.converged,
        ops = count_ops(&outcome.expr),
        "simplified"
    );
    if !outcome.converged {
        debug!(%strategy, max_iterations, "simplification did not reach a fixed point");
    }
    outcome
}

/// The cheapest of the expanded, factored and power-reduced forms.
///
/// Ties go to the earlier candidate.
#[must_use]
pub fn general(expr: &Expr) -> Expr {
    let nf = NormalForm::from_expr(expr);
    let candidates = [nf.to_expr(), factor(&nf), factor(&tr8(&nf))];
    let mut best: Option<(usize, Expr)> = None;
    for candidate in candidates {
        let cost = count_ops(&candidate);
        if best.as_ref().map_or(true, |(c, _)| cost < *c) {
            best = Some((cost, candidate));
        }
    }
    best.map_or_else(|| expr.clone(), |(_, e)| e)
}

/// One refinement: TR8 followed by factoring.
#[must_use]
pub fn refine(expr: &Expr) -> Expr {
    factor(&tr8(&NormalForm::from_expr(expr)))
}

/// Applies `first`, then `step` until the result stops changing.
fn fixed_point(
    input: Expr,
    first: impl Fn(&Expr) -> Expr,
    step: impl Fn(&Expr) -> Expr,
    max_iterations: usize,
) -> Simplified {
    let mut previous = input;
    let mut current = first(&previous);
    let mut iterations = 0;
    while current != previous && iterations < max_iterations {
        let next = step(&current);
        previous = current;
        current = next;
        iterations += 1;
    }
    Simplified {
        converged: current == previous,
        expr: current,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    fn phi() -> Expr {
        Expr::symbol("phi")
    }

    #[test]
    fn test_simplify_basic() {
        let simplifier = Simplifier::new();
        let r = simplifier.simplify_str("(+ x 0)", "direct").unwrap();
        assert_eq!(r.expr, Expr::symbol("x"));
        assert!(r.converged);
        let r = simplifier.simplify_str("(* x 0)", "direct").unwrap();
        assert!(r.expr.is_zero());
    }

    #[test]
    fn test_simplify_trig() {
        let simplifier = Simplifier::new();
        let r = simplifier
            .simplify_str("(+ (^ (sin x) 2) (^ (cos x) 2))", "trig-first")
            .unwrap();
        assert_eq!(r.expr, Expr::one());
    }

    #[test]
    fn test_legendre_in_cosine() {
        // P_2(cos φ) = (3 cos(2φ) + 1)/4
        let p2 = Expr::rational(3, 2) * phi().cos().powi(2) - Expr::rational(1, 2);
        let r = simplify(&p2, Strategy::TrigFirst, DEFAULT_MAX_ITERATIONS);
        assert!(r.converged);
        let expected = Expr::rational(1, 4) * (Expr::integer(3) * (Expr::integer(2) * phi()).cos() + Expr::one());
        assert_eq!(r.expr, expected);
    }

    #[test]
    fn test_direct_picks_factored_form() {
        // 200/(3k) + 40 s/k stays over one denominator
        let k = Expr::symbol("k");
        let s = Expr::symbol("s");
        let e = Expr::rational(200, 3) / k.clone() + Expr::integer(40) * s / k;
        let r = simplify(&e, Strategy::Direct, DEFAULT_MAX_ITERATIONS);
        assert!(r.converged);
        assert_eq!(NormalForm::from_expr(&r.expr), NormalForm::from_expr(&e));
        assert!(count_ops(&r.expr) <= count_ops(&NormalForm::from_expr(&e).to_expr()));
    }

    #[test]
    fn test_unchanged_input_needs_no_iteration() {
        let x = Expr::symbol("x");
        let r = simplify(&x, Strategy::Direct, DEFAULT_MAX_ITERATIONS);
        assert_eq!(r.iterations, 0);
        assert!(r.converged);
    }

    #[test]
    fn test_budget_is_respected() {
        // A rewrite that never settles
        let bump = |e: &Expr| e.clone() + Expr::one();
        let r = fixed_point(Expr::zero(), bump, bump, 5);
        assert_eq!(r.iterations, 5);
        assert!(!r.converged);
        assert_eq!(r.expr, Expr::integer(6));
    }

    #[test]
    fn test_zero_budget_returns_first_rewrite() {
        let p = phi().cos().powi(2);
        let r = simplify(&p, Strategy::TrigFirst, 0);
        assert_eq!(r.iterations, 0);
        assert_eq!(NormalForm::from_expr(&r.expr), tr8(&NormalForm::from_expr(&p)));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_at(level: Level, run: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, run);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_budget_exhaustion_logs_at_debug() {
        let p = phi().cos().powi(2);
        let quiet = logged_at(Level::INFO, || {
            assert!(!simplify(&p, Strategy::TrigFirst, 0).converged);
        });
        assert!(quiet.is_empty(), "{quiet}");
        let verbose = logged_at(Level::DEBUG, || {
            assert!(!simplify(&p, Strategy::TrigFirst, 0).converged);
        });
        assert!(verbose.contains("did not reach a fixed point"));
        assert!(verbose.contains("DEBUG"));
        assert!(!verbose.contains("WARN"));
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let err = Simplifier::new().simplify_str("x", "fu").unwrap_err();
        assert!(matches!(err, SimplifyError::UnknownStrategy(_)));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = SimplifierConfig {
            max_iterations: 7,
            ..SimplifierConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SimplifierConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        let partial: SimplifierConfig = serde_json::from_str(r#"{"n_strategy": "direct"}"#).unwrap();
        assert_eq!(partial.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(partial.n_strategy, Strategy::Direct);
    }
}

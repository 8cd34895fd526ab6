//! Property-based tests for the simplifier.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use proptest::strategy::Strategy as _;

    use flipsym_core::{Bindings, Expr, NormalForm};

    use crate::engine::{simplify, DEFAULT_MAX_ITERATIONS};
    use crate::factor::factor;
    use crate::strategy::Strategy;
    use crate::tr8::tr8;

    fn leaf() -> impl proptest::strategy::Strategy<Value = Expr> {
        prop_oneof![
            (-4i64..5).prop_map(Expr::integer),
            (-4i64..5, 1i64..4).prop_map(|(n, d)| Expr::rational(n, d)),
            Just(Expr::symbol("k")),
            Just(Expr::symbol("phi")),
        ]
    }

    fn arb_term() -> impl proptest::strategy::Strategy<Value = Expr> {
        leaf().prop_recursive(2, 12, 3, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::add),
                prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::mul),
                (inner.clone(), 0i64..3).prop_map(|(b, n)| b.powi(n)),
                inner.clone().prop_map(Expr::cos),
                inner.prop_map(Expr::sin),
            ]
        })
    }

    fn arb_strategy() -> impl proptest::strategy::Strategy<Value = Strategy> {
        prop_oneof![Just(Strategy::Direct), Just(Strategy::TrigFirst)]
    }

    fn bindings() -> Bindings {
        Bindings::new().with("k", 0.37).with("phi", 1.21)
    }

    proptest! {
        #[test]
        fn simplify_is_idempotent(e in arb_term(), strategy in arb_strategy()) {
            let once = simplify(&e, strategy, DEFAULT_MAX_ITERATIONS);
            prop_assume!(once.converged);
            let twice = simplify(&once.expr, strategy, DEFAULT_MAX_ITERATIONS);
            prop_assert_eq!(twice.expr, once.expr);
        }

        #[test]
        fn simplify_terminates_within_budget(
            e in arb_term(),
            strategy in arb_strategy(),
            budget in 0usize..4,
        ) {
            let r = simplify(&e, strategy, budget);
            prop_assert!(r.iterations <= budget);
        }

        #[test]
        fn simplify_preserves_value(e in arb_term(), strategy in arb_strategy()) {
            let before = e.eval(&bindings()).unwrap();
            prop_assume!(before.is_finite() && before.abs() < 1e6);
            let after = simplify(&e, strategy, DEFAULT_MAX_ITERATIONS).expr.eval(&bindings()).unwrap();
            prop_assert!((before - after).abs() <= 1e-8 * (1.0 + before.abs()), "{} vs {}", before, after);
        }

        #[test]
        fn factoring_expands_back(e in arb_term()) {
            let nf = NormalForm::from_expr(&e);
            prop_assert_eq!(NormalForm::from_expr(&factor(&nf)), nf);
        }

        #[test]
        fn tr8_is_idempotent(e in arb_term()) {
            let once = tr8(&NormalForm::from_expr(&e));
            prop_assert_eq!(tr8(&once), once);
        }
    }
}

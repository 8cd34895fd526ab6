//! Property-based tests for expressions and the normal form.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::eval::Bindings;
    use crate::expr::Expr;
    use crate::normal::{expand, NormalForm};
    use crate::parse::parse;

    fn leaf() -> impl Strategy<Value = Expr> {
        prop_oneof![
            (-4i64..5).prop_map(Expr::integer),
            (-4i64..5, 1i64..4).prop_map(|(n, d)| Expr::rational(n, d)),
            Just(Expr::symbol("x")),
            Just(Expr::symbol("y")),
            Just(Expr::pi()),
        ]
    }

    fn arb_expr(depth: u32) -> impl Strategy<Value = Expr> {
        leaf().prop_recursive(depth, 16, 3, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::add),
                prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::mul),
                (inner.clone(), 0i64..3).prop_map(|(b, n)| b.powi(n)),
                inner.clone().prop_map(Expr::cos),
                inner.clone().prop_map(Expr::sin),
                inner.prop_map(|e| (-e.clone() * e).exp()),
            ]
        })
    }

    proptest! {
        #[test]
        fn normal_form_round_trips(e in arb_expr(3)) {
            let nf = NormalForm::from_expr(&e);
            prop_assert_eq!(NormalForm::from_expr(&nf.to_expr()), nf);
        }

        #[test]
        fn expand_is_idempotent(e in arb_expr(3)) {
            let once = expand(&e);
            prop_assert_eq!(expand(&once), once);
        }

        #[test]
        fn expand_preserves_value(e in arb_expr(2), x in 0.1f64..2.0, y in 0.1f64..2.0) {
            let b = Bindings::new().with("x", x).with("y", y);
            let before = e.eval(&b).unwrap();
            let after = expand(&e).eval(&b).unwrap();
            prop_assume!(before.is_finite() && before.abs() < 1e4);
            prop_assert!(
                (before - after).abs() <= 1e-6 * (1.0 + before.abs()),
                "{} vs {}", before, after
            );
        }

        #[test]
        fn root_of_square_is_absolute_value(
            e in arb_expr(2),
            x in -2.0f64..2.0,
            y in -2.0f64..2.0,
        ) {
            let b = Bindings::new().with("x", x).with("y", y);
            let value = e.eval(&b).unwrap();
            let root = expand(&e.powi(2).sqrt()).eval(&b).unwrap();
            prop_assume!(value.is_finite() && value.abs() < 1e4 && root.is_finite());
            prop_assert!(
                (root - value.abs()).abs() <= 1e-6 * (1.0 + value.abs()),
                "{} vs |{}|", root, value
            );
        }

        #[test]
        fn sexpr_round_trips(e in arb_expr(3)) {
            prop_assert_eq!(parse(&e.to_sexpr()).unwrap(), e);
        }

        #[test]
        fn product_expansion_commutes(a in arb_expr(2), b in arb_expr(2)) {
            let ab = NormalForm::from_expr(&(a.clone() * b.clone()));
            let ba = &NormalForm::from_expr(&b) * &NormalForm::from_expr(&a);
            prop_assert_eq!(ab, ba);
        }
    }
}

//! Property-based tests for exact moments.

#[cfg(test)]
mod tests {
    use flipsym_core::{Bindings, Expr, Symbol};
    use proptest::prelude::*;

    use crate::definite::integrate_unit_interval;
    use crate::numerical::integrate_gk31;

    proptest! {
        #[test]
        fn polynomial_moments_match_quadrature(
            coeffs in prop::collection::vec(-5i64..6, 1..6),
        ) {
            let mu = Expr::symbol("mu");
            let poly = Expr::add(coeffs.iter().enumerate().map(|(p, &c)| {
                Expr::integer(c) * mu.clone().powi(i64::try_from(p).unwrap())
            }));
            let exact = integrate_unit_interval(&poly, &Symbol::new("mu")).unwrap();
            let exact = exact.eval(&Bindings::new()).unwrap();
            let numeric = integrate_gk31(
                &|x: f64| {
                    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + f64::from(i32::try_from(c).unwrap()))
                },
                -1.0,
                1.0,
            );
            prop_assert!((exact - numeric.value).abs() < 1e-12);
        }

        #[test]
        fn gaussian_moments_match_quadrature(n in 0i64..8, width in 0.05f64..4.0) {
            let mu = Expr::symbol("mu");
            let a = Expr::symbol("a");
            let integrand = mu.clone().powi(n) * (-(a * mu.powi(2))).exp();
            let exact = integrate_unit_interval(&integrand, &Symbol::new("mu")).unwrap();
            let exact = exact.eval(&Bindings::new().with("a", width)).unwrap();
            let n = i32::try_from(n).unwrap();
            let numeric = integrate_gk31(&|x: f64| x.powi(n) * (-width * x * x).exp(), -1.0, 1.0);
            prop_assert!((exact - numeric.value).abs() < 1e-9, "{} vs {}", exact, numeric.value);
        }
    }
}

//! Property-based tests for emission.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use flipsym_core::Expr;
    use flipsym_decompose::{build_jobs, Geometry, ModelSpec, TermPair, TermSpec, TypeSpec};

    use crate::render_model;

    fn model(l1max: u32, l2max: u32) -> ModelSpec {
        ModelSpec {
            name: "prop".to_string(),
            geometry: Geometry::WideAngle,
            additional_parameters: vec![],
            multi_index_model: false,
            types: vec![TypeSpec {
                name: "gg".to_string(),
                terms: vec![TermSpec::wide_angle("0", Expr::one(), 2, l1max, l2max)],
            }],
        }
    }

    proptest! {
        #[test]
        fn one_function_pair_per_surviving_result(
            l1max in 0u32..3,
            l2max in 0u32..3,
            mask in prop::collection::vec(any::<bool>(), 27),
        ) {
            let model = model(l1max, l2max);
            let grid = build_jobs(&model).unwrap();
            let pool: Vec<TermPair> = mask
                .iter()
                .take(grid.len())
                .map(|&keep| if keep {
                    TermPair { m: Expr::symbol("k"), n: Expr::symbol("phi") }
                } else {
                    TermPair::zero()
                })
                .collect();
            let text = render_model(&model, &grid, &pool).unwrap();
            let kept = pool.iter().filter(|p| !p.is_empty()).count();
            prop_assert_eq!(text.matches("def M_").count(), kept);
            prop_assert_eq!(text.matches("def N_").count(), kept);
        }
    }
}

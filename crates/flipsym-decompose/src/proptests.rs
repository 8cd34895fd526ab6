//! Property-based tests for the task grid and the plane-parallel projection.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use flipsym_core::{Bindings, Expr};

    use crate::config::DecomposeConfig;
    use crate::grid::{build_jobs, ModelSpec, TermSpec, TypeSpec};
    use crate::key::Geometry;
    use crate::plane_parallel::decompose_parallel;
    use crate::verify::verify_plane_parallel;

    fn wide_model(bounds: &[(u32, u32, u32)]) -> ModelSpec {
        ModelSpec {
            name: "prop".to_string(),
            geometry: Geometry::WideAngle,
            additional_parameters: vec![],
            multi_index_model: false,
            types: vec![TypeSpec {
                name: "gv".to_string(),
                terms: bounds
                    .iter()
                    .enumerate()
                    .map(|(i, &(l, l1, l2))| {
                        TermSpec::wide_angle(&i.to_string(), Expr::symbol("mu1"), l, l1, l2)
                    })
                    .collect(),
            }],
        }
    }

    fn polynomial(coeffs: &[i64]) -> Expr {
        let mu = Expr::symbol("mu");
        Expr::add(
            coeffs
                .iter()
                .zip(0i64..)
                .map(|(&c, p)| Expr::integer(c) * mu.clone().powi(p)),
        )
    }

    proptest! {
        #[test]
        fn grid_has_one_slot_per_combination(
            bounds in prop::collection::vec((0u32..4, 0u32..3, 0u32..3), 1..4)
        ) {
            let grid = build_jobs(&wide_model(&bounds)).unwrap();
            let expected: u32 = bounds.iter().map(|(l, l1, l2)| (l + 1) * (l1 + 1) * (l2 + 1)).sum();
            prop_assert_eq!(grid.len(), expected as usize);
            for (i, job) in grid.jobs().iter().enumerate() {
                prop_assert_eq!(grid.position(&job.key), Some(i));
            }
            let again = build_jobs(&wide_model(&bounds)).unwrap();
            prop_assert_eq!(grid.jobs(), again.jobs());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn polynomial_kernels_reconstruct(coeffs in prop::collection::vec(-5i64..6, 1..5)) {
            let kernel = polynomial(&coeffs);
            let config = DecomposeConfig::default();
            let lmax = u32::try_from(coeffs.len()).unwrap();
            let pairs: Vec<_> = (0..=lmax)
                .map(|l| decompose_parallel(&kernel, l, &config).unwrap())
                .collect();
            let residual = verify_plane_parallel(&kernel, &pairs, &Bindings::new(), &config, 9).unwrap();
            prop_assert!(residual < 1e-11, "residual {}", residual);
        }
    }
}

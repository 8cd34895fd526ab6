//! Property-based tests for the coupling coefficients.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{erf, gaunt, legendre_p, wigner_3j};

    proptest! {
        #[test]
        fn legendre_bounded_on_unit_interval(l in 0u32..30, x in -1.0f64..1.0) {
            prop_assert!(legendre_p(l, x).abs() <= 1.0 + 1e-12);
        }

        #[test]
        fn erf_monotone(a in -6.0f64..6.0, b in -6.0f64..6.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(erf(lo) <= erf(hi));
        }

        #[test]
        fn wigner_3j_column_swap(
            j1 in 0u32..5, j2 in 0u32..5, j3 in 0u32..5,
            m1 in -4i32..=4, m2 in -4i32..=4
        ) {
            let m3 = -m1 - m2;
            let direct = wigner_3j(j1, j2, j3, m1, m2, m3);
            let swapped = wigner_3j(j2, j1, j3, m2, m1, m3);
            // Odd permutations pick up (-1)^(j1+j2+j3).
            let expected = if (j1 + j2 + j3) % 2 == 0 {
                direct.clone()
            } else {
                direct.scale(&flipsym_integers::Rational::from(-1))
            };
            prop_assert_eq!(swapped, expected);
        }

        #[test]
        fn gaunt_symmetric_under_permutation(
            l1 in 0u32..5, l2 in 0u32..5, l3 in 0u32..5,
            m1 in -4i32..=4, m2 in -4i32..=4
        ) {
            let m3 = -m1 - m2;
            prop_assert_eq!(gaunt(l1, l2, l3, m1, m2, m3), gaunt(l2, l3, l1, m2, m3, m1));
        }
    }
}

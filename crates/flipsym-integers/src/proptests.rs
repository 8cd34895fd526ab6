//! Property-based tests for exact arithmetic.

#[cfg(test)]
mod tests {
    use num_traits::{One, Zero};
    use proptest::prelude::*;

    use crate::{Integer, Rational};

    fn small_int() -> impl Strategy<Value = i64> {
        -1000i64..1000i64
    }

    fn non_zero_int() -> impl Strategy<Value = i64> {
        prop_oneof![(-1000i64..=-1i64), (1i64..=1000i64)]
    }

    proptest! {
        #[test]
        fn integer_distributive(a in small_int(), b in small_int(), c in small_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            let c = Integer::new(c);
            prop_assert_eq!(
                a.clone() * (b.clone() + c.clone()),
                a.clone() * b + a * c
            );
        }

        #[test]
        fn gcd_divides_both(a in non_zero_int(), b in non_zero_int()) {
            let a = Integer::new(a);
            let b = Integer::new(b);
            let g = a.gcd(&b);
            prop_assert!(a.is_divisible_by(&g));
            prop_assert!(b.is_divisible_by(&g));
        }

        #[test]
        fn sqrt_floor_brackets_root(n in 0i64..10_000_000i64) {
            let n = Integer::new(n);
            let r = n.sqrt_floor().unwrap();
            let r1 = r.clone() + Integer::one();
            prop_assert!(&r * &r <= n);
            prop_assert!(&r1 * &r1 > n);
        }

        #[test]
        fn split_square_recombines(n in 1i64..1_000_000i64) {
            let n = Integer::new(n);
            let (s, r) = n.split_square().unwrap();
            prop_assert_eq!(&(&s * &s) * &r, n);
            // No square of a small prime remains in the squarefree part.
            for p in [2i64, 3, 5, 7, 11, 13] {
                prop_assert!(!r.is_divisible_by(&Integer::new(p * p)));
            }
        }

        #[test]
        fn binomial_pascal_rule(n in 1u32..60u32, k in 1u32..60u32) {
            prop_assume!(k <= n);
            prop_assert_eq!(
                Integer::binomial(n, k),
                Integer::binomial(n - 1, k - 1) + Integer::binomial(n - 1, k)
            );
        }

        #[test]
        fn rational_distributive(
            num_a in small_int(),
            den_a in non_zero_int(),
            num_b in small_int(),
            den_b in non_zero_int(),
            num_c in small_int(),
            den_c in non_zero_int()
        ) {
            let a = Rational::from_i64(num_a, den_a);
            let b = Rational::from_i64(num_b, den_b);
            let c = Rational::from_i64(num_c, den_c);
            prop_assert_eq!(
                a.clone() * (b.clone() + c.clone()),
                a.clone() * b + a * c
            );
        }

        #[test]
        fn rational_sign_follows_parts(num in non_zero_int(), den in non_zero_int()) {
            let r = Rational::from_i64(num, den);
            prop_assert_eq!(r.is_negative(), (num < 0) != (den < 0));
            prop_assert!(!r.denominator().is_negative());
        }

        #[test]
        fn rational_multiplicative_inverse(num in non_zero_int(), den in non_zero_int()) {
            let a = Rational::from_i64(num, den);
            prop_assert!((a.clone() * a.recip()).is_one());
        }

        #[test]
        fn rational_floor_brackets(num in small_int(), den in non_zero_int()) {
            let r = Rational::from_i64(num, den);
            let f = Rational::from_integer(r.floor());
            prop_assert!(f <= r);
            prop_assert!(r < f + Rational::one());
        }

        #[test]
        fn rational_gcd_divides(
            num_a in non_zero_int(),
            den_a in non_zero_int(),
            num_b in non_zero_int(),
            den_b in non_zero_int()
        ) {
            let a = Rational::from_i64(num_a, den_a);
            let b = Rational::from_i64(num_b, den_b);
            let g = a.gcd(&b);
            prop_assert!(!g.is_zero());
            prop_assert!((&a / &g).is_integer());
            prop_assert!((&b / &g).is_integer());
        }

        #[test]
        fn rational_square_has_exact_root(num in small_int(), den in 1i64..1000i64) {
            let r = Rational::from_i64(num, den);
            let square = &r * &r;
            prop_assert_eq!(square.sqrt_exact(), Some(r.abs()));
        }
    }
}

//! Wigner 3j symbols and Gaunt coefficients.
//!
//! Both are computed exactly with the Racah formula. A 3j symbol with integer
//! arguments is always of the form `q · sqrt(r)` with rational `q` and
//! squarefree integer `r`, which is what [`Surd`] stores.
//!
//! The Gaunt coefficient is the integral of three spherical harmonics:
//!
//! G(l1,l2,l3,m1,m2,m3) = ∫ Y_l1^m1 Y_l2^m2 Y_l3^m3 dΩ
//!   = sqrt((2l1+1)(2l2+1)(2l3+1)/(4π)) · W(l1 l2 l3; 0 0 0) · W(l1 l2 l3; m1 m2 m3)

use std::fmt;
use std::ops::Mul;

use flipsym_integers::{Integer, Rational};
use num_traits::{One, Zero};

/// An exact number `coeff · sqrt(radicand)` with squarefree `radicand >= 1`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Surd {
    coeff: Rational,
    radicand: Integer,
}

impl Surd {
    /// The surd zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::from_rational(Rational::zero())
    }

    /// A rational surd (radicand 1).
    #[must_use]
    pub fn from_rational(coeff: Rational) -> Self {
        Self {
            coeff,
            radicand: Integer::one(),
        }
    }

    /// The exact square root of a non-negative rational.
    ///
    /// `sqrt(p/q) = sqrt(p·q)/q`, and `p·q` is split into its square and
    /// squarefree parts. Returns `None` for negative input.
    #[must_use]
    pub fn sqrt_of(value: &Rational) -> Option<Self> {
        if value.is_negative() {
            return None;
        }
        if value.is_zero() {
            return Some(Self::zero());
        }
        let den = value.denominator();
        let (square, free) = (value.numerator() * den.clone()).split_square()?;
        Some(Self {
            coeff: Rational::new(square, den),
            radicand: free,
        })
    }

    /// The rational coefficient.
    #[must_use]
    pub fn coeff(&self) -> &Rational {
        &self.coeff
    }

    /// The squarefree radicand.
    #[must_use]
    pub fn radicand(&self) -> &Integer {
        &self.radicand
    }

    /// Returns true if this surd is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeff.is_zero()
    }

    /// Multiplies by a rational.
    #[must_use]
    pub fn scale(&self, factor: &Rational) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }
        Self {
            coeff: self.coeff.clone() * factor,
            radicand: self.radicand.clone(),
        }
    }

    /// Converts to the nearest `f64`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.coeff.to_f64() * self.radicand.to_f64().sqrt()
    }
}

impl Mul for &Surd {
    type Output = Surd;

    fn mul(self, rhs: Self) -> Surd {
        if self.is_zero() || rhs.is_zero() {
            return Surd::zero();
        }
        // sqrt(a) sqrt(b) = g sqrt((a/g)(b/g)) with g = gcd(a, b)
        let g = self.radicand.gcd(&rhs.radicand);
        let radicand = (self.radicand.clone() / g.clone()) * (rhs.radicand.clone() / g.clone());
        Surd {
            coeff: &self.coeff * &rhs.coeff * Rational::from_integer(g),
            radicand,
        }
    }
}

impl Mul for Surd {
    type Output = Surd;

    fn mul(self, rhs: Self) -> Surd {
        &self * &rhs
    }
}

impl fmt::Debug for Surd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Surd({self})")
    }
}

impl fmt::Display for Surd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.radicand.is_one() {
            write!(f, "{}", self.coeff)
        } else {
            write!(f, "{}*sqrt({})", self.coeff, self.radicand)
        }
    }
}

fn fact(n: i64) -> Integer {
    // Callers only pass arguments already checked to be non-negative.
    Integer::factorial(u32::try_from(n).unwrap_or(0))
}

fn triangle(j1: i64, j2: i64, j3: i64) -> bool {
    j3 >= (j1 - j2).abs() && j3 <= j1 + j2
}

/// The Wigner 3j symbol `(j1 j2 j3; m1 m2 m3)` for integer arguments.
///
/// Zero unless `m1 + m2 + m3 = 0`, `|mi| <= ji` and the triangle rule holds.
#[must_use]
pub fn wigner_3j(j1: u32, j2: u32, j3: u32, m1: i32, m2: i32, m3: i32) -> Surd {
    let (j1, j2, j3) = (i64::from(j1), i64::from(j2), i64::from(j3));
    let (m1, m2, m3) = (i64::from(m1), i64::from(m2), i64::from(m3));

    if m1 + m2 + m3 != 0
        || !triangle(j1, j2, j3)
        || m1.abs() > j1
        || m2.abs() > j2
        || m3.abs() > j3
    {
        return Surd::zero();
    }

    // Δ(j1 j2 j3) · Π (j ± m)!
    let delta = Rational::new(
        fact(j1 + j2 - j3) * fact(j1 - j2 + j3) * fact(-j1 + j2 + j3),
        fact(j1 + j2 + j3 + 1),
    );
    let weights = fact(j1 + m1)
        * fact(j1 - m1)
        * fact(j2 + m2)
        * fact(j2 - m2)
        * fact(j3 + m3)
        * fact(j3 - m3);

    let k_min = 0.max(j2 - j3 - m1).max(j1 - j3 + m2);
    let k_max = (j1 + j2 - j3).min(j1 - m1).min(j2 + m2);
    let mut sum = Rational::zero();
    for k in k_min..=k_max {
        let den = fact(k)
            * fact(j3 - j2 + k + m1)
            * fact(j3 - j1 + k - m2)
            * fact(j1 + j2 - j3 - k)
            * fact(j1 - k - m1)
            * fact(j2 - k + m2);
        let term = Rational::new(Integer::one(), den);
        sum = if k % 2 == 0 { sum + term } else { sum - term };
    }

    let Some(root) = Surd::sqrt_of(&(delta * Rational::from_integer(weights))) else {
        return Surd::zero();
    };
    let sign = if (j1 - j2 - m3).rem_euclid(2) == 0 {
        Rational::one()
    } else {
        -Rational::one()
    };
    root.scale(&(sum * sign))
}

/// The Gaunt coefficient, as the surd `g` with `G = g / sqrt(π)`.
///
/// Zero outside the selection rules: `m1 + m2 + m3 = 0`, the triangle rule,
/// an even `l1 + l2 + l3` and `|mi| <= li`.
#[must_use]
pub fn gaunt(l1: u32, l2: u32, l3: u32, m1: i32, m2: i32, m3: i32) -> Surd {
    if (l1 + l2 + l3) % 2 == 1 {
        return Surd::zero();
    }
    let w_m = wigner_3j(l1, l2, l3, m1, m2, m3);
    if w_m.is_zero() {
        return Surd::zero();
    }
    let w_0 = wigner_3j(l1, l2, l3, 0, 0, 0);
    // sqrt((2l1+1)(2l2+1)(2l3+1)/4)
    let dims = Rational::new(
        Integer::from(2 * l1 + 1) * Integer::from(2 * l2 + 1) * Integer::from(2 * l3 + 1),
        Integer::new(4),
    );
    let Some(norm) = Surd::sqrt_of(&dims) else {
        return Surd::zero();
    };
    &(&norm * &w_0) * &w_m
}

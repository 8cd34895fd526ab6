//! Arbitrary precision integers.
//!
//! This module provides a wrapper around `dashu::IBig` with the
//! combinatorial helpers needed by the coupling-coefficient code:
//! factorials, binomials, exact square roots and squarefree splitting.

use dashu::base::{Abs, BitTest, Gcd, Signed as DashuSigned};
use dashu::integer::IBig;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Primes used when splitting a radicand into square and squarefree parts.
///
/// Radicands produced by spherical-harmonic normalisations are ratios of
/// factorials times small odd integers, so their prime factors stay small.
const SMALL_PRIMES_LIMIT: u64 = 1000;

/// An arbitrary precision integer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Integer(IBig);

impl Integer {
    /// Creates a new integer from an i64.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(IBig::from(value))
    }

    /// Creates an integer from a string in the given base.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid integer.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self, dashu::base::error::ParseError> {
        IBig::from_str_radix(s, radix).map(Self)
    }

    /// Returns `n!`.
    #[must_use]
    pub fn factorial(n: u32) -> Self {
        (2..=i64::from(n)).fold(Self::one(), |acc, k| acc * Self::new(k))
    }

    /// Returns the binomial coefficient `C(n, k)`, zero when `k > n`.
    #[must_use]
    pub fn binomial(n: u32, k: u32) -> Self {
        if k > n {
            return Self::zero();
        }
        let k = k.min(n - k);
        let mut acc = Self::one();
        for i in 0..k {
            // Exact at every step: acc * (n - i) is divisible by (i + 1).
            acc = acc * Self::new(i64::from(n - i)) / Self::new(i64::from(i + 1));
        }
        acc
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    /// Returns the sign: -1, 0, or 1.
    #[must_use]
    pub fn signum(&self) -> i8 {
        if self.0.is_zero() {
            0
        } else if DashuSigned::is_positive(&self.0) {
            1
        } else {
            -1
        }
    }

    /// Returns true if this integer is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Returns true if this integer is even.
    #[must_use]
    pub fn is_even(&self) -> bool {
        (self.clone() % Self::new(2)).is_zero()
    }

    /// Returns true if `divisor` divides this integer exactly.
    #[must_use]
    pub fn is_divisible_by(&self, divisor: &Self) -> bool {
        !divisor.is_zero() && (self.clone() % divisor.clone()).is_zero()
    }


    /// Computes the greatest common divisor.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        Self(IBig::from(self.0.clone().gcd(other.0.clone())))
    }

    /// Computes the least common multiple.
    #[must_use]
    pub fn lcm(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let g = self.gcd(other);
        Self(&self.0 / &g.0 * &other.0).abs()
    }

    /// Returns `floor(sqrt(self))`, or `None` for negative values.
    #[must_use]
    pub fn sqrt_floor(&self) -> Option<Self> {
        if self.is_negative() {
            return None;
        }
        if self.is_zero() || self.is_one() {
            return Some(self.clone());
        }
        // Newton iteration from a starting point above the root.
        let half_bits = u32::try_from(self.0.bit_len().div_ceil(2)).ok()?;
        let mut x = Self::new(2).pow(half_bits);
        loop {
            let y = (x.clone() + self.clone() / x.clone()) / Self::new(2);
            if y >= x {
                return Some(x);
            }
            x = y;
        }
    }

    /// Returns the exact square root if this integer is a perfect square.
    #[must_use]
    pub fn sqrt_exact(&self) -> Option<Self> {
        let root = self.sqrt_floor()?;
        (&root * &root == *self).then_some(root)
    }

    /// Splits a positive integer into `(s, r)` with `self = s² · r`.
    ///
    /// `r` is squarefree with respect to every prime below 1000; a large
    /// leftover cofactor is absorbed into `s` only when it is a perfect
    /// square. Returns `None` for zero or negative input.
    #[must_use]
    pub fn split_square(&self) -> Option<(Self, Self)> {
        if self.signum() <= 0 {
            return None;
        }
        let mut rest = self.clone();
        let mut square = Self::one();
        let mut free = Self::one();

        for p in (2..SMALL_PRIMES_LIMIT).filter(|&p| is_small_prime(p)) {
            let prime = Self::from(p);
            if &prime * &prime > rest {
                break;
            }
            let mut exponent = 0u32;
            while rest.is_divisible_by(&prime) {
                rest = rest / prime.clone();
                exponent += 1;
            }
            square = square * prime.pow(exponent / 2);
            if exponent % 2 == 1 {
                free = free * prime.clone();
            }
        }

        if !rest.is_one() {
            match rest.sqrt_exact() {
                Some(root) => square = square * root,
                None => free = free * rest,
            }
        }
        Some((square, free))
    }

    /// Returns the inner `dashu::IBig`.
    #[must_use]
    pub fn into_inner(self) -> IBig {
        self.0
    }


    /// Attempts to convert to an i64.
    ///
    /// Returns `None` if the value doesn't fit in an i64.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.clone().try_into().ok()
    }

    /// Converts to the nearest `f64` (infinite if out of range).
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.to_i64().map_or_else(
            || self.0.to_string().parse::<f64>().unwrap_or(f64::NAN),
            // Loses precision only above 2^53, which is acceptable for evaluation.
            |v| v as f64,
        )
    }

    /// Computes self^exp for non-negative exp.
    #[must_use]
    pub fn pow(&self, exp: u32) -> Self {
        Self(self.0.pow(exp as usize))
    }
}

fn is_small_prime(n: u64) -> bool {
    n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

impl Zero for Integer {
    fn zero() -> Self {
        Self(IBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Integer {
    fn one() -> Self {
        Self(IBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == IBig::ONE
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Integer({})", self.0)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Integer {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add for &Integer {
    type Output = Integer;

    fn add(self, rhs: Self) -> Self::Output {
        Integer(&self.0 + &rhs.0)
    }
}

impl Sub for Integer {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub for &Integer {
    type Output = Integer;

    fn sub(self, rhs: Self) -> Self::Output {
        Integer(&self.0 - &rhs.0)
    }
}

impl Mul for Integer {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul for &Integer {
    type Output = Integer;

    fn mul(self, rhs: Self) -> Self::Output {
        Integer(&self.0 * &rhs.0)
    }
}

impl Div for Integer {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Rem for Integer {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self::Output {
        Self(self.0 % rhs.0)
    }
}

impl Neg for Integer {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Integer {
    type Output = Integer;

    fn neg(self) -> Self::Output {
        Integer(-&self.0)
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<i32> for Integer {
    fn from(value: i32) -> Self {
        Self::new(i64::from(value))
    }
}

impl From<u32> for Integer {
    fn from(value: u32) -> Self {
        Self::new(i64::from(value))
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self(IBig::from(value))
    }
}

impl From<IBig> for Integer {
    fn from(value: IBig) -> Self {
        Self(value)
    }
}

//! Prime fields `Z / pZ` with a 64-bit prime `p`.

use std::fmt::{self, Display, Formatter};

use rand::Rng;

use super::{Field, Ring};
use crate::error::{LinalgError, Result};

/// An element of a [FiniteField], stored in the range `[0, p)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiniteFieldElement(pub(crate) u64);

impl FiniteFieldElement {
    /// Return the canonical representative in `[0, p)`.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for FiniteFieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finite field over a prime `p`.
///
/// The field has no absolute value, so pivoting picks the first non-zero candidate,
/// and no square root. It is not accelerable: its exact arithmetic cannot be
/// expressed in double precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FiniteField {
    p: u64,
}

impl FiniteField {
    /// Create a new finite field. `p` must be a prime.
    pub fn new(p: u64) -> Result<FiniteField> {
        if !is_prime_u64(p) {
            return Err(LinalgError::InvalidConfiguration(format!(
                "{} is not a prime",
                p
            )));
        }

        Ok(FiniteField { p })
    }

    /// Map an integer into the field.
    pub fn to_element(&self, a: i64) -> FiniteFieldElement {
        FiniteFieldElement((a as i128).rem_euclid(self.p as i128) as u64)
    }
}

impl Display for FiniteField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Z_{}", self.p)
    }
}

impl Ring for FiniteField {
    type Element = FiniteFieldElement;

    #[inline]
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        let t = a.0 as u128 + b.0 as u128;
        if t >= self.p as u128 {
            FiniteFieldElement((t - self.p as u128) as u64)
        } else {
            FiniteFieldElement(t as u64)
        }
    }

    #[inline]
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        if a.0 >= b.0 {
            FiniteFieldElement(a.0 - b.0)
        } else {
            FiniteFieldElement(a.0 + (self.p - b.0))
        }
    }

    #[inline]
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        FiniteFieldElement(((a.0 as u128 * b.0 as u128) % self.p as u128) as u64)
    }

    #[inline]
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.add(a, b);
    }

    #[inline]
    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.sub(a, b);
    }

    #[inline]
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.mul(a, b);
    }

    #[inline]
    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        *a = self.add(a, &self.mul(b, c));
    }

    #[inline]
    fn sub_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        *a = self.sub(a, &self.mul(b, c));
    }

    #[inline]
    fn neg(&self, a: &Self::Element) -> Self::Element {
        if a.0 == 0 {
            *a
        } else {
            FiniteFieldElement(self.p - a.0)
        }
    }

    #[inline]
    fn zero(&self) -> Self::Element {
        FiniteFieldElement(0)
    }

    #[inline]
    fn one(&self) -> Self::Element {
        FiniteFieldElement(1)
    }

    #[inline]
    fn is_zero(a: &Self::Element) -> bool {
        a.0 == 0
    }

    #[inline]
    fn is_one(&self, a: &Self::Element) -> bool {
        a.0 == 1
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element {
        self.to_element(rng.gen_range(range.0..range.1))
    }
}

impl Field for FiniteField {
    /// Computes x^-1 mod p with the extended Euclidean algorithm.
    fn inv(&self, a: &Self::Element) -> Result<Self::Element> {
        if a.0 == 0 {
            return Err(LinalgError::DivisionByZero);
        }

        // a x + b p = gcd(x, p) = 1 or a x = 1 (mod p)
        let mut u1: u64 = 1;
        let mut u3 = a.0;
        let mut v1: u64 = 0;
        let mut v3 = self.p;
        let mut even_iter: bool = true;

        while v3 != 0 {
            let q = u3 / v3;
            let t3 = u3 % v3;
            let t1 = u1 + q * v1;
            u1 = v1;
            v1 = t1;
            u3 = v3;
            v3 = t3;
            even_iter = !even_iter;
        }

        debug_assert!(u3 == 1);
        if even_iter {
            Ok(FiniteFieldElement(u1))
        } else {
            Ok(FiniteFieldElement(self.p - u1))
        }
    }
}

fn pow_mod(b: u64, mut e: u64, n: u64) -> u64 {
    let mut x = 1u128;
    let mut b = b as u128 % n as u128;
    while e != 0 {
        if e & 1 != 0 {
            x = x * b % n as u128;
        }
        b = b * b % n as u128;
        e /= 2;
    }
    x as u64
}

/// Do a deterministic Miller test to check if `n` is a prime.
/// Since `n` is a `u64`, a basis of only 7 witnesses has to be tested.
pub fn is_prime_u64(n: u64) -> bool {
    // shortest SPRP basis from Jim Sinclair for testing primality of u64
    let witnesses: [u64; 7] = [2, 325, 9375, 28178, 450775, 9780504, 1795265022];

    if n < 2 {
        return false;
    }

    if n % 2 == 0 {
        return n == 2;
    }

    let mut s = 0;
    let mut d = n - 1;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    'test: for a in witnesses {
        let a = a % n;

        if a == 0 {
            continue;
        }

        let mut x = pow_mod(a, d, n);

        if x == 1 || x == n - 1 {
            continue;
        }

        for _ in 0..s {
            x = ((x as u128 * x as u128) % n as u128) as u64;

            if x == 1 {
                return false;
            }
            if x == n - 1 {
                continue 'test;
            }
        }

        return false;
    }

    true
}

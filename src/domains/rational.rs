//! The field of rational numbers, with arbitrary precision.

use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use rand::Rng;
use rug::Rational;

use super::{Field, Ring};
use crate::error::{LinalgError, Result};

/// The field of rational numbers `Q`.
///
/// Arithmetic is exact, so elimination over this field never suffers from
/// rounding. Pivots are still chosen by absolute value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RationalField;

/// The field of rational numbers.
pub const Q: RationalField = RationalField;

impl Display for RationalField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Q")
    }
}

impl Ring for RationalField {
    type Element = Rational;

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        Rational::from(a + b)
    }

    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        Rational::from(a - b)
    }

    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        Rational::from(a * b)
    }

    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a += b;
    }

    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a -= b;
    }

    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a *= b;
    }

    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        *a += Rational::from(b * c);
    }

    fn sub_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        *a -= Rational::from(b * c);
    }

    fn neg(&self, a: &Self::Element) -> Self::Element {
        Rational::from(-a)
    }

    fn zero(&self) -> Self::Element {
        Rational::new()
    }

    fn one(&self) -> Self::Element {
        Rational::from(1)
    }

    fn is_zero(a: &Self::Element) -> bool {
        a.cmp0() == Ordering::Equal
    }

    fn is_one(&self, a: &Self::Element) -> bool {
        *a == 1
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element {
        Rational::from(rng.gen_range(range.0..range.1))
    }

    fn abs_cmp(&self, a: &Self::Element, b: &Self::Element) -> Ordering {
        a.cmp_abs(b)
    }
}

impl Field for RationalField {
    fn inv(&self, a: &Self::Element) -> Result<Self::Element> {
        if Self::is_zero(a) {
            Err(LinalgError::DivisionByZero)
        } else {
            Ok(Rational::from(a.recip_ref()))
        }
    }
}

#[cfg(test)]
mod test {
    use rug::Rational;

    use crate::domains::{Field, Ring};

    use super::Q;

    #[test]
    fn exact_inverse() {
        let a = Rational::from((3, 7));
        let inv = Q.inv(&a).unwrap();
        assert_eq!(inv, Rational::from((7, 3)));
        assert!(Q.is_one(&Q.mul(&a, &inv)));
        assert!(Q.inv(&Q.zero()).is_err());
    }
}

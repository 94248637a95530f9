//! The field of double-precision floating point numbers.

use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use rand::Rng;

use super::{Field, HardwareAccelerable, Ring};
use crate::error::{LinalgError, Result};

/// The field of `f64` numbers.
///
/// Its elements can be offloaded to accelerator devices without conversion loss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FloatField;

impl Display for FloatField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("f64")
    }
}

impl Ring for FloatField {
    type Element = f64;

    #[inline(always)]
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a + b
    }

    #[inline(always)]
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a - b
    }

    #[inline(always)]
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a * b
    }

    #[inline(always)]
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a += b;
    }

    #[inline(always)]
    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a -= b;
    }

    #[inline(always)]
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a *= b;
    }

    #[inline(always)]
    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        // a += b * c
        *a = b.mul_add(*c, *a);
    }

    #[inline(always)]
    fn sub_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        // a -= b * c
        *a = b.mul_add(-*c, *a);
    }

    #[inline(always)]
    fn neg(&self, a: &Self::Element) -> Self::Element {
        -a
    }

    #[inline(always)]
    fn zero(&self) -> Self::Element {
        0.
    }

    #[inline(always)]
    fn one(&self) -> Self::Element {
        1.
    }

    #[inline(always)]
    fn is_zero(a: &Self::Element) -> bool {
        *a == 0.
    }

    #[inline(always)]
    fn is_one(&self, a: &Self::Element) -> bool {
        *a == 1.
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element {
        rng.gen_range(range.0..range.1) as f64
    }

    fn abs_cmp(&self, a: &Self::Element, b: &Self::Element) -> Ordering {
        a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal)
    }
}

impl Field for FloatField {
    #[inline]
    fn inv(&self, a: &Self::Element) -> Result<Self::Element> {
        if *a == 0. {
            Err(LinalgError::DivisionByZero)
        } else {
            Ok(1. / a)
        }
    }

    #[inline]
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Result<Self::Element> {
        if *b == 0. {
            Err(LinalgError::DivisionByZero)
        } else {
            Ok(a / b)
        }
    }

    fn sqrt(&self, a: &Self::Element) -> Option<Self::Element> {
        if *a < 0. {
            None
        } else {
            Some(a.sqrt())
        }
    }

    fn as_accelerable(&self) -> Option<&dyn HardwareAccelerable<Self::Element>> {
        Some(self)
    }
}

impl HardwareAccelerable<f64> for FloatField {
    #[inline(always)]
    fn to_device(&self, e: &f64) -> f64 {
        *e
    }

    #[inline(always)]
    fn from_device(&self, v: f64) -> f64 {
        v
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use crate::{
        domains::{Field, Ring},
        error::LinalgError,
    };

    use super::FloatField;

    #[test]
    fn arithmetic() {
        let f = FloatField;
        assert_eq!(f.add(&1.5, &2.5), 4.);
        assert_eq!(f.neg(&3.), -3.);
        let mut a = 1.;
        f.add_mul_assign(&mut a, &2., &3.);
        assert_eq!(a, 7.);
        f.sub_mul_assign(&mut a, &2., &3.);
        assert_eq!(a, 1.);
    }

    #[test]
    fn inverse_of_zero_fails() {
        assert_eq!(FloatField.inv(&0.), Err(LinalgError::DivisionByZero));
        assert_eq!(FloatField.inv(&-0.), Err(LinalgError::DivisionByZero));
        assert_eq!(FloatField.inv(&4.), Ok(0.25));
        assert_eq!(FloatField.div(&1., &0.), Err(LinalgError::DivisionByZero));
    }

    #[test]
    fn magnitude() {
        let f = FloatField;
        assert_eq!(f.abs_cmp(&-3., &2.), Ordering::Greater);
        assert_eq!(f.abs_cmp(&0.5, &-2.), Ordering::Less);
        assert_eq!(f.sqrt(&9.), Some(3.));
        assert_eq!(f.sqrt(&-1.), None);
        assert!(f.as_accelerable().is_some());
    }
}

//! Defines the algebraic traits that scalar types must satisfy.
//!
//! The core trait is [Ring], which has two binary operations, addition and multiplication.
//! Each ring has an associated element type, that should not be confused with the ring type
//! itself. For example:
//! - The field of double-precision reals [FloatField](float::FloatField) has elements of
//!   type [f64].
//! - The prime field [FiniteField](finite_field::FiniteField) has elements of type
//!   [FiniteFieldElement](finite_field::FiniteFieldElement).
//!
//! The ring elements do not implement operations such as addition or multiplication,
//! but rather the ring itself does. All vectors and matrices in this crate are generic
//! over the ring type.
//!
//! An extension of the ring trait is the [Field] trait, which adds the ability to divide
//! and invert elements.
//! Fields can opt into hardware acceleration by implementing [HardwareAccelerable].
pub mod finite_field;
pub mod float;
#[cfg(feature = "rational")]
pub mod rational;

use std::cmp::Ordering;
use std::fmt::{Debug, Display};

use crate::error::Result;

/// A ring is a set with two binary operations, addition and multiplication.
///
/// Addition and multiplication of scalars are associative and commutative,
/// `zero` is the additive identity and `one` the multiplicative identity.
/// None of the operations may fail for well-formed elements.
///
/// Rings and their elements can be shared between threads, so that large
/// operations can be split over a thread pool.
pub trait Ring: Clone + PartialEq + Debug + Display + Send + Sync {
    /// The element of a ring. For example, the elements of
    /// [FloatField](float::FloatField) are [f64].
    type Element: Clone + PartialEq + Debug + Display + Send + Sync;

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element);
    /// Compute `a += b * c`.
    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element);
    /// Compute `a -= b * c`.
    fn sub_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element);
    fn neg(&self, a: &Self::Element) -> Self::Element;
    fn zero(&self) -> Self::Element;
    fn one(&self) -> Self::Element;
    fn is_zero(a: &Self::Element) -> bool;
    fn is_one(&self, a: &Self::Element) -> bool;

    /// Sample a random element, using `range` for rings that have a notion of size.
    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element;

    /// Compare the magnitudes of `a` and `b`. This ordering is used to pick pivots
    /// during elimination.
    ///
    /// Rings without an absolute value keep the default, which considers all
    /// elements equally large. Pivoting then selects the first non-zero candidate.
    fn abs_cmp(&self, _a: &Self::Element, _b: &Self::Element) -> Ordering {
        Ordering::Equal
    }
}

/// A field is a ring that supports division and inversion.
pub trait Field: Ring {
    /// Compute the multiplicative inverse of `a`.
    /// Fails with [DivisionByZero](crate::error::LinalgError::DivisionByZero) if `a` is zero.
    fn inv(&self, a: &Self::Element) -> Result<Self::Element>;

    /// Compute `a / b`.
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Result<Self::Element> {
        Ok(self.mul(a, &self.inv(b)?))
    }

    /// Compute the square root of `a`, if the field supports one and it exists.
    fn sqrt(&self, _a: &Self::Element) -> Option<Self::Element> {
        None
    }

    /// Return the acceleration capability of this field, if it has one.
    fn as_accelerable(&self) -> Option<&dyn HardwareAccelerable<Self::Element>> {
        None
    }
}

/// A capability that allows elements of a field to be moved to an accelerator
/// device, which computes in double precision.
pub trait HardwareAccelerable<E> {
    /// Convert an element to its device representation.
    fn to_device(&self, e: &E) -> f64;
    /// Convert a device value back to an element.
    fn from_device(&self, v: f64) -> E;
}

use std::ops::{Index, Neg};

use crate::{
    compute::ComputeContext,
    domains::{Field, Ring},
    error::{LinalgError, Result},
};

/// An n-dimensional vector with entries in the ring `F`.
///
/// The dimension is at least one and never changes. Arithmetic returns new vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct Vector<F: Ring> {
    pub(crate) data: Vec<F::Element>,
    pub(crate) field: F,
}

impl<F: Ring> Vector<F> {
    /// Create a new vector from a list of scalars.
    pub fn new(data: Vec<F::Element>, field: F) -> Result<Vector<F>> {
        if data.is_empty() {
            return Err(LinalgError::EmptyConstruction { rows: 0, cols: 1 });
        }

        Ok(Vector { data, field })
    }

    /// Create a zero vector of dimension `dim`.
    pub fn zero(dim: usize, field: F) -> Result<Vector<F>> {
        Vector::new(vec![field.zero(); dim], field)
    }

    /// Return the number of entries.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Return the field of the vector entries.
    pub fn field(&self) -> &F {
        &self.field
    }

    /// Get the `index`th entry.
    pub fn get(&self, index: usize) -> Result<&F::Element> {
        LinalgError::check_index(index, self.data.len())?;
        Ok(&self.data[index])
    }

    /// Return the entries as a slice.
    pub fn as_slice(&self) -> &[F::Element] {
        &self.data
    }

    /// Return an iterator over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, F::Element> {
        self.data.iter()
    }

    /// Return true iff every entry is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|e| F::is_zero(e))
    }

    /// Negate each entry of the vector.
    pub fn negate(&self) -> Vector<F> {
        Vector {
            data: self.data.iter().map(|e| self.field.neg(e)).collect(),
            field: self.field.clone(),
        }
    }

    pub(crate) fn check_same_dimension(&self, op: &'static str, other: &Vector<F>) -> Result<()> {
        if self.data.len() != other.data.len() {
            Err(LinalgError::mismatch(
                op,
                &[self.data.len()],
                &[other.data.len()],
            ))
        } else {
            Ok(())
        }
    }
}

impl<F: Field> Vector<F> {
    /// Add two vectors, using the default compute context.
    pub fn add(&self, other: &Vector<F>) -> Result<Vector<F>> {
        self.add_with(other, ComputeContext::global())
    }

    /// Add two vectors.
    pub fn add_with(&self, other: &Vector<F>, ctx: &ComputeContext) -> Result<Vector<F>> {
        ctx.provider(&self.field)?.add_vectors(self, other)
    }

    /// Subtract `other` from this vector, using the default compute context.
    pub fn subtract(&self, other: &Vector<F>) -> Result<Vector<F>> {
        self.subtract_with(other, ComputeContext::global())
    }

    /// Subtract `other` from this vector, computed as `self + (-other)`.
    pub fn subtract_with(&self, other: &Vector<F>, ctx: &ComputeContext) -> Result<Vector<F>> {
        self.add_with(&other.negate(), ctx)
    }

    /// Multiply each entry by the scalar `e`, using the default compute context.
    pub fn scale(&self, e: &F::Element) -> Result<Vector<F>> {
        self.scale_with(e, ComputeContext::global())
    }

    /// Multiply each entry by the scalar `e`.
    pub fn scale_with(&self, e: &F::Element, ctx: &ComputeContext) -> Result<Vector<F>> {
        ctx.provider(&self.field)?.scale_vector(self, e)
    }

    /// Take the Euclidean scalar product of two vectors, using the default compute context.
    pub fn dot(&self, other: &Vector<F>) -> Result<F::Element> {
        self.dot_with(other, ComputeContext::global())
    }

    /// Take the Euclidean scalar product of two vectors.
    pub fn dot_with(&self, other: &Vector<F>, ctx: &ComputeContext) -> Result<F::Element> {
        ctx.provider(&self.field)?.dot(self, other)
    }

    /// Compute `sqrt(self · self)`, using the default compute context.
    pub fn norm(&self) -> Result<F::Element> {
        self.norm_with(ComputeContext::global())
    }

    /// Compute `sqrt(self · self)`. Fails with [MissingCapability](LinalgError::MissingCapability)
    /// if the field has no square root.
    pub fn norm_with(&self, ctx: &ComputeContext) -> Result<F::Element> {
        ctx.provider(&self.field)?.norm(self)
    }
}

impl<F: Ring> Index<usize> for Vector<F> {
    type Output = F::Element;

    /// Get the `i`th entry of the vector. Panics when out of bounds, use [Vector::get] otherwise.
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<F: Ring> Neg for &Vector<F> {
    type Output = Vector<F>;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        compute::{ComputeContext, ComputeMode},
        domains::{finite_field::FiniteField, float::FloatField},
        error::LinalgError,
    };

    use super::Vector;

    #[test]
    fn construction() {
        assert_eq!(
            Vector::new(vec![], FloatField).unwrap_err(),
            LinalgError::EmptyConstruction { rows: 0, cols: 1 }
        );

        let v = Vector::new(vec![1., 2., 3.], FloatField).unwrap();
        assert_eq!(v.dimension(), 3);
        assert_eq!(v.get(2), Ok(&3.));
        assert_eq!(
            v.get(3),
            Err(LinalgError::IndexOutOfBounds { index: 3, size: 3 })
        );
        assert_eq!(v.negate().as_slice(), &[-1., -2., -3.]);
        assert!(Vector::zero(4, FloatField).unwrap().is_zero());
    }

    #[test]
    fn arithmetic() {
        let ctx = ComputeContext::new(ComputeMode::Cpu);
        let a = Vector::new(vec![1., 2., 2.], FloatField).unwrap();
        let b = Vector::new(vec![3., 0., -1.], FloatField).unwrap();

        assert_eq!(a.add_with(&b, &ctx).unwrap().as_slice(), &[4., 2., 1.]);
        assert_eq!(a.subtract_with(&b, &ctx).unwrap().as_slice(), &[-2., 2., 3.]);
        assert_eq!(a.scale_with(&2., &ctx).unwrap().as_slice(), &[2., 4., 4.]);
        assert_eq!(a.dot_with(&b, &ctx).unwrap(), 1.);
        assert_eq!(a.norm_with(&ctx).unwrap(), 3.);

        let c = Vector::new(vec![1., 2.], FloatField).unwrap();
        assert!(matches!(
            a.add_with(&c, &ctx),
            Err(LinalgError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            a.dot_with(&c, &ctx),
            Err(LinalgError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn norm_requires_square_root() {
        let ctx = ComputeContext::new(ComputeMode::Cpu);
        let f = FiniteField::new(7).unwrap();
        let v = Vector::new(vec![f.to_element(1), f.to_element(2)], f).unwrap();

        assert_eq!(v.dot_with(&v, &ctx).unwrap(), f.to_element(5));
        assert!(matches!(
            v.norm_with(&ctx),
            Err(LinalgError::MissingCapability { op: "norm", .. })
        ));
    }
}

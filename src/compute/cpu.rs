use rayon::prelude::*;

use crate::{
    domains::Field,
    error::Result,
    tensors::{
        dense::{add_product, scale_entry},
        Matrix, Vector,
    },
};

use super::{elimination, LinearAlgebraProvider};

/// The number of entries from which elementwise operations, matrix products and
/// matrix-vector products are split over the rayon thread pool. The split never
/// changes a result: every entry is still accumulated in the same order.
pub const PARALLEL_THRESHOLD: usize = 1000;

/// The reference provider, which computes with the field operations.
///
/// Operations on two dense or two sparse matrices keep their representation.
/// Mixed operands are computed densely. Large dense operands are processed in parallel.
#[derive(Clone, Copy, Debug)]
pub struct CpuProvider<'a, F: Field> {
    field: &'a F,
}

impl<'a, F: Field> CpuProvider<'a, F> {
    pub fn new(field: &'a F) -> CpuProvider<'a, F> {
        CpuProvider { field }
    }
}

impl<'a, F: Field> LinearAlgebraProvider<F> for CpuProvider<'a, F> {
    fn name(&self) -> &str {
        "cpu"
    }

    fn field(&self) -> &F {
        self.field
    }

    fn add_vectors(&self, a: &Vector<F>, b: &Vector<F>) -> Result<Vector<F>> {
        a.check_same_dimension("add", b)?;

        let f = |(x, y): (&F::Element, &F::Element)| self.field.add(x, y);
        let data = if a.data.len() < PARALLEL_THRESHOLD {
            a.data.iter().zip(&b.data).map(f).collect()
        } else {
            a.data.par_iter().zip(&b.data).map(f).collect()
        };

        Ok(Vector {
            data,
            field: self.field.clone(),
        })
    }

    fn scale_vector(&self, a: &Vector<F>, e: &F::Element) -> Result<Vector<F>> {
        let f = |x: &F::Element| scale_entry(self.field, x, e);
        let data = if a.data.len() < PARALLEL_THRESHOLD {
            a.data.iter().map(f).collect()
        } else {
            a.data.par_iter().map(f).collect()
        };

        Ok(Vector {
            data,
            field: self.field.clone(),
        })
    }

    fn dot(&self, a: &Vector<F>, b: &Vector<F>) -> Result<F::Element> {
        a.check_same_dimension("dot", b)?;

        let mut sum = self.field.zero();
        for (x, y) in a.data.iter().zip(&b.data) {
            add_product(self.field, &mut sum, x, y);
        }
        Ok(sum)
    }

    fn add(&self, a: &Matrix<F>, b: &Matrix<F>) -> Result<Matrix<F>> {
        match (a, b) {
            (Matrix::Dense(a), Matrix::Dense(b)) => Ok(Matrix::Dense(a.add(b)?)),
            (Matrix::Sparse(a), Matrix::Sparse(b)) => Ok(Matrix::Sparse(a.add(b)?)),
            _ => Ok(Matrix::Dense(a.dense().add(&b.dense())?)),
        }
    }

    fn scale(&self, a: &Matrix<F>, e: &F::Element) -> Result<Matrix<F>> {
        match a {
            Matrix::Dense(a) => Ok(Matrix::Dense(a.mul_scalar(e))),
            Matrix::Sparse(a) => Ok(Matrix::Sparse(a.mul_scalar(e))),
        }
    }

    fn multiply(&self, a: &Matrix<F>, b: &Matrix<F>) -> Result<Matrix<F>> {
        match (a, b) {
            (Matrix::Dense(a), Matrix::Dense(b)) => Ok(Matrix::Dense(a.mul(b)?)),
            (Matrix::Sparse(a), Matrix::Sparse(b)) => Ok(Matrix::Sparse(a.mul(b)?)),
            _ => Ok(Matrix::Dense(a.dense().mul(&b.dense())?)),
        }
    }

    fn multiply_vector(&self, a: &Matrix<F>, v: &Vector<F>) -> Result<Vector<F>> {
        match a {
            Matrix::Dense(a) => a.mul_vector(v),
            Matrix::Sparse(a) => a.mul_vector(v),
        }
    }

    fn trace(&self, a: &Matrix<F>) -> Result<F::Element> {
        match a {
            Matrix::Dense(a) => a.trace(),
            Matrix::Sparse(a) => a.trace(),
        }
    }

    fn determinant(&self, a: &Matrix<F>) -> Result<F::Element> {
        elimination::determinant(&a.dense())
    }

    fn inverse(&self, a: &Matrix<F>) -> Result<Matrix<F>> {
        Ok(Matrix::Dense(elimination::inverse(&a.dense())?))
    }

    fn solve(&self, a: &Matrix<F>, b: &Vector<F>) -> Result<Vector<F>> {
        elimination::solve(&a.dense(), b)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        compute::LinearAlgebraProvider,
        domains::{finite_field::FiniteField, float::FloatField},
        error::LinalgError,
        tensors::{Matrix, SparseMatrixBuilder, Vector},
    };

    use super::CpuProvider;

    #[test]
    fn mixed_representation() {
        let p = CpuProvider::new(&FloatField);
        let d = Matrix::from_nested_vec(vec![vec![1., 2.], vec![3., 4.]], FloatField).unwrap();
        let mut b = SparseMatrixBuilder::new(2, 2, FloatField).unwrap();
        b.set(1, 0, 1.).unwrap();
        let s = Matrix::Sparse(b.build());

        let sum = p.add(&d, &s).unwrap();
        assert!(!sum.is_sparse());
        assert_eq!(
            sum,
            Matrix::from_nested_vec(vec![vec![1., 2.], vec![4., 4.]], FloatField).unwrap()
        );
        assert_eq!(p.add(&s, &d).unwrap(), sum);

        let prod = p.multiply(&s, &d).unwrap();
        assert_eq!(
            prod,
            Matrix::from_nested_vec(vec![vec![0., 0.], vec![1., 2.]], FloatField).unwrap()
        );

        assert_eq!(p.trace(&s).unwrap(), 0.);
        assert_eq!(p.determinant(&s).unwrap(), 0.);
        assert_eq!(p.inverse(&s).unwrap_err(), LinalgError::SingularMatrix);
    }

    #[test]
    fn vectors() {
        let f = FiniteField::new(5).unwrap();
        let p = CpuProvider::new(&f);
        let a = Vector::new(vec![f.to_element(3), f.to_element(4)], f).unwrap();

        assert_eq!(p.dot(&a, &a).unwrap(), f.to_element(0));
        assert_eq!(
            p.scale_vector(&a, &f.to_element(2)).unwrap().as_slice(),
            &[f.to_element(1), f.to_element(3)]
        );
        assert!(matches!(
            p.norm(&a),
            Err(LinalgError::MissingCapability { op: "norm", .. })
        ));
    }

    #[test]
    fn large_operands() {
        let n = 2000;
        let p = CpuProvider::new(&FloatField);
        let a = Vector::new((0..n).map(|i| i as f64).collect(), FloatField).unwrap();
        let ones = Vector::new(vec![1.; n], FloatField).unwrap();

        let sum = p.add_vectors(&a, &ones).unwrap();
        assert!(sum.as_slice().iter().enumerate().all(|(i, x)| *x == i as f64 + 1.));
        let scaled = p.scale_vector(&a, &2.).unwrap();
        assert!(scaled.as_slice().iter().enumerate().all(|(i, x)| *x == 2. * i as f64));
        assert_eq!(p.dot(&a, &ones).unwrap(), 1999000.);

        // 40 x 50 crosses the threshold, so the rows are computed in parallel
        let data = (0..2000).map(|i| (i % 7) as f64).collect();
        let m = Matrix::from_linear(data, 40, 50, FloatField).unwrap();
        let v = Vector::new(vec![1.; 50], FloatField).unwrap();
        let mv = p.multiply_vector(&m, &v).unwrap();
        for (i, x) in mv.as_slice().iter().enumerate() {
            let expected: f64 = (0..50).map(|j| ((i * 50 + j) % 7) as f64).sum();
            assert_eq!(*x, expected);
        }

        let sq = p.multiply(&m, &m.transpose()).unwrap();
        for (i, j) in [(0, 0), (3, 17), (39, 39)] {
            let expected: f64 = (0..50)
                .map(|l| (((i * 50 + l) % 7) * ((j * 50 + l) % 7)) as f64)
                .sum();
            assert_eq!(sq.get(i, j).unwrap(), expected);
        }
    }

    #[test]
    fn zero_factors_annihilate_infinity() {
        let p = CpuProvider::new(&FloatField);
        let a = Vector::new(vec![f64::INFINITY, 1.], FloatField).unwrap();
        let b = Vector::new(vec![0., 2.], FloatField).unwrap();

        assert_eq!(p.dot(&a, &b).unwrap(), 2.);
        assert_eq!(p.scale_vector(&a, &0.).unwrap().as_slice(), &[0., 0.]);
    }
}

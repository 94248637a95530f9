use std::sync::Arc;

use tracing::warn;

use crate::{
    domains::{Field, HardwareAccelerable},
    error::{LinalgError, Result},
    tensors::{DenseMatrix, Matrix, Vector},
};

use super::{CpuProvider, Device, DeviceError, LinearAlgebraProvider};

/// A provider that offloads elementwise operations, products and scalar products
/// to a [Device], computing in double precision.
///
/// Sparse matrices are never uploaded: an operation whose matrix operands are all
/// sparse is computed by the [CpuProvider], as are the determinant, inverse,
/// linear solve and trace. When a device kernel fails or returns a buffer of the
/// wrong length, the operation is recomputed on the CPU.
pub struct AcceleratedProvider<'a, F: Field> {
    field: &'a F,
    capability: &'a dyn HardwareAccelerable<F::Element>,
    device: Arc<dyn Device>,
    cpu: CpuProvider<'a, F>,
}

impl<'a, F: Field> AcceleratedProvider<'a, F> {
    pub(crate) fn new(
        field: &'a F,
        capability: &'a dyn HardwareAccelerable<F::Element>,
        device: Arc<dyn Device>,
    ) -> AcceleratedProvider<'a, F> {
        AcceleratedProvider {
            field,
            capability,
            device,
            cpu: CpuProvider::new(field),
        }
    }

    /// Get the device the kernels run on.
    pub fn device(&self) -> &Arc<dyn Device> {
        &self.device
    }

    fn upload(&self, data: &[F::Element]) -> Vec<f64> {
        data.iter().map(|e| self.capability.to_device(e)).collect()
    }

    fn download(&self, data: Vec<f64>) -> Vec<F::Element> {
        data.into_iter()
            .map(|v| self.capability.from_device(v))
            .collect()
    }

    /// Run `kernel` on the device and wait for it to finish.
    /// Returns `None` if the device reports an error.
    fn run<T>(
        &self,
        op: &str,
        kernel: impl FnOnce(&dyn Device) -> std::result::Result<T, DeviceError>,
    ) -> Option<T> {
        let r = kernel(self.device.as_ref()).and_then(|r| {
            self.device.synchronize()?;
            Ok(r)
        });

        match r {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("Recomputing {} on the CPU: {}", op, e);
                None
            }
        }
    }

    /// Run a kernel that returns a buffer of `len` values.
    /// A buffer of any other length counts as a failure.
    fn run_buffer(
        &self,
        op: &str,
        len: usize,
        kernel: impl FnOnce(&dyn Device) -> std::result::Result<Vec<f64>, DeviceError>,
    ) -> Option<Vec<f64>> {
        let r = self.run(op, kernel)?;
        if r.len() != len {
            warn!(
                "Recomputing {} on the CPU: device {} returned {} values instead of {}",
                op,
                self.device.name(),
                r.len(),
                len
            );
            return None;
        }
        Some(r)
    }

    fn dense_result(&self, data: Vec<f64>, nrows: usize, ncols: usize) -> Result<DenseMatrix<F>> {
        DenseMatrix::from_linear(self.download(data), nrows, ncols, self.field.clone())
    }
}

impl<'a, F: Field> LinearAlgebraProvider<F> for AcceleratedProvider<'a, F> {
    fn name(&self) -> &str {
        self.device.name()
    }

    fn field(&self) -> &F {
        self.field
    }

    fn add_vectors(&self, a: &Vector<F>, b: &Vector<F>) -> Result<Vector<F>> {
        a.check_same_dimension("add", b)?;

        let (x, y) = (self.upload(&a.data), self.upload(&b.data));
        match self.run_buffer("add", x.len(), |d| d.add(&x, &y)) {
            Some(r) => Vector::new(self.download(r), self.field.clone()),
            None => self.cpu.add_vectors(a, b),
        }
    }

    fn scale_vector(&self, a: &Vector<F>, e: &F::Element) -> Result<Vector<F>> {
        let x = self.upload(&a.data);
        let s = self.capability.to_device(e);
        match self.run_buffer("scale", x.len(), |d| d.scale(&x, s)) {
            Some(r) => Vector::new(self.download(r), self.field.clone()),
            None => self.cpu.scale_vector(a, e),
        }
    }

    fn dot(&self, a: &Vector<F>, b: &Vector<F>) -> Result<F::Element> {
        a.check_same_dimension("dot", b)?;

        let (x, y) = (self.upload(&a.data), self.upload(&b.data));
        match self.run("dot", |d| d.dot(&x, &y)) {
            Some(r) => Ok(self.capability.from_device(r)),
            None => self.cpu.dot(a, b),
        }
    }

    fn add(&self, a: &Matrix<F>, b: &Matrix<F>) -> Result<Matrix<F>> {
        if a.is_sparse() && b.is_sparse() {
            return self.cpu.add(a, b);
        }

        if a.nrows() != b.nrows() || a.ncols() != b.ncols() {
            return Err(LinalgError::mismatch(
                "add",
                &[a.nrows(), a.ncols()],
                &[b.nrows(), b.ncols()],
            ));
        }

        let (x, y) = (self.upload(&a.dense().data), self.upload(&b.dense().data));
        match self.run_buffer("add", x.len(), |d| d.add(&x, &y)) {
            Some(r) => Ok(Matrix::Dense(self.dense_result(r, a.nrows(), a.ncols())?)),
            None => self.cpu.add(a, b),
        }
    }

    fn scale(&self, a: &Matrix<F>, e: &F::Element) -> Result<Matrix<F>> {
        let Matrix::Dense(dense) = a else {
            return self.cpu.scale(a, e);
        };

        let x = self.upload(&dense.data);
        let s = self.capability.to_device(e);
        match self.run_buffer("scale", x.len(), |d| d.scale(&x, s)) {
            Some(r) => Ok(Matrix::Dense(self.dense_result(r, a.nrows(), a.ncols())?)),
            None => self.cpu.scale(a, e),
        }
    }

    fn multiply(&self, a: &Matrix<F>, b: &Matrix<F>) -> Result<Matrix<F>> {
        if a.is_sparse() && b.is_sparse() {
            return self.cpu.multiply(a, b);
        }

        if a.ncols() != b.nrows() {
            return Err(LinalgError::mismatch(
                "multiply",
                &[a.nrows(), a.ncols()],
                &[b.nrows(), b.ncols()],
            ));
        }

        let (m, k, n) = (a.nrows(), a.ncols(), b.ncols());
        let len = LinalgError::check_shape(m, n)?;
        let (x, y) = (self.upload(&a.dense().data), self.upload(&b.dense().data));
        match self.run_buffer("multiply", len, |d| d.matmul(&x, &y, m, k, n)) {
            Some(r) => Ok(Matrix::Dense(self.dense_result(r, m, n)?)),
            None => self.cpu.multiply(a, b),
        }
    }

    fn multiply_vector(&self, a: &Matrix<F>, v: &Vector<F>) -> Result<Vector<F>> {
        let Matrix::Dense(dense) = a else {
            return self.cpu.multiply_vector(a, v);
        };

        if a.ncols() != v.dimension() {
            return Err(LinalgError::mismatch(
                "multiply_vector",
                &[a.nrows(), a.ncols()],
                &[v.dimension()],
            ));
        }

        let (m, k) = (a.nrows(), a.ncols());
        let (x, y) = (self.upload(&dense.data), self.upload(&v.data));
        match self.run_buffer("multiply_vector", m, |d| d.matmul(&x, &y, m, k, 1)) {
            Some(r) => Vector::new(self.download(r), self.field.clone()),
            None => self.cpu.multiply_vector(a, v),
        }
    }

    fn trace(&self, a: &Matrix<F>) -> Result<F::Element> {
        self.cpu.trace(a)
    }

    fn determinant(&self, a: &Matrix<F>) -> Result<F::Element> {
        self.cpu.determinant(a)
    }

    fn inverse(&self, a: &Matrix<F>) -> Result<Matrix<F>> {
        self.cpu.inverse(a)
    }

    fn solve(&self, a: &Matrix<F>, b: &Vector<F>) -> Result<Vector<F>> {
        self.cpu.solve(a, b)
    }
}

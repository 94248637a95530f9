use std::{borrow::Cow, ops::Neg, ops::Range};

use crate::{
    compute::ComputeContext,
    domains::{Field, Ring},
    error::{LinalgError, Result},
};

use super::{DenseMatrix, MatrixHint, SparseMatrix, Vector};

/// A matrix with entries in the ring `F`, backed by either dense or sparse storage.
///
/// Matrices are immutable. Every operation returns a new matrix, and the choice
/// of storage never influences the result of an operation: two matrices with the
/// same entries compare equal and give identical results, whatever their representation.
///
/// Arithmetic is delegated to the provider that the [ComputeContext] selects for the field.
/// The plain operations use [ComputeContext::global], the `*_with` variants an explicit context.
///
/// ```
/// use fieldlinalg::{domains::float::FloatField, tensors::Matrix};
///
/// let a = Matrix::from_nested_vec(vec![vec![1., 2.], vec![3., 4.]], FloatField).unwrap();
/// let b = Matrix::from_nested_vec(vec![vec![5., 6.], vec![7., 8.]], FloatField).unwrap();
/// assert_eq!(a.multiply(&b).unwrap().to_string(), "{{19,22},{43,50}}");
/// ```
#[derive(Clone, Debug)]
pub enum Matrix<F: Ring> {
    Dense(DenseMatrix<F>),
    Sparse(SparseMatrix<F>),
}

impl<F: Ring> From<DenseMatrix<F>> for Matrix<F> {
    fn from(m: DenseMatrix<F>) -> Self {
        Matrix::Dense(m)
    }
}

impl<F: Ring> From<SparseMatrix<F>> for Matrix<F> {
    fn from(m: SparseMatrix<F>) -> Self {
        Matrix::Sparse(m)
    }
}

impl<F: Ring> Matrix<F> {
    /// Create a new dense matrix from a 2-dimensional vector of scalars.
    pub fn from_nested_vec(matrix: Vec<Vec<F::Element>>, field: F) -> Result<Matrix<F>> {
        Ok(Matrix::Dense(DenseMatrix::from_nested_vec(matrix, field)?))
    }

    /// Create a new dense matrix from its entries in row-major order.
    pub fn from_linear(
        data: Vec<F::Element>,
        nrows: usize,
        ncols: usize,
        field: F,
    ) -> Result<Matrix<F>> {
        Ok(Matrix::Dense(DenseMatrix::from_linear(
            data, nrows, ncols, field,
        )?))
    }

    /// Create a new matrix from a 2-dimensional vector of scalars, with a storage chosen by `hint`.
    pub fn with_hint(
        matrix: Vec<Vec<F::Element>>,
        field: F,
        hint: MatrixHint,
    ) -> Result<Matrix<F>> {
        let m = DenseMatrix::from_nested_vec(matrix, field)?;
        if hint.prefers_sparse(&m)? {
            Ok(Matrix::Sparse(m.to_sparse()))
        } else {
            Ok(Matrix::Dense(m))
        }
    }

    /// Create a dense `nrows x nrows` identity matrix.
    pub fn identity(nrows: usize, field: F) -> Result<Matrix<F>> {
        Ok(Matrix::Dense(DenseMatrix::identity(nrows, field)?))
    }

    /// Create a sparse `nrows x ncols` matrix with all entries zero.
    pub fn zero(nrows: usize, ncols: usize, field: F) -> Result<Matrix<F>> {
        Ok(Matrix::Sparse(SparseMatrix::new(nrows, ncols, field)?))
    }

    /// Create a sparse square matrix with `diag` on the main diagonal.
    pub fn from_diagonal(diag: Vec<F::Element>, field: F) -> Result<Matrix<F>> {
        Ok(Matrix::Sparse(SparseMatrix::from_diagonal(diag, field)?))
    }

    /// Return the identity matrix of the same size and representation.
    /// Only defined for square matrices.
    pub fn one(&self) -> Result<Matrix<F>> {
        self.check_square("one")?;
        match self {
            Matrix::Dense(m) => Matrix::identity(m.nrows, m.field.clone()),
            Matrix::Sparse(m) => {
                Matrix::from_diagonal(vec![m.field.one(); m.nrows], m.field.clone())
            }
        }
    }

    pub fn nrows(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.nrows,
            Matrix::Sparse(m) => m.nrows,
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.ncols,
            Matrix::Sparse(m) => m.ncols,
        }
    }

    pub fn field(&self) -> &F {
        match self {
            Matrix::Dense(m) => &m.field,
            Matrix::Sparse(m) => &m.field,
        }
    }

    pub fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, Matrix::Sparse(_))
    }

    /// Return the number of non-zero entries.
    pub fn nnz(&self) -> usize {
        match self {
            Matrix::Dense(m) => m.nnz(),
            Matrix::Sparse(m) => m.nnz(),
        }
    }

    /// Return the fraction of entries that are non-zero.
    pub fn density(&self) -> f64 {
        self.nnz() as f64 / (self.nrows() as f64 * self.ncols() as f64)
    }

    pub fn is_zero(&self) -> bool {
        self.nnz() == 0
    }

    /// Get the entry at row `row` and column `col`.
    pub fn get(&self, row: usize, col: usize) -> Result<F::Element> {
        match self {
            Matrix::Dense(m) => m.get(row, col).cloned(),
            Matrix::Sparse(m) => m.get(row, col),
        }
    }

    /// Copy out row `row`.
    pub fn get_row(&self, row: usize) -> Result<Vector<F>> {
        match self {
            Matrix::Dense(m) => m.get_row(row),
            Matrix::Sparse(m) => m.get_row(row),
        }
    }

    /// Copy out column `col`.
    pub fn get_column(&self, col: usize) -> Result<Vector<F>> {
        match self {
            Matrix::Dense(m) => m.get_column(col),
            Matrix::Sparse(m) => m.get_column(col),
        }
    }

    /// Copy out the block spanned by `rows` and `cols`, keeping the representation.
    pub fn sub_matrix(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Matrix<F>> {
        match self {
            Matrix::Dense(m) => Ok(Matrix::Dense(m.sub_matrix(rows, cols)?)),
            Matrix::Sparse(m) => Ok(Matrix::Sparse(m.sub_matrix(rows, cols)?)),
        }
    }

    pub fn transpose(&self) -> Matrix<F> {
        match self {
            Matrix::Dense(m) => Matrix::Dense(m.transpose()),
            Matrix::Sparse(m) => Matrix::Sparse(m.transpose()),
        }
    }

    /// Negate each entry of the matrix.
    pub fn negate(&self) -> Matrix<F> {
        match self {
            Matrix::Dense(m) => Matrix::Dense(m.negate()),
            Matrix::Sparse(m) => Matrix::Sparse(m.negate()),
        }
    }

    /// Return a copy with dense storage.
    pub fn to_dense(&self) -> Matrix<F> {
        Matrix::Dense(self.dense().into_owned())
    }

    /// Return a copy with sparse storage.
    pub fn to_sparse(&self) -> Matrix<F> {
        match self {
            Matrix::Dense(m) => Matrix::Sparse(m.to_sparse()),
            Matrix::Sparse(m) => Matrix::Sparse(m.clone()),
        }
    }

    /// Borrow or materialize a dense view of this matrix.
    pub(crate) fn dense(&self) -> Cow<'_, DenseMatrix<F>> {
        match self {
            Matrix::Dense(m) => Cow::Borrowed(m),
            Matrix::Sparse(m) => Cow::Owned(m.to_dense()),
        }
    }

    pub(crate) fn check_square(&self, op: &'static str) -> Result<()> {
        if self.is_square() {
            Ok(())
        } else {
            Err(LinalgError::mismatch(
                op,
                &[self.nrows(), self.ncols()],
                &[self.nrows(), self.nrows()],
            ))
        }
    }
}

impl<F: Field> Matrix<F> {
    /// Add two matrices, using the default compute context.
    pub fn add(&self, other: &Matrix<F>) -> Result<Matrix<F>> {
        self.add_with(other, ComputeContext::global())
    }

    /// Add two matrices. The result is sparse only if both operands are.
    pub fn add_with(&self, other: &Matrix<F>, ctx: &ComputeContext) -> Result<Matrix<F>> {
        ctx.provider(self.field())?.add(self, other)
    }

    /// Subtract `other` from this matrix, using the default compute context.
    pub fn subtract(&self, other: &Matrix<F>) -> Result<Matrix<F>> {
        self.subtract_with(other, ComputeContext::global())
    }

    /// Subtract `other` from this matrix, computed as `self + (-other)`.
    pub fn subtract_with(&self, other: &Matrix<F>, ctx: &ComputeContext) -> Result<Matrix<F>> {
        self.add_with(&other.negate(), ctx)
    }

    /// Multiply each entry by the scalar `e`, using the default compute context.
    pub fn scale(&self, e: &F::Element) -> Result<Matrix<F>> {
        self.scale_with(e, ComputeContext::global())
    }

    /// Multiply each entry by the scalar `e`.
    pub fn scale_with(&self, e: &F::Element, ctx: &ComputeContext) -> Result<Matrix<F>> {
        ctx.provider(self.field())?.scale(self, e)
    }

    /// Compute the matrix product `self * other`, using the default compute context.
    pub fn multiply(&self, other: &Matrix<F>) -> Result<Matrix<F>> {
        self.multiply_with(other, ComputeContext::global())
    }

    /// Compute the matrix product `self * other`. The product is not commutative.
    pub fn multiply_with(&self, other: &Matrix<F>, ctx: &ComputeContext) -> Result<Matrix<F>> {
        ctx.provider(self.field())?.multiply(self, other)
    }

    /// Multiply the matrix with the column vector `v`, using the default compute context.
    pub fn multiply_vector(&self, v: &Vector<F>) -> Result<Vector<F>> {
        self.multiply_vector_with(v, ComputeContext::global())
    }

    /// Multiply the matrix with the column vector `v`.
    pub fn multiply_vector_with(&self, v: &Vector<F>, ctx: &ComputeContext) -> Result<Vector<F>> {
        ctx.provider(self.field())?.multiply_vector(self, v)
    }

    /// Sum the diagonal entries, using the default compute context.
    pub fn trace(&self) -> Result<F::Element> {
        self.trace_with(ComputeContext::global())
    }

    /// Sum the diagonal entries of a square matrix.
    pub fn trace_with(&self, ctx: &ComputeContext) -> Result<F::Element> {
        ctx.provider(self.field())?.trace(self)
    }

    /// Compute the determinant, using the default compute context.
    pub fn determinant(&self) -> Result<F::Element> {
        self.determinant_with(ComputeContext::global())
    }

    /// Compute the determinant of a square matrix. A singular matrix has determinant zero.
    pub fn determinant_with(&self, ctx: &ComputeContext) -> Result<F::Element> {
        ctx.provider(self.field())?.determinant(self)
    }

    /// Compute the inverse, using the default compute context.
    pub fn inverse(&self) -> Result<Matrix<F>> {
        self.inverse_with(ComputeContext::global())
    }

    /// Compute the inverse of the matrix. The result is always dense.
    /// Fails with [SingularMatrix](crate::error::LinalgError::SingularMatrix) if the
    /// matrix is not square or not invertible.
    pub fn inverse_with(&self, ctx: &ComputeContext) -> Result<Matrix<F>> {
        ctx.provider(self.field())?.inverse(self)
    }

    /// Solve `self * x = b` for `x`, using the default compute context.
    pub fn solve(&self, b: &Vector<F>) -> Result<Vector<F>> {
        self.solve_with(b, ComputeContext::global())
    }

    /// Solve the square system `self * x = b` for `x`.
    /// Fails with [SingularMatrix](crate::error::LinalgError::SingularMatrix)
    /// if there is no unique solution.
    pub fn solve_with(&self, b: &Vector<F>, ctx: &ComputeContext) -> Result<Vector<F>> {
        ctx.provider(self.field())?.solve(self, b)
    }
}

impl<F: Ring> PartialEq for Matrix<F> {
    /// Compare the entries, regardless of the storage.
    fn eq(&self, other: &Self) -> bool {
        if self.nrows() != other.nrows() || self.ncols() != other.ncols() {
            return false;
        }

        if self.field() != other.field() {
            return false;
        }

        match (self, other) {
            (Matrix::Dense(a), Matrix::Dense(b)) => a.data == b.data,
            (Matrix::Sparse(a), Matrix::Sparse(b)) => a.rows == b.rows,
            (Matrix::Dense(d), Matrix::Sparse(s)) | (Matrix::Sparse(s), Matrix::Dense(d)) => {
                d.nnz() == s.nnz() && s.iter().all(|(i, j, e)| d[(i, j)] == *e)
            }
        }
    }
}

impl<F: Ring> Neg for &Matrix<F> {
    type Output = Matrix<F>;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

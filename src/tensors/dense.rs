use std::{ops::Index, ops::Range, slice::Chunks};

use rayon::prelude::*;

use crate::{
    compute::PARALLEL_THRESHOLD,
    domains::Ring,
    error::{LinalgError, Result},
};

use super::{SparseMatrix, Vector};

/// Compute `sum += a * b`, skipping the product if either factor is zero.
///
/// A product with a zero factor contributes nothing, also when the other factor
/// is infinite or NaN. Dense and sparse kernels both accumulate through this function.
#[inline]
pub(crate) fn add_product<F: Ring>(
    field: &F,
    sum: &mut F::Element,
    a: &F::Element,
    b: &F::Element,
) {
    if !F::is_zero(a) && !F::is_zero(b) {
        field.add_mul_assign(sum, a, b);
    }
}

/// Compute `x * e`, which is zero if either factor is zero.
#[inline]
pub(crate) fn scale_entry<F: Ring>(field: &F, x: &F::Element, e: &F::Element) -> F::Element {
    if F::is_zero(x) || F::is_zero(e) {
        field.zero()
    } else {
        field.mul(x, e)
    }
}

/// A matrix with entries that are elements of a ring `F`, stored in row-major order.
/// Every entry is materialized, including zeroes.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix<F: Ring> {
    pub(crate) data: Vec<F::Element>,
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
    pub(crate) field: F,
}

impl<F: Ring> DenseMatrix<F> {
    /// Create a new zeroed matrix with `nrows` rows and `ncols` columns.
    pub fn new(nrows: usize, ncols: usize, field: F) -> Result<DenseMatrix<F>> {
        let len = LinalgError::check_shape(nrows, ncols)?;

        Ok(DenseMatrix {
            data: (0..len).map(|_| field.zero()).collect(),
            nrows,
            ncols,
            field,
        })
    }

    /// Create an `nrows x nrows` matrix with ones on the main diagonal and zeroes elsewhere.
    pub fn identity(nrows: usize, field: F) -> Result<DenseMatrix<F>> {
        let mut m = DenseMatrix::new(nrows, nrows, field)?;
        for i in 0..nrows {
            m.data[i * nrows + i] = m.field.one();
        }
        Ok(m)
    }

    /// Convert a linear representation of a matrix to a `DenseMatrix`.
    pub fn from_linear(
        data: Vec<F::Element>,
        nrows: usize,
        ncols: usize,
        field: F,
    ) -> Result<DenseMatrix<F>> {
        if data.len() != LinalgError::check_shape(nrows, ncols)? {
            return Err(LinalgError::mismatch(
                "from_linear",
                &[data.len()],
                &[nrows, ncols],
            ));
        }

        Ok(DenseMatrix {
            data,
            nrows,
            ncols,
            field,
        })
    }

    /// Create a new matrix from a 2-dimensional vector of scalars.
    pub fn from_nested_vec(matrix: Vec<Vec<F::Element>>, field: F) -> Result<DenseMatrix<F>> {
        let nrows = matrix.len();
        let ncols = matrix.first().map(|r| r.len()).unwrap_or(0);
        if nrows == 0 || ncols == 0 {
            return Err(LinalgError::EmptyConstruction {
                rows: nrows,
                cols: ncols,
            });
        }

        let mut data = Vec::with_capacity(nrows * ncols);
        for d in matrix {
            if d.len() != ncols {
                return Err(LinalgError::mismatch(
                    "from_nested_vec",
                    &[d.len()],
                    &[ncols],
                ));
            }

            data.extend(d);
        }

        Ok(DenseMatrix {
            data,
            nrows,
            ncols,
            field,
        })
    }

    /// Return the number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Return the number of columns.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Return the field of the matrix entries.
    pub fn field(&self) -> &F {
        &self.field
    }

    /// Return the entries in row-major order.
    pub fn as_slice(&self) -> &[F::Element] {
        &self.data
    }

    /// Return an iterator over the rows of the matrix.
    pub fn row_iter(&self) -> Chunks<'_, F::Element> {
        self.data.chunks(self.ncols)
    }

    /// Get the entry at row `row` and column `col`.
    pub fn get(&self, row: usize, col: usize) -> Result<&F::Element> {
        LinalgError::check_index(row, self.nrows)?;
        LinalgError::check_index(col, self.ncols)?;
        Ok(&self.data[row * self.ncols + col])
    }

    /// Copy out row `row`.
    pub fn get_row(&self, row: usize) -> Result<Vector<F>> {
        LinalgError::check_index(row, self.nrows)?;
        Ok(Vector {
            data: self.data[row * self.ncols..(row + 1) * self.ncols].to_vec(),
            field: self.field.clone(),
        })
    }

    /// Copy out column `col`.
    pub fn get_column(&self, col: usize) -> Result<Vector<F>> {
        LinalgError::check_index(col, self.ncols)?;
        Ok(Vector {
            data: self.row_iter().map(|r| r[col].clone()).collect(),
            field: self.field.clone(),
        })
    }

    /// Copy out the block spanned by `rows` and `cols`.
    pub fn sub_matrix(&self, rows: Range<usize>, cols: Range<usize>) -> Result<DenseMatrix<F>> {
        check_block(&rows, &cols, self.nrows, self.ncols)?;

        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for r in rows.clone() {
            let start = r * self.ncols;
            data.extend_from_slice(&self.data[start + cols.start..start + cols.end]);
        }

        Ok(DenseMatrix {
            data,
            nrows: rows.len(),
            ncols: cols.len(),
            field: self.field.clone(),
        })
    }

    /// Return true iff every entry in the matrix is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|e| F::is_zero(e))
    }

    /// Return the number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.data.iter().filter(|e| !F::is_zero(e)).count()
    }

    /// Transpose the matrix.
    pub fn transpose(&self) -> DenseMatrix<F> {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.ncols {
            for i in 0..self.nrows {
                data.push(self.data[i * self.ncols + j].clone());
            }
        }

        DenseMatrix {
            data,
            nrows: self.ncols,
            ncols: self.nrows,
            field: self.field.clone(),
        }
    }

    /// Negate each entry of the matrix.
    pub fn negate(&self) -> DenseMatrix<F> {
        DenseMatrix {
            data: self.data.iter().map(|e| self.field.neg(e)).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
            field: self.field.clone(),
        }
    }

    /// Convert to sparse storage, dropping all zero entries.
    pub fn to_sparse(&self) -> SparseMatrix<F> {
        SparseMatrix::from_dense(self)
    }

    /// Multiply each entry by the scalar `e`.
    pub(crate) fn mul_scalar(&self, e: &F::Element) -> DenseMatrix<F> {
        let f = |x: &F::Element| scale_entry(&self.field, x, e);
        let data = if self.data.len() < PARALLEL_THRESHOLD {
            self.data.iter().map(f).collect()
        } else {
            self.data.par_iter().map(f).collect()
        };

        DenseMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
            field: self.field.clone(),
        }
    }

    /// Add two matrices.
    pub(crate) fn add(&self, rhs: &DenseMatrix<F>) -> Result<DenseMatrix<F>> {
        if self.nrows != rhs.nrows || self.ncols != rhs.ncols {
            return Err(LinalgError::mismatch(
                "add",
                &[self.nrows, self.ncols],
                &[rhs.nrows, rhs.ncols],
            ));
        }

        let f = |(a, b): (&F::Element, &F::Element)| self.field.add(a, b);
        let data = if self.data.len() < PARALLEL_THRESHOLD {
            self.data.iter().zip(&rhs.data).map(f).collect()
        } else {
            self.data.par_iter().zip(&rhs.data).map(f).collect()
        };

        Ok(DenseMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
            field: self.field.clone(),
        })
    }

    /// Multiply two matrices. Each output entry accumulates its products
    /// in increasing order of the inner index, starting from zero.
    pub(crate) fn mul(&self, rhs: &DenseMatrix<F>) -> Result<DenseMatrix<F>> {
        if self.ncols != rhs.nrows {
            return Err(LinalgError::mismatch(
                "multiply",
                &[self.nrows, self.ncols],
                &[rhs.nrows, rhs.ncols],
            ));
        }

        let mut m = DenseMatrix::new(self.nrows, rhs.ncols, self.field.clone())?;
        let row = |(i, out): (usize, &mut [F::Element])| {
            for (j, sum) in out.iter_mut().enumerate() {
                for k in 0..self.ncols {
                    add_product(
                        &self.field,
                        sum,
                        &self.data[i * self.ncols + k],
                        &rhs.data[k * rhs.ncols + j],
                    );
                }
            }
        };

        if m.data.len() < PARALLEL_THRESHOLD {
            m.data.chunks_mut(rhs.ncols).enumerate().for_each(row);
        } else {
            m.data.par_chunks_mut(rhs.ncols).enumerate().for_each(row);
        }

        Ok(m)
    }

    /// Multiply the matrix with the column vector `v`.
    pub(crate) fn mul_vector(&self, v: &Vector<F>) -> Result<Vector<F>> {
        if self.ncols != v.data.len() {
            return Err(LinalgError::mismatch(
                "multiply_vector",
                &[self.nrows, self.ncols],
                &[v.data.len()],
            ));
        }

        let f = |row: &[F::Element]| {
            let mut sum = self.field.zero();
            for (a, b) in row.iter().zip(&v.data) {
                add_product(&self.field, &mut sum, a, b);
            }
            sum
        };

        let data = if self.data.len() < PARALLEL_THRESHOLD {
            self.row_iter().map(f).collect()
        } else {
            self.data.par_chunks(self.ncols).map(f).collect()
        };

        Ok(Vector {
            data,
            field: self.field.clone(),
        })
    }

    /// Sum the diagonal entries.
    pub(crate) fn trace(&self) -> Result<F::Element> {
        if self.nrows != self.ncols {
            return Err(LinalgError::mismatch(
                "trace",
                &[self.nrows, self.ncols],
                &[self.nrows, self.nrows],
            ));
        }

        let mut sum = self.field.zero();
        for i in 0..self.nrows {
            self.field
                .add_assign(&mut sum, &self.data[i * self.ncols + i]);
        }
        Ok(sum)
    }

    /// Swap rows `i` and `k`, starting from column `start_col`.
    pub(crate) fn swap_rows(&mut self, i: usize, k: usize, start_col: usize) {
        for l in start_col..self.ncols {
            self.data.swap(self.ncols * i + l, self.ncols * k + l);
        }
    }
}

impl<F: Ring> Index<(usize, usize)> for DenseMatrix<F> {
    type Output = F::Element;

    /// Get the `i`th row and `j`th column of the matrix, where `index=(i,j)`.
    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.data[index.0 * self.ncols + index.1]
    }
}

/// Check that the non-empty block `rows x cols` lies within an `nrows x ncols` matrix.
pub(crate) fn check_block(
    rows: &Range<usize>,
    cols: &Range<usize>,
    nrows: usize,
    ncols: usize,
) -> Result<()> {
    if rows.is_empty() || cols.is_empty() {
        return Err(LinalgError::EmptyConstruction {
            rows: rows.len(),
            cols: cols.len(),
        });
    }

    LinalgError::check_index(rows.end - 1, nrows)?;
    LinalgError::check_index(cols.end - 1, ncols)
}

use std::{collections::BTreeMap, ops::Range};

use crate::{
    domains::Ring,
    error::{LinalgError, Result},
};

use super::{
    dense::{add_product, check_block, scale_entry},
    DenseMatrix, Vector,
};

/// A matrix that only stores its non-zero entries, ordered by row and then by column.
///
/// Absent entries are zero, and a stored entry is never zero. Sparse matrices are
/// immutable; use a [SparseMatrixBuilder] to construct one.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseMatrix<F: Ring> {
    pub(crate) rows: BTreeMap<usize, BTreeMap<usize, F::Element>>,
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
    pub(crate) field: F,
}

/// Populates a [SparseMatrix] entry by entry.
///
/// ```
/// use fieldlinalg::{domains::float::FloatField, tensors::SparseMatrixBuilder};
///
/// let mut b = SparseMatrixBuilder::new(3, 3, FloatField).unwrap();
/// b.set(0, 0, 1.).unwrap().set(2, 1, 4.).unwrap();
/// let m = b.build();
/// assert_eq!(m.nnz(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct SparseMatrixBuilder<F: Ring> {
    matrix: SparseMatrix<F>,
}

impl<F: Ring> SparseMatrixBuilder<F> {
    /// Start building an `nrows x ncols` matrix with all entries zero.
    pub fn new(nrows: usize, ncols: usize, field: F) -> Result<SparseMatrixBuilder<F>> {
        Ok(SparseMatrixBuilder {
            matrix: SparseMatrix::new(nrows, ncols, field)?,
        })
    }

    /// Set the entry at `(row, col)`. Setting a zero removes the entry.
    pub fn set(&mut self, row: usize, col: usize, value: F::Element) -> Result<&mut Self> {
        self.matrix.set(row, col, value)?;
        Ok(self)
    }

    /// Get the entry at `(row, col)` as set so far.
    pub fn get(&self, row: usize, col: usize) -> Result<F::Element> {
        self.matrix.get(row, col)
    }

    pub fn build(self) -> SparseMatrix<F> {
        self.matrix
    }
}

impl<F: Ring> SparseMatrix<F> {
    /// Create an `nrows x ncols` zero matrix.
    ///
    /// The shape must be non-empty and its number of entries must fit in a `usize`,
    /// so that the matrix can always be converted to dense storage.
    pub fn new(nrows: usize, ncols: usize, field: F) -> Result<SparseMatrix<F>> {
        LinalgError::check_shape(nrows, ncols)?;

        Ok(SparseMatrix {
            rows: BTreeMap::new(),
            nrows,
            ncols,
            field,
        })
    }

    /// Create a square matrix with `diag` on the main diagonal.
    pub fn from_diagonal(diag: Vec<F::Element>, field: F) -> Result<SparseMatrix<F>> {
        let mut m = SparseMatrix::new(diag.len(), diag.len(), field)?;
        for (i, e) in diag.into_iter().enumerate() {
            m.set(i, i, e)?;
        }
        Ok(m)
    }

    /// Convert a dense matrix, dropping all zero entries.
    pub fn from_dense(m: &DenseMatrix<F>) -> SparseMatrix<F> {
        let mut rows = BTreeMap::new();
        for (i, r) in m.row_iter().enumerate() {
            let row: BTreeMap<_, _> = r
                .iter()
                .enumerate()
                .filter(|(_, e)| !F::is_zero(e))
                .map(|(j, e)| (j, e.clone()))
                .collect();
            if !row.is_empty() {
                rows.insert(i, row);
            }
        }

        SparseMatrix {
            rows,
            nrows: m.nrows,
            ncols: m.ncols,
            field: m.field.clone(),
        }
    }

    /// Continue modifying a copy of this matrix.
    pub fn into_builder(self) -> SparseMatrixBuilder<F> {
        SparseMatrixBuilder { matrix: self }
    }

    fn set(&mut self, row: usize, col: usize, value: F::Element) -> Result<()> {
        LinalgError::check_index(row, self.nrows)?;
        LinalgError::check_index(col, self.ncols)?;

        if F::is_zero(&value) {
            if let Some(r) = self.rows.get_mut(&row) {
                r.remove(&col);
                if r.is_empty() {
                    self.rows.remove(&row);
                }
            }
        } else {
            self.rows.entry(row).or_default().insert(col, value);
        }

        Ok(())
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    /// Return the number of stored, non-zero entries.
    pub fn nnz(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Get the entry at `(row, col)`, which is zero if it is not stored.
    pub fn get(&self, row: usize, col: usize) -> Result<F::Element> {
        LinalgError::check_index(row, self.nrows)?;
        LinalgError::check_index(col, self.ncols)?;

        Ok(self
            .rows
            .get(&row)
            .and_then(|r| r.get(&col))
            .cloned()
            .unwrap_or_else(|| self.field.zero()))
    }

    /// Iterate over the non-zero entries as `(row, col, value)`, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &F::Element)> {
        self.rows
            .iter()
            .flat_map(|(i, r)| r.iter().map(move |(j, e)| (*i, *j, e)))
    }

    /// Copy out row `row`.
    pub fn get_row(&self, row: usize) -> Result<Vector<F>> {
        LinalgError::check_index(row, self.nrows)?;

        let mut data = vec![self.field.zero(); self.ncols];
        if let Some(r) = self.rows.get(&row) {
            for (j, e) in r {
                data[*j] = e.clone();
            }
        }

        Ok(Vector {
            data,
            field: self.field.clone(),
        })
    }

    /// Copy out column `col`.
    pub fn get_column(&self, col: usize) -> Result<Vector<F>> {
        LinalgError::check_index(col, self.ncols)?;

        let mut data = vec![self.field.zero(); self.nrows];
        for (i, r) in &self.rows {
            if let Some(e) = r.get(&col) {
                data[*i] = e.clone();
            }
        }

        Ok(Vector {
            data,
            field: self.field.clone(),
        })
    }

    /// Copy out the block spanned by `rows` and `cols`.
    pub fn sub_matrix(&self, rows: Range<usize>, cols: Range<usize>) -> Result<SparseMatrix<F>> {
        check_block(&rows, &cols, self.nrows, self.ncols)?;

        let mut out = BTreeMap::new();
        for (i, r) in self.rows.range(rows.clone()) {
            let row: BTreeMap<_, _> = r
                .range(cols.clone())
                .map(|(j, e)| (j - cols.start, e.clone()))
                .collect();
            if !row.is_empty() {
                out.insert(i - rows.start, row);
            }
        }

        Ok(SparseMatrix {
            rows: out,
            nrows: rows.len(),
            ncols: cols.len(),
            field: self.field.clone(),
        })
    }

    /// Materialize every entry.
    pub fn to_dense(&self) -> DenseMatrix<F> {
        let mut data = vec![self.field.zero(); self.nrows * self.ncols];
        for (i, j, e) in self.iter() {
            data[i * self.ncols + j] = e.clone();
        }

        DenseMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
            field: self.field.clone(),
        }
    }

    pub fn transpose(&self) -> SparseMatrix<F> {
        let mut rows: BTreeMap<usize, BTreeMap<usize, F::Element>> = BTreeMap::new();
        for (i, j, e) in self.iter() {
            rows.entry(j).or_default().insert(i, e.clone());
        }

        SparseMatrix {
            rows,
            nrows: self.ncols,
            ncols: self.nrows,
            field: self.field.clone(),
        }
    }

    pub fn negate(&self) -> SparseMatrix<F> {
        self.map_non_zero(|e| self.field.neg(e))
    }

    /// Apply `f` to every stored entry, dropping entries that become zero.
    fn map_non_zero(&self, f: impl Fn(&F::Element) -> F::Element) -> SparseMatrix<F> {
        let mut rows = BTreeMap::new();
        for (i, r) in &self.rows {
            let row: BTreeMap<_, _> = r
                .iter()
                .map(|(j, e)| (*j, f(e)))
                .filter(|(_, e)| !F::is_zero(e))
                .collect();
            if !row.is_empty() {
                rows.insert(*i, row);
            }
        }

        SparseMatrix {
            rows,
            nrows: self.nrows,
            ncols: self.ncols,
            field: self.field.clone(),
        }
    }

    pub(crate) fn mul_scalar(&self, e: &F::Element) -> SparseMatrix<F> {
        self.map_non_zero(|x| scale_entry(&self.field, x, e))
    }

    pub(crate) fn add(&self, rhs: &SparseMatrix<F>) -> Result<SparseMatrix<F>> {
        if self.nrows != rhs.nrows || self.ncols != rhs.ncols {
            return Err(LinalgError::mismatch(
                "add",
                &[self.nrows, self.ncols],
                &[rhs.nrows, rhs.ncols],
            ));
        }

        let mut out = self.clone();
        for (i, j, e) in rhs.iter() {
            let row = out.rows.entry(i).or_default();
            match row.get_mut(&j) {
                Some(a) => {
                    self.field.add_assign(a, e);
                    if F::is_zero(a) {
                        row.remove(&j);
                    }
                }
                None => {
                    row.insert(j, e.clone());
                }
            }
            if row.is_empty() {
                out.rows.remove(&i);
            }
        }

        Ok(out)
    }

    /// Multiply two sparse matrices. Each output entry accumulates its products
    /// in increasing order of the inner index, starting from zero.
    pub(crate) fn mul(&self, rhs: &SparseMatrix<F>) -> Result<SparseMatrix<F>> {
        if self.ncols != rhs.nrows {
            return Err(LinalgError::mismatch(
                "multiply",
                &[self.nrows, self.ncols],
                &[rhs.nrows, rhs.ncols],
            ));
        }

        LinalgError::check_shape(self.nrows, rhs.ncols)?;

        let mut rows = BTreeMap::new();
        for (i, r) in &self.rows {
            let mut acc: BTreeMap<usize, F::Element> = BTreeMap::new();
            for (k, a) in r {
                if let Some(rhs_row) = rhs.rows.get(k) {
                    for (j, b) in rhs_row {
                        let sum = acc.entry(*j).or_insert_with(|| self.field.zero());
                        add_product(&self.field, sum, a, b);
                    }
                }
            }

            acc.retain(|_, e| !F::is_zero(e));
            if !acc.is_empty() {
                rows.insert(*i, acc);
            }
        }

        Ok(SparseMatrix {
            rows,
            nrows: self.nrows,
            ncols: rhs.ncols,
            field: self.field.clone(),
        })
    }

    pub(crate) fn mul_vector(&self, v: &Vector<F>) -> Result<Vector<F>> {
        if self.ncols != v.data.len() {
            return Err(LinalgError::mismatch(
                "multiply_vector",
                &[self.nrows, self.ncols],
                &[v.data.len()],
            ));
        }

        let mut data = vec![self.field.zero(); self.nrows];
        for (i, r) in &self.rows {
            for (j, a) in r {
                add_product(&self.field, &mut data[*i], a, &v.data[*j]);
            }
        }

        Ok(Vector {
            data,
            field: self.field.clone(),
        })
    }

    pub(crate) fn trace(&self) -> Result<F::Element> {
        if self.nrows != self.ncols {
            return Err(LinalgError::mismatch(
                "trace",
                &[self.nrows, self.ncols],
                &[self.nrows, self.nrows],
            ));
        }

        let mut sum = self.field.zero();
        for (i, r) in &self.rows {
            if let Some(e) = r.get(i) {
                self.field.add_assign(&mut sum, e);
            }
        }
        Ok(sum)
    }
}

use std::fmt::{self, Display, Formatter};

use crate::{
    domains::Ring,
    error::{LinalgError, Result},
};

use super::DenseMatrix;

/// The fraction of non-zero entries below which [MatrixHint::Auto] selects sparse storage.
pub const AUTO_SPARSE_DENSITY: f64 = 0.2;

/// An advisory tag that steers the storage of a new [Matrix](super::Matrix).
///
/// The hint is only consulted at construction time. It is not stored and
/// it is not enforced afterwards: a matrix built as `Symmetric` is an ordinary
/// dense matrix, and arithmetic on it may produce non-symmetric results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatrixHint {
    Dense,
    Sparse,
    Symmetric,
    Diagonal,
    TriangularUpper,
    TriangularLower,
    Banded,
    Tridiagonal,
    /// Pick sparse storage if the density is below [AUTO_SPARSE_DENSITY].
    #[default]
    Auto,
}

impl MatrixHint {
    /// Return `true` if the hint only applies to square matrices.
    pub fn requires_square(&self) -> bool {
        matches!(
            self,
            MatrixHint::Symmetric
                | MatrixHint::Diagonal
                | MatrixHint::TriangularUpper
                | MatrixHint::TriangularLower
                | MatrixHint::Tridiagonal
        )
    }

    /// Decide whether `m` should be stored sparsely.
    ///
    /// Structured hints whose non-zero pattern is mostly empty map to sparse storage.
    /// The content of `m` is never checked against the structure the hint describes.
    pub(crate) fn prefers_sparse<F: Ring>(&self, m: &DenseMatrix<F>) -> Result<bool> {
        if self.requires_square() && m.nrows != m.ncols {
            return Err(LinalgError::mismatch(
                "with_hint",
                &[m.nrows, m.ncols],
                &[m.nrows, m.nrows],
            ));
        }

        Ok(match self {
            MatrixHint::Dense | MatrixHint::Symmetric => false,
            MatrixHint::Sparse
            | MatrixHint::Diagonal
            | MatrixHint::TriangularUpper
            | MatrixHint::TriangularLower
            | MatrixHint::Banded
            | MatrixHint::Tridiagonal => true,
            MatrixHint::Auto => {
                (m.nnz() as f64) / (m.data.len() as f64) < AUTO_SPARSE_DENSITY
            }
        })
    }
}

impl Display for MatrixHint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatrixHint::Dense => "dense",
            MatrixHint::Sparse => "sparse",
            MatrixHint::Symmetric => "symmetric",
            MatrixHint::Diagonal => "diagonal",
            MatrixHint::TriangularUpper => "upper triangular",
            MatrixHint::TriangularLower => "lower triangular",
            MatrixHint::Banded => "banded",
            MatrixHint::Tridiagonal => "tridiagonal",
            MatrixHint::Auto => "auto",
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{domains::float::FloatField, error::LinalgError, tensors::DenseMatrix};

    use super::MatrixHint;

    #[test]
    fn auto_density() {
        let mut data = vec![0.; 25];
        data[0] = 1.;
        data[6] = 1.;
        data[12] = 1.;
        data[18] = 1.;
        let m = DenseMatrix::from_linear(data.clone(), 5, 5, FloatField).unwrap();
        assert!(MatrixHint::Auto.prefers_sparse(&m).unwrap());

        // exactly at the threshold stays dense
        data[24] = 1.;
        let m = DenseMatrix::from_linear(data, 5, 5, FloatField).unwrap();
        assert!(!MatrixHint::Auto.prefers_sparse(&m).unwrap());
        assert!(MatrixHint::Sparse.prefers_sparse(&m).unwrap());
        assert!(!MatrixHint::Symmetric.prefers_sparse(&m).unwrap());
    }

    #[test]
    fn square_hints() {
        let m = DenseMatrix::new(2, 3, FloatField).unwrap();
        assert!(matches!(
            MatrixHint::Diagonal.prefers_sparse(&m),
            Err(LinalgError::DimensionMismatch { op: "with_hint", .. })
        ));
        assert!(MatrixHint::Banded.prefers_sparse(&m).unwrap());
        assert!(MatrixHint::Auto.prefers_sparse(&m).unwrap());
    }
}

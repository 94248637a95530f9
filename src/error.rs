//! Error types for linear algebra operations.

use thiserror::Error;

/// Result type alias using [LinalgError].
pub type Result<T> = std::result::Result<T, LinalgError>;

/// Errors that can occur when constructing or operating on vectors and matrices.
///
/// All errors are reported at the point of the failing operation. None of them
/// are retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinalgError {
    /// The shapes of the operands are incompatible for the requested operation.
    #[error("Dimension mismatch in '{op}': {lhs:?} vs {rhs:?}")]
    DimensionMismatch {
        /// The operation name
        op: &'static str,
        /// Shape of the left-hand side
        lhs: Vec<usize>,
        /// Shape of the right-hand side, or the required shape
        rhs: Vec<usize>,
    },

    /// An index lies outside `[0, size)`.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// The matrix is not invertible, or not square.
    #[error("The matrix is singular")]
    SingularMatrix,

    /// The multiplicative inverse of zero was requested.
    #[error("Division by zero")]
    DivisionByZero,

    /// Accelerated execution was demanded but cannot be provided.
    #[error("Hardware acceleration unavailable: {reason}")]
    UnsupportedAcceleration {
        /// Why no accelerator could be used
        reason: String,
    },

    /// A vector or matrix with zero rows or columns was requested.
    #[error("Cannot construct an empty {rows}x{cols} object")]
    EmptyConstruction {
        /// Requested number of rows
        rows: usize,
        /// Requested number of columns
        cols: usize,
    },

    /// The number of entries of a `rows x cols` shape does not fit in a `usize`.
    #[error("A {rows}x{cols} matrix has too many entries")]
    ShapeOverflow {
        /// Requested number of rows
        rows: usize,
        /// Requested number of columns
        cols: usize,
    },

    /// The scalar field lacks an operation required by the kernel, such as a square root.
    #[error("The scalar field {field} does not support '{op}'")]
    MissingCapability {
        /// The operation name
        op: &'static str,
        /// Name of the field
        field: String,
    },

    /// A configuration value could not be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl LinalgError {
    pub(crate) fn mismatch(op: &'static str, lhs: &[usize], rhs: &[usize]) -> LinalgError {
        LinalgError::DimensionMismatch {
            op,
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    /// Check that a `rows x cols` shape is non-empty and that its number of
    /// entries is representable, returning that number.
    pub(crate) fn check_shape(rows: usize, cols: usize) -> Result<usize> {
        if rows == 0 || cols == 0 {
            return Err(LinalgError::EmptyConstruction { rows, cols });
        }

        rows.checked_mul(cols)
            .ok_or(LinalgError::ShapeOverflow { rows, cols })
    }

    /// Check that `index < size`.
    #[inline]
    pub(crate) fn check_index(index: usize, size: usize) -> Result<()> {
        if index < size {
            Ok(())
        } else {
            Err(LinalgError::IndexOutOfBounds { index, size })
        }
    }
}

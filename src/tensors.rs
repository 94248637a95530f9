//! Vectors and matrices over a [Ring](crate::domains::Ring).
//!
//! A [Matrix] is backed either by a [DenseMatrix], which materializes every entry,
//! or by a [SparseMatrix], which only stores the non-zero entries. Both are
//! immutable after construction; a [SparseMatrixBuilder] is used to populate
//! sparse matrices entry by entry.
//!
//! Arithmetic is not performed by the matrices themselves, but by a
//! [LinearAlgebraProvider](crate::compute::LinearAlgebraProvider) that is selected for every
//! operation from a [ComputeContext](crate::compute::ComputeContext).
pub mod dense;
pub mod hint;
pub mod matrix;
pub mod sparse;
pub mod vector;

pub use dense::DenseMatrix;
pub use hint::MatrixHint;
pub use matrix::Matrix;
pub use sparse::{SparseMatrix, SparseMatrixBuilder};
pub use vector::Vector;

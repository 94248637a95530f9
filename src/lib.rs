//! Fieldlinalg is a linear algebra library for vectors and matrices over arbitrary fields.
//!
//! It supports dense and sparse storage, Gaussian elimination with partial pivoting
//! and pluggable compute backends, which can offload work to an accelerator device.
//!
//! For example:
//!
//! ```
//! use fieldlinalg::{
//!     compute::{ComputeContext, ComputeMode},
//!     domains::finite_field::FiniteField,
//!     tensors::{Matrix, Vector},
//! };
//!
//! let ctx = ComputeContext::new(ComputeMode::Cpu);
//! let f = FiniteField::new(17).unwrap();
//! let a = Matrix::from_linear((1..=4).map(|i| f.to_element(i)).collect(), 2, 2, f).unwrap();
//!
//! let det = a.determinant_with(&ctx).unwrap();
//! assert_eq!(det, f.to_element(-2));
//!
//! let b = Vector::new(vec![f.to_element(5), f.to_element(6)], f).unwrap();
//! let x = a.solve_with(&b, &ctx).unwrap();
//! assert_eq!(a.multiply_vector_with(&x, &ctx).unwrap(), b);
//! ```
//!
//! Operations without an explicit context use
//! [ComputeContext::global](compute::ComputeContext::global), whose mode can be set with
//! the environment variable `FIELDLINALG_COMPUTE_MODE`.

pub mod compute;
pub mod domains;
pub mod error;
pub mod printer;
pub mod tensors;

pub use error::{LinalgError, Result};

//! Formatting of vectors and matrices.

use std::fmt::{self, Display, Formatter};

use crate::{
    domains::Ring,
    tensors::{DenseMatrix, Matrix, SparseMatrix, Vector},
};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PrintMode {
    /// Nested braces, such as `{{1,2},{3,4}}`.
    #[default]
    Compact,
    /// A LaTeX `pmatrix`.
    Latex,
}

/// Prints a vector as a row in the given mode.
pub struct VectorPrinter<'a, F: Ring> {
    pub vector: &'a Vector<F>,
    pub print_mode: PrintMode,
}

impl<'a, F: Ring> VectorPrinter<'a, F> {
    pub fn new(vector: &'a Vector<F>, print_mode: PrintMode) -> VectorPrinter<'a, F> {
        VectorPrinter { vector, print_mode }
    }
}

impl<'a, F: Ring> Display for VectorPrinter<'a, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.print_mode {
            PrintMode::Compact => {
                f.write_str("{")?;
                write_row(f, self.vector.iter(), ",")?;
                f.write_str("}")
            }
            PrintMode::Latex => {
                f.write_str("\\begin{pmatrix}")?;
                write_row(f, self.vector.iter(), "&")?;
                f.write_str("\\end{pmatrix}")
            }
        }
    }
}

/// Prints all entries of a matrix, including zeroes, in the given mode.
pub struct MatrixPrinter<'a, F: Ring> {
    pub matrix: &'a Matrix<F>,
    pub print_mode: PrintMode,
}

impl<'a, F: Ring> MatrixPrinter<'a, F> {
    pub fn new(matrix: &'a Matrix<F>, print_mode: PrintMode) -> MatrixPrinter<'a, F> {
        MatrixPrinter { matrix, print_mode }
    }
}

impl<'a, F: Ring> Display for MatrixPrinter<'a, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_dense(f, &self.matrix.dense(), self.print_mode)
    }
}

fn write_dense<F: Ring>(
    f: &mut Formatter<'_>,
    m: &DenseMatrix<F>,
    print_mode: PrintMode,
) -> fmt::Result {
    let (open, sep, close) = match print_mode {
        PrintMode::Compact => ("{", ",", "}"),
        PrintMode::Latex => ("\\begin{pmatrix}", "\\\\", "\\end{pmatrix}"),
    };

    f.write_str(open)?;
    for (i, row) in m.row_iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }

        match print_mode {
            PrintMode::Compact => {
                f.write_str("{")?;
                write_row(f, row.iter(), ",")?;
                f.write_str("}")?;
            }
            PrintMode::Latex => write_row(f, row.iter(), "&")?,
        }
    }
    f.write_str(close)
}

fn write_row<'a, E: Display + 'a>(
    f: &mut Formatter<'_>,
    row: impl Iterator<Item = &'a E>,
    sep: &str,
) -> fmt::Result {
    for (i, e) in row.enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        e.fmt(f)?;
    }
    Ok(())
}

impl<F: Ring> Display for Vector<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        VectorPrinter::new(self, PrintMode::Compact).fmt(f)
    }
}

impl<F: Ring> Display for Matrix<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        MatrixPrinter::new(self, PrintMode::Compact).fmt(f)
    }
}

impl<F: Ring> Display for DenseMatrix<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_dense(f, self, PrintMode::Compact)
    }
}

impl<F: Ring> Display for SparseMatrix<F> {
    /// Print the non-zero entries as `{(row,col):value,...}`, followed by the shape.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (n, (i, j, e)) in self.iter().enumerate() {
            if n > 0 {
                f.write_str(",")?;
            }
            write!(f, "({},{}):{}", i, j, e)?;
        }
        write!(f, "}}[{}x{}]", self.nrows(), self.ncols())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        domains::{finite_field::FiniteField, float::FloatField},
        tensors::{Matrix, SparseMatrixBuilder, Vector},
    };

    use super::{MatrixPrinter, PrintMode, VectorPrinter};

    #[test]
    fn print() {
        let m = Matrix::from_nested_vec(vec![vec![1., 2.5], vec![0., -4.]], FloatField).unwrap();
        assert_eq!(m.to_string(), "{{1,2.5},{0,-4}}");
        assert_eq!(m.to_sparse().to_string(), "{{1,2.5},{0,-4}}");
        assert_eq!(
            MatrixPrinter::new(&m, PrintMode::Latex).to_string(),
            "\\begin{pmatrix}1&2.5\\\\0&-4\\end{pmatrix}"
        );

        let f = FiniteField::new(7).unwrap();
        let v = Vector::new(vec![f.to_element(3), f.to_element(-1)], f).unwrap();
        assert_eq!(v.to_string(), "{3,6}");
        assert_eq!(
            VectorPrinter::new(&v, PrintMode::Latex).to_string(),
            "\\begin{pmatrix}3&6\\end{pmatrix}"
        );
    }

    #[test]
    fn print_sparse() {
        let mut b = SparseMatrixBuilder::new(2, 3, FloatField).unwrap();
        b.set(1, 2, 5.).unwrap().set(0, 0, 1.).unwrap();
        assert_eq!(b.build().to_string(), "{(0,0):1,(1,2):5}[2x3]");
    }
}

//! Gaussian elimination with partial pivoting on a scratch copy of a matrix.

use std::cmp::Ordering;

use crate::{
    domains::Field,
    error::{LinalgError, Result},
    tensors::{DenseMatrix, Vector},
};

/// Select the pivot for column `col` among the rows `col..nrows`: the non-zero
/// entry of largest magnitude, preferring the first one found on a tie.
fn select_pivot<F: Field>(m: &DenseMatrix<F>, col: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    for k in col..m.nrows {
        let e = &m[(k, col)];
        if F::is_zero(e) {
            continue;
        }

        match best {
            Some(b) if m.field.abs_cmp(e, &m[(b, col)]) != Ordering::Greater => {}
            _ => best = Some(k),
        }
    }
    best
}

/// Write the first `max_col` columns of the square part of `m` in echelon form.
///
/// Returns the determinant of the leading `max_col x max_col` block, i.e. the product
/// of the pivots negated once per row swap, or `None` if a column has no pivot.
fn forward_eliminate<F: Field>(
    m: &mut DenseMatrix<F>,
    max_col: usize,
) -> Result<Option<F::Element>> {
    let field = m.field.clone();
    let ncols = m.ncols;
    let mut det = field.one();

    for j in 0..max_col {
        let Some(k) = select_pivot(m, j) else {
            return Ok(None);
        };

        if k != j {
            m.swap_rows(j, k, j);
            det = field.neg(&det);
        }

        let inv_x = field.inv(&m[(j, j)])?;
        field.mul_assign(&mut det, &m[(j, j)]);

        for r in j + 1..m.nrows {
            let (top, bottom) = m.data.split_at_mut(r * ncols);
            let pivot_row = &top[j * ncols..(j + 1) * ncols];
            let row = &mut bottom[..ncols];

            if F::is_zero(&row[j]) {
                continue;
            }

            let s = field.mul(&row[j], &inv_x);
            row[j] = field.zero();
            for l in j + 1..ncols {
                field.sub_mul_assign(&mut row[l], &pivot_row[l], &s);
            }
        }
    }

    Ok(Some(det))
}

/// Reduce an `n x (n + m)` matrix with its leading block in echelon form, so that
/// the leading block becomes the identity.
fn back_substitute<F: Field>(m: &mut DenseMatrix<F>, n: usize) -> Result<()> {
    let field = m.field.clone();
    let ncols = m.ncols;

    for i in (0..n).rev() {
        if !field.is_one(&m[(i, i)]) {
            let inv_x = field.inv(&m[(i, i)])?;
            for l in i..ncols {
                field.mul_assign(&mut m.data[i * ncols + l], &inv_x);
            }
        }

        let (top, bottom) = m.data.split_at_mut(i * ncols);
        let pivot_row = &bottom[..ncols];
        for row in top.chunks_mut(ncols) {
            if F::is_zero(&row[i]) {
                continue;
            }

            let scale = std::mem::replace(&mut row[i], field.zero());
            for l in i + 1..ncols {
                field.sub_mul_assign(&mut row[l], &pivot_row[l], &scale);
            }
        }
    }

    Ok(())
}

/// Solve `a * X = b` for the `n x m` block `b`, which is stored row-major.
fn gauss_jordan<F: Field>(
    a: &DenseMatrix<F>,
    b: &[F::Element],
    m: usize,
) -> Result<Vec<F::Element>> {
    let n = a.nrows;
    let mut aug = DenseMatrix::new(n, n + m, a.field.clone())?;
    for (r, row) in a.row_iter().enumerate() {
        aug.data[r * (n + m)..r * (n + m) + n].clone_from_slice(row);
        aug.data[r * (n + m) + n..(r + 1) * (n + m)].clone_from_slice(&b[r * m..(r + 1) * m]);
    }

    if forward_eliminate(&mut aug, n)?.is_none() {
        return Err(LinalgError::SingularMatrix);
    }

    back_substitute(&mut aug, n)?;

    let mut x = Vec::with_capacity(n * m);
    for row in aug.row_iter() {
        x.extend_from_slice(&row[n..]);
    }
    Ok(x)
}

/// Compute the determinant of a square matrix. A singular matrix has determinant zero.
pub(crate) fn determinant<F: Field>(a: &DenseMatrix<F>) -> Result<F::Element> {
    if a.nrows != a.ncols {
        return Err(LinalgError::mismatch(
            "determinant",
            &[a.nrows, a.ncols],
            &[a.nrows, a.nrows],
        ));
    }

    let mut scratch = a.clone();
    Ok(forward_eliminate(&mut scratch, a.nrows)?.unwrap_or_else(|| a.field.zero()))
}

/// Compute the inverse of a square matrix by reducing `[a | 1]` to `[1 | a^-1]`.
pub(crate) fn inverse<F: Field>(a: &DenseMatrix<F>) -> Result<DenseMatrix<F>> {
    if a.nrows != a.ncols {
        return Err(LinalgError::SingularMatrix);
    }

    let id = DenseMatrix::identity(a.nrows, a.field.clone())?;
    let data = gauss_jordan(a, &id.data, a.nrows)?;
    DenseMatrix::from_linear(data, a.nrows, a.ncols, a.field.clone())
}

/// Solve the square system `a * x = b`.
pub(crate) fn solve<F: Field>(a: &DenseMatrix<F>, b: &Vector<F>) -> Result<Vector<F>> {
    if a.nrows != a.ncols {
        return Err(LinalgError::SingularMatrix);
    }

    if b.data.len() != a.nrows {
        return Err(LinalgError::mismatch(
            "solve",
            &[a.nrows, a.ncols],
            &[b.data.len()],
        ));
    }

    let data = gauss_jordan(a, &b.data, 1)?;
    Vector::new(data, a.field.clone())
}

#[cfg(test)]
mod test {
    use crate::{
        domains::{finite_field::FiniteField, float::FloatField, Ring},
        error::LinalgError,
        tensors::{DenseMatrix, Vector},
    };

    use super::{determinant, inverse, select_pivot, solve};

    #[test]
    fn pivot_by_magnitude() {
        let a = DenseMatrix::from_linear(vec![1., 0., -4., 0., 4., 0.], 3, 2, FloatField).unwrap();
        // -4 and 4 have equal magnitude, so the first one is kept
        assert_eq!(select_pivot(&a, 0), Some(1));

        let f = FiniteField::new(11).unwrap();
        let b = DenseMatrix::from_linear(
            vec![f.zero(), f.to_element(3), f.to_element(9)],
            3,
            1,
            f,
        )
        .unwrap();
        assert_eq!(select_pivot(&b, 0), Some(1));

        let z = DenseMatrix::new(2, 2, FloatField).unwrap();
        assert_eq!(select_pivot(&z, 0), None);
    }

    #[test]
    fn determinant_float() {
        let a = DenseMatrix::from_linear(vec![1., 2., 3., 4.], 2, 2, FloatField).unwrap();
        assert!((determinant(&a).unwrap() + 2.).abs() < 1e-12);

        let b = DenseMatrix::from_linear(
            vec![0., 2., 1., 1., 0., 0., 3., 1., 2.],
            3,
            3,
            FloatField,
        )
        .unwrap();
        assert!((determinant(&b).unwrap() + 3.).abs() < 1e-12);

        let singular = DenseMatrix::from_linear(vec![1., 2., 2., 4.], 2, 2, FloatField).unwrap();
        assert_eq!(determinant(&singular).unwrap(), 0.);
    }

    #[test]
    fn inverse_finite_field() {
        let f = FiniteField::new(17).unwrap();
        let a = DenseMatrix::from_linear(
            [1, 2, 3, 0, 1, 4, 5, 6, 0].iter().map(|x| f.to_element(*x)).collect(),
            3,
            3,
            f,
        )
        .unwrap();

        assert_eq!(determinant(&a).unwrap(), f.to_element(1));

        let inv = inverse(&a).unwrap();
        assert_eq!(
            inv.data,
            [-24, 18, 5, 20, -15, -4, -5, 4, 1]
                .iter()
                .map(|x| f.to_element(*x))
                .collect::<Vec<_>>()
        );
        assert_eq!(a.mul(&inv).unwrap(), DenseMatrix::identity(3, f).unwrap());
    }

    #[test]
    fn singular() {
        let a = DenseMatrix::from_linear(vec![1., 2., 2., 4.], 2, 2, FloatField).unwrap();
        assert_eq!(inverse(&a).unwrap_err(), LinalgError::SingularMatrix);

        let b = Vector::new(vec![1., 2.], FloatField).unwrap();
        assert_eq!(solve(&a, &b).unwrap_err(), LinalgError::SingularMatrix);

        let c = DenseMatrix::from_linear(vec![1., 2.], 1, 2, FloatField).unwrap();
        assert_eq!(inverse(&c).unwrap_err(), LinalgError::SingularMatrix);
        assert!(matches!(
            determinant(&c),
            Err(LinalgError::DimensionMismatch { op: "determinant", .. })
        ));
    }

    #[test]
    fn solve_float() {
        let a = DenseMatrix::from_linear(vec![2., 1., 1., 3.], 2, 2, FloatField).unwrap();
        let b = Vector::new(vec![3., 5.], FloatField).unwrap();
        let x = solve(&a, &b).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);

        let short = Vector::new(vec![1.], FloatField).unwrap();
        assert!(matches!(
            solve(&a, &short),
            Err(LinalgError::DimensionMismatch { op: "solve", .. })
        ));
    }
}

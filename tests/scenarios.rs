use std::sync::Arc;

use fieldlinalg::{
    compute::{ComputeContext, ComputeMode, HostParallelDevice},
    domains::{finite_field::FiniteField, float::FloatField, Ring},
    tensors::{Matrix, MatrixHint, SparseMatrixBuilder, Vector},
    LinalgError,
};
use rand::{rngs::StdRng, SeedableRng};

fn m(rows: Vec<Vec<f64>>) -> Matrix<FloatField> {
    Matrix::from_nested_vec(rows, FloatField).unwrap()
}

#[test]
fn add() {
    let ctx = ComputeContext::new(ComputeMode::Cpu);
    let a = m(vec![vec![1., 2.], vec![3., 4.]]);
    let b = m(vec![vec![5., 6.], vec![7., 8.]]);

    assert_eq!(
        a.add_with(&b, &ctx).unwrap(),
        m(vec![vec![6., 8.], vec![10., 12.]])
    );
}

#[test]
fn multiply() {
    let ctx = ComputeContext::new(ComputeMode::Cpu);
    let a = m(vec![vec![1., 2.], vec![3., 4.]]);
    let b = m(vec![vec![5., 6.], vec![7., 8.]]);

    assert_eq!(
        a.multiply_with(&b, &ctx).unwrap(),
        m(vec![vec![19., 22.], vec![43., 50.]])
    );
    assert_eq!(
        b.multiply_with(&a, &ctx).unwrap(),
        m(vec![vec![23., 34.], vec![31., 46.]])
    );
}

#[test]
fn determinant() {
    let ctx = ComputeContext::new(ComputeMode::Cpu);
    let a = m(vec![vec![1., 2.], vec![3., 4.]]);
    assert!((a.determinant_with(&ctx).unwrap() + 2.).abs() < 1e-12);
}

#[test]
fn sparse_diagonal_times_vector() {
    let ctx = ComputeContext::new(ComputeMode::Cpu);

    let mut b = SparseMatrixBuilder::new(3, 3, FloatField).unwrap();
    for i in 0..3 {
        b.set(i, i, 2.).unwrap();
    }
    let sparse = Matrix::Sparse(b.build());
    let dense = m(vec![vec![2., 0., 0.], vec![0., 2., 0.], vec![0., 0., 2.]]);
    let v = Vector::new(vec![1., 1., 1.], FloatField).unwrap();

    let r = sparse.multiply_vector_with(&v, &ctx).unwrap();
    assert_eq!(r.as_slice(), &[2., 2., 2.]);
    assert_eq!(r, dense.multiply_vector_with(&v, &ctx).unwrap());
    assert_eq!(sparse, dense);
}

#[test]
fn acceleration_policy() {
    let f = FiniteField::new(101).unwrap();
    let a = Matrix::from_linear((1..=4).map(|i| f.to_element(i)).collect(), 2, 2, f).unwrap();
    let b = Matrix::identity(2, f).unwrap();

    let ctx = ComputeContext::new(ComputeMode::Gpu)
        .with_device(Arc::new(HostParallelDevice::default()));
    assert!(matches!(
        a.add_with(&b, &ctx),
        Err(LinalgError::UnsupportedAcceleration { .. })
    ));
    assert!(matches!(
        a.determinant_with(&ctx),
        Err(LinalgError::UnsupportedAcceleration { .. })
    ));

    ctx.set_mode(ComputeMode::Auto);
    let sum = a.add_with(&b, &ctx).unwrap();
    assert_eq!(
        sum,
        Matrix::from_linear(
            vec![f.to_element(2), f.to_element(2), f.to_element(3), f.to_element(5)],
            2,
            2,
            f,
        )
        .unwrap()
    );
}

#[test]
fn singular_matrix() {
    let ctx = ComputeContext::new(ComputeMode::Cpu);
    let a = m(vec![vec![1., 2.], vec![2., 4.]]);

    assert_eq!(a.inverse_with(&ctx).unwrap_err(), LinalgError::SingularMatrix);
    assert_eq!(a.determinant_with(&ctx).unwrap(), 0.);
}

#[test]
fn construction_errors() {
    assert_eq!(
        Matrix::<FloatField>::from_nested_vec(vec![vec![]], FloatField).unwrap_err(),
        LinalgError::EmptyConstruction { rows: 1, cols: 0 }
    );
    assert_eq!(
        Matrix::zero(3, 0, FloatField).unwrap_err(),
        LinalgError::EmptyConstruction { rows: 3, cols: 0 }
    );
    assert!(matches!(
        Matrix::from_nested_vec(vec![vec![1., 2.], vec![3.]], FloatField),
        Err(LinalgError::DimensionMismatch { op: "from_nested_vec", .. })
    ));

    let a = m(vec![vec![1., 2.], vec![3., 4.]]);
    assert_eq!(
        a.get(2, 0).unwrap_err(),
        LinalgError::IndexOutOfBounds { index: 2, size: 2 }
    );
    assert_eq!(
        a.get_column(5).unwrap_err(),
        LinalgError::IndexOutOfBounds { index: 5, size: 2 }
    );
}

#[test]
fn copy_out_does_not_alias() {
    let ctx = ComputeContext::new(ComputeMode::Cpu);
    let a = m(vec![vec![1., 2., 3.], vec![4., 5., 6.]]);

    let row = a.get_row(1).unwrap();
    let doubled = row.scale_with(&2., &ctx).unwrap();
    assert_eq!(doubled.as_slice(), &[8., 10., 12.]);
    assert_eq!(a.get(1, 0).unwrap(), 4.);

    let block = a.sub_matrix(0..2, 1..3).unwrap();
    assert_eq!(block, m(vec![vec![2., 3.], vec![5., 6.]]));
    assert_eq!(a.to_sparse().sub_matrix(0..2, 1..3).unwrap(), block);
}

#[test]
fn hint_selects_storage() {
    let diag = vec![vec![1., 0., 0.], vec![0., 1., 0.], vec![0., 0., 1.]];
    assert!(!Matrix::with_hint(diag.clone(), FloatField, MatrixHint::Auto)
        .unwrap()
        .is_sparse());
    assert!(Matrix::with_hint(diag.clone(), FloatField, MatrixHint::Diagonal)
        .unwrap()
        .is_sparse());

    let mut large = vec![vec![0.; 10]; 10];
    large[3][4] = 1.;
    let auto = Matrix::with_hint(large, FloatField, MatrixHint::Auto).unwrap();
    assert!(auto.is_sparse());
    assert_eq!(auto.nnz(), 1);
}

#[test]
fn random_matrices_over_a_prime_field() {
    let ctx = ComputeContext::new(ComputeMode::Cpu);
    let f = FiniteField::new(65537).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    for n in 1..8 {
        let data = (0..n * n).map(|_| f.sample(&mut rng, (-100, 100))).collect();
        let a = Matrix::from_linear(data, n, n, f).unwrap();
        let s = a.to_sparse();

        let det = a.determinant_with(&ctx).unwrap();
        assert_eq!(det, s.determinant_with(&ctx).unwrap());
        assert_eq!(det, a.transpose().determinant_with(&ctx).unwrap());

        if !FiniteField::is_zero(&det) {
            let inv = s.inverse_with(&ctx).unwrap();
            assert_eq!(a.multiply_with(&inv, &ctx).unwrap(), a.one().unwrap());
        }
    }
}

#[test]
fn infinite_entries_agree_across_storage() {
    let inf = f64::INFINITY;
    let cpu = ComputeContext::new(ComputeMode::Cpu);
    let gpu =
        ComputeContext::new(ComputeMode::Gpu).with_device(Arc::new(HostParallelDevice::new(0, 0)));

    let id = Matrix::identity(2, FloatField).unwrap();
    let b = m(vec![vec![1., 2.], vec![inf, 3.]]);
    let v = Vector::new(vec![inf, 1.], FloatField).unwrap();

    for ctx in [&cpu, &gpu] {
        for i in [id.to_dense(), id.to_sparse()] {
            for b in [b.to_dense(), b.to_sparse()] {
                assert_eq!(i.multiply_with(&b, ctx).unwrap(), b);
                assert_eq!(b.multiply_with(&i, ctx).unwrap(), b);
            }

            let r = i.multiply_vector_with(&v, ctx).unwrap();
            assert_eq!(r.as_slice(), &[inf, 1.]);
        }

        assert_eq!(
            b.to_sparse().scale_with(&0., ctx).unwrap(),
            b.scale_with(&0., ctx).unwrap()
        );
    }
}

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

#[test]
fn test_mat_mul() {
    let a = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let b = Tensor::new(&[7., 8., 9., 10., 11., 12.], &[3, 2]);
    let result = a.mat_mul(&b).unwrap();
    assert_eq!(result, Tensor::new(&[58., 64., 139., 154.], &[2, 2]));
}

#[test]
fn test_mat_mul_with_transposed() {
    let a = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let result = a.mat_mul(&a.transpose().unwrap()).unwrap();
    assert_eq!(result, Tensor::new(&[14., 32., 32., 77.], &[2, 2]));
}

#[test]
fn test_mat_mul_shape_mismatch() {
    let a = Tensor::zeros(&[4, 3]);
    let b = Tensor::zeros(&[2, 3]);
    assert_eq!(
        a.mat_mul(&b),
        Err(TensorError::OperatorError {
            operator: Operator::MatMul,
            tensor1_shape: vec![4, 3],
            tensor2_shape: vec![2, 3],
        })
    );
}

#[test]
fn test_mat_mul_wrong_dimension() {
    let a = Tensor::zeros(&[3]);
    let b = Tensor::zeros(&[3, 2]);
    assert_eq!(
        a.mat_mul(&b),
        Err(TensorError::DimensionMismatch {
            operator: Operator::MatMul,
            expected: 2,
            got: 1,
        })
    );
}

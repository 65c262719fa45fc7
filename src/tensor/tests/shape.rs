use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

#[test]
fn test_transpose() {
    let a = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let t = a.transpose().unwrap();
    assert_eq!(t.shape(), &[3, 2]);
    assert_eq!(t.to_vec(), vec![1., 4., 2., 5., 3., 6.]);
    assert!(Tensor::zeros(&[2]).transpose().is_err());
}

#[test]
fn test_concat_and_narrow() {
    let a = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    let b = Tensor::new(&[5., 6.], &[2, 1]);
    let joined = Tensor::concat(&[&a, &b], 1).unwrap();
    assert_eq!(joined.shape(), &[2, 3]);
    assert_eq!(joined.to_vec(), vec![1., 2., 5., 3., 4., 6.]);

    assert_eq!(joined.narrow(1, 0, 2).unwrap(), a);
    assert_eq!(joined.narrow(1, 2, 1).unwrap(), b);
}

#[test]
fn test_concat_errors() {
    assert_eq!(Tensor::concat(&[], 0), Err(TensorError::EmptyList));

    let a = Tensor::zeros(&[2, 2]);
    let b = Tensor::zeros(&[3, 1]);
    assert_eq!(
        Tensor::concat(&[&a, &b], 1),
        Err(TensorError::OperatorError {
            operator: Operator::Concat,
            tensor1_shape: vec![2, 2],
            tensor2_shape: vec![3, 1],
        })
    );
    assert_eq!(
        Tensor::concat(&[&a], 2),
        Err(TensorError::AxisOutOfRange {
            axis: 2,
            dimension: 2,
        })
    );
}

#[test]
fn test_narrow_out_of_bounds() {
    let a = Tensor::zeros(&[2, 3]);
    assert_eq!(
        a.narrow(1, 2, 2),
        Err(TensorError::RangeOutOfBounds {
            axis: 1,
            start: 2,
            end: 4,
            len: 3,
        })
    );
}

#[test]
fn test_copy_from() {
    let mut a = Tensor::zeros(&[2, 2]);
    let b = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    a.copy_from(&b).unwrap();
    assert_eq!(a, b);

    // 不做广播：[2] 不能覆盖 [2, 2]
    let c = Tensor::new(&[1., 2.], &[2]);
    assert!(a.copy_from(&c).is_err());
    assert_eq!(a, b);
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Linear 层的前向、反向传播测试
 */

use super::gradient_check::check_input_gradient;
use crate::errors::TensorError;
use crate::nn::{Linear, Module, ModuleError};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn fixed_linear() -> Linear {
    let mut fc = Linear::new(3, 2).unwrap();
    fc.weight_mut()
        .value_mut()
        .copy_from(&Tensor::new(&[1., 0., -1., 0.5, 0.5, 0.5], &[2, 3]))
        .unwrap();
    fc.bias_mut()
        .unwrap()
        .value_mut()
        .copy_from(&Tensor::new(&[0.1, -0.1], &[2]))
        .unwrap();
    fc
}

#[test]
fn test_linear_shapes() {
    let mut fc = Linear::new(3, 2).unwrap();
    assert_eq!(fc.weight().shape(), &[2, 3]);
    assert_eq!(fc.bias().unwrap().shape(), &[2]);
    assert_eq!((fc.in_features(), fc.out_features()), (3, 2));

    let y = fc.forward(&Tensor::zeros(&[4, 3])).unwrap();
    assert_eq!(y.shape(), &[4, 2]);
}

#[test]
fn test_linear_init_range() {
    let fc = Linear::new_seeded(4, 8, 0).unwrap();
    // U(-1/√4, 1/√4)
    for param in fc.parameters() {
        assert!(param.value().to_vec().iter().all(|v| v.abs() <= 0.5));
    }
    // 同一种子结果相同
    let again = Linear::new_seeded(4, 8, 0).unwrap();
    assert_eq!(fc.state_dict(), again.state_dict());
}

#[test]
fn test_linear_forward() {
    let mut fc = fixed_linear();
    let x = Tensor::new(
        &[1., 2., 3., 0., 0., 0., 1., 1., 1., 2., 0., 1.],
        &[4, 3],
    );
    let y = fc.forward(&x).unwrap();
    let expected = Tensor::new(&[-1.9, 2.9, 0.1, -0.1, 0.1, 1.4, 1.1, 1.4], &[4, 2]);
    assert_abs_diff_eq!(y, expected, epsilon = 1e-6);
}

#[test]
fn test_linear_backward() {
    let mut fc = fixed_linear();
    let x = Tensor::new(&[1., 2., 3., 2., 0., 1.], &[2, 3]);
    fc.forward(&x).unwrap();
    let grad_output = Tensor::new(&[1., 0., 1., 2.], &[2, 2]);
    let grad_input = fc.backward(&grad_output).unwrap();

    // dW = gᵀ @ x
    let expected_dw = Tensor::new(&[3., 2., 4., 4., 0., 2.], &[2, 3]);
    assert_abs_diff_eq!(fc.weight().grad().unwrap(), &expected_dw, epsilon = 1e-6);
    // db = Σ_batch g
    let expected_db = Tensor::new(&[2., 2.], &[2]);
    assert_abs_diff_eq!(fc.bias().unwrap().grad().unwrap(), &expected_db, epsilon = 1e-6);
    // dx = g @ W
    let expected_dx = Tensor::new(&[1., 0., -1., 2., 1., 0.], &[2, 3]);
    assert_abs_diff_eq!(grad_input, expected_dx, epsilon = 1e-6);
}

#[test]
fn test_linear_numeric_gradient() {
    let mut fc = Linear::new_seeded(3, 4, 5).unwrap();
    let x = Tensor::normal_seeded(0., 1., &[5, 3], 11);
    check_input_gradient(&mut fc, &x, 1e-2);
}

#[test]
fn test_linear_without_bias() {
    let mut fc = Linear::without_bias(2, 3).unwrap();
    assert!(fc.bias().is_none());
    assert_eq!(fc.num_params(), 1);

    let y = fc.forward(&Tensor::zeros(&[1, 2])).unwrap();
    assert_eq!(y, Tensor::zeros(&[1, 3]));
    assert_eq!(fc.extra_repr(), "in_features=2, out_features=3, bias=false");
}

#[test]
fn test_linear_input_shape_mismatch() {
    let mut fc = Linear::new(3, 2).unwrap();
    let err = fc.forward(&Tensor::zeros(&[4, 5])).unwrap_err();
    assert!(matches!(err, ModuleError::Tensor(TensorError::OperatorError { .. })));
}

#[test]
fn test_linear_invalid_config() {
    assert!(matches!(Linear::new(0, 2), Err(ModuleError::InvalidConfig(_))));
    assert!(matches!(Linear::new(2, 0), Err(ModuleError::InvalidConfig(_))));
}

#[test]
fn test_linear_backward_without_forward() {
    let mut fc = Linear::new(3, 2).unwrap();
    let err = fc.backward(&Tensor::zeros(&[1, 2])).unwrap_err();
    assert!(matches!(err, ModuleError::MissingForwardCache(ref name) if name == "Linear"));
}

#[test]
fn test_linear_repeated_backward() {
    let mut fc = fixed_linear();
    let x = Tensor::new(&[1., 2., 3.], &[1, 3]);
    let grad_output = Tensor::new(&[1., 1.], &[1, 2]);
    fc.forward(&x).unwrap();
    fc.backward(&grad_output).unwrap();
    let once = fc.weight().grad().unwrap().clone();

    // 一次前向传播只对应一次反向传播，梯度不会被重复累加
    let err = fc.backward(&grad_output).unwrap_err();
    assert!(matches!(err, ModuleError::MissingForwardCache(_)));
    assert_eq!(fc.weight().grad().unwrap(), &once);
}

#[test]
fn test_linear_backward_is_lifo() {
    let mut fc = fixed_linear();
    let x1 = Tensor::new(&[1., 0., 0.], &[1, 3]);
    let x2 = Tensor::new(&[0., 0., 2.], &[1, 3]);
    fc.forward(&x1).unwrap();
    fc.forward(&x2).unwrap();

    // 第一次反向传播对应最后一次前向传播（输入 x2）
    let grad_output = Tensor::new(&[1., 0.], &[1, 2]);
    fc.backward(&grad_output).unwrap();
    let expected = Tensor::new(&[0., 0., 2., 0., 0., 0.], &[2, 3]);
    assert_abs_diff_eq!(fc.weight().grad().unwrap(), &expected, epsilon = 1e-6);

    fc.backward(&grad_output).unwrap();
    let expected = Tensor::new(&[1., 0., 2., 0., 0., 0.], &[2, 3]);
    assert_abs_diff_eq!(fc.weight().grad().unwrap(), &expected, epsilon = 1e-6);
}

#[test]
fn test_linear_backward_grad_shape_mismatch() {
    let mut fc = fixed_linear();
    fc.forward(&Tensor::zeros(&[4, 3])).unwrap();

    // 可广播但形状不同的梯度同样被拒绝
    for wrong in [vec![2], vec![1, 2], vec![4, 3], vec![]] {
        let err = fc.backward(&Tensor::zeros(&wrong)).unwrap_err();
        assert!(
            matches!(err, ModuleError::ShapeMismatch { ref expected, .. } if expected == &[4, 2]),
            "梯度形状{wrong:?}"
        );
    }
    // 出错时缓存保持不变
    assert!(fc.backward(&Tensor::zeros(&[4, 2])).is_ok());
}

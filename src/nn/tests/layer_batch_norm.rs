/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : BatchNorm1d 层测试（含缓冲区）
 */

use super::gradient_check::check_input_gradient;
use crate::nn::{BatchNorm1d, Module, ModuleError};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn batch() -> Tensor {
    Tensor::new(&[1., 2., 3., 6., 5., 10.], &[3, 2])
}

#[test]
fn test_batch_norm_registration() {
    let bn = BatchNorm1d::new(2).unwrap();
    let params: Vec<_> = bn.named_parameters().into_iter().map(|(n, _)| n).collect();
    assert_eq!(params, ["weight", "bias"]);
    let keys: Vec<_> = bn.state_dict().keys().map(str::to_string).collect();
    assert_eq!(
        keys,
        ["weight", "bias", "running_mean", "running_var", "num_batches_tracked"]
    );
    assert_eq!(bn.extra_repr(), "2, eps=0.00001, momentum=0.1");
}

#[test]
fn test_batch_norm_training_forward() {
    let mut bn = BatchNorm1d::new(2).unwrap();
    let y = bn.forward(&batch()).unwrap();

    assert_abs_diff_eq!(y.mean_axis_0(), Tensor::zeros(&[2]), epsilon = 1e-5);
    let var = y.map(|v| v * v).mean_axis_0();
    assert_abs_diff_eq!(var, Tensor::ones(&[2]), epsilon = 1e-3);
}

#[test]
fn test_batch_norm_running_statistics() {
    let mut bn = BatchNorm1d::new(2).unwrap();
    bn.forward(&batch()).unwrap();

    // 0.9 * 初值 + 0.1 * batch 统计量（方差为无偏估计：[4, 16]）
    assert_abs_diff_eq!(bn.running_mean(), &Tensor::new(&[0.3, 0.6], &[2]), epsilon = 1e-6);
    assert_abs_diff_eq!(bn.running_var(), &Tensor::new(&[1.3, 2.5], &[2]), epsilon = 1e-5);
    assert_eq!(bn.num_batches_tracked(), 1);

    bn.forward(&batch()).unwrap();
    assert_eq!(bn.num_batches_tracked(), 2);
}

#[test]
fn test_batch_norm_eval_uses_running_statistics() {
    let mut bn = BatchNorm1d::new(2).unwrap();
    bn.forward(&batch()).unwrap();
    bn.eval();

    // 评估模式下单个样本也可以
    let y = bn.forward(&Tensor::new(&[0.3, 0.6], &[1, 2])).unwrap();
    assert_abs_diff_eq!(y, Tensor::zeros(&[1, 2]), epsilon = 1e-6);
    // 评估模式不更新滑动统计量
    assert_eq!(bn.num_batches_tracked(), 1);

    let y = bn.forward(&Tensor::new(&[1.3, 0.6], &[1, 2])).unwrap();
    assert_abs_diff_eq!(y[[0, 0]], 1. / 1.3_f32.sqrt(), epsilon = 1e-4);
}

#[test]
fn test_batch_norm_affine_parameters() {
    let mut bn = BatchNorm1d::new(2).unwrap();
    bn.eval();
    for (name, param) in bn.named_parameters_mut() {
        let value = if name == "weight" { 2. } else { 1. };
        param.value_mut().copy_from(&Tensor::full(value, &[2])).unwrap();
    }
    // 初始滑动统计量为(0, 1)，输出约为 2x + 1
    let y = bn.forward(&Tensor::new(&[1., -1.], &[1, 2])).unwrap();
    assert_abs_diff_eq!(y, Tensor::new(&[3., -1.], &[1, 2]), epsilon = 1e-4);
}

#[test]
fn test_batch_norm_gradient() {
    let x = Tensor::normal_seeded(0., 2., &[4, 3], 3);

    let mut bn = BatchNorm1d::new(3).unwrap();
    check_input_gradient(&mut bn, &x, 2e-2);
    let grads: Vec<_> = bn
        .parameters()
        .iter()
        .map(|p| p.grad().unwrap().shape().to_vec())
        .collect();
    assert_eq!(grads, [vec![3], vec![3]]);

    bn.eval();
    check_input_gradient(&mut bn, &x, 2e-2);
}

#[test]
fn test_batch_norm_input_errors() {
    let mut bn = BatchNorm1d::new(2).unwrap();
    assert!(matches!(
        bn.forward(&Tensor::zeros(&[4, 3])),
        Err(ModuleError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        bn.forward(&Tensor::zeros(&[1, 2])),
        Err(ModuleError::InvalidConfig(_))
    ));
    assert!(matches!(BatchNorm1d::new(0), Err(ModuleError::InvalidConfig(_))));
    assert!(matches!(
        BatchNorm1d::with_options(2, 1e-5, 1.5),
        Err(ModuleError::InvalidConfig(_))
    ));
}

#[test]
fn test_batch_norm_backward_grad_shape() {
    let mut bn = BatchNorm1d::new(2).unwrap();
    bn.forward(&batch()).unwrap();

    // 0 阶梯度不会进入 sum_axis，而是直接报错
    assert!(matches!(
        bn.backward(&Tensor::new(&[1.], &[])),
        Err(ModuleError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        bn.backward(&Tensor::ones(&[2])),
        Err(ModuleError::ShapeMismatch { .. })
    ));
    assert!(bn.backward(&Tensor::ones(&[3, 2])).is_ok());
    // 缓存已被消耗
    assert!(matches!(
        bn.backward(&Tensor::ones(&[3, 2])),
        Err(ModuleError::MissingForwardCache(_))
    ));
    let grads: Vec<_> = bn.parameters().iter().map(|p| p.grad().unwrap().clone()).collect();
    // dβ = Σ_batch g
    assert_eq!(grads[1], Tensor::full(3., &[2]));
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 简单回归任务集成测试
 *
 * 单个 Linear(3, 2) 模块，4 个固定输入，目标恒为[1, 1]：
 * 梯度下降 10000 步后偏置应收敛到[1, 1]，权重收敛到 0 附近。
 */

use approx::assert_abs_diff_eq;
use only_module::nn::optimizer::{Optimizer, SGD};
use only_module::nn::{Linear, Module, MseLoss};
use only_module::tensor::Tensor;

#[test]
fn test_simple_linear_regression() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut model = Linear::new_seeded(3, 2, 42).unwrap();
    assert_eq!(model.weight().shape(), &[2, 3]);
    assert_eq!(model.bias().unwrap().shape(), &[2]);

    let x = Tensor::new(
        &[1., 0., 0., 0., 1., 0., 0., 0., 1., 1., 1., 1.],
        &[4, 3],
    );
    let y = Tensor::ones(&[4, 2]);
    assert_eq!(model.forward(&x).unwrap().shape(), &[4, 2]);

    let mut criterion = MseLoss::new();
    let mut optimizer = SGD::new(0.01).unwrap();
    let mut first_loss = None;
    let mut last_loss = 0.;
    for _ in 0..10000 {
        optimizer.zero_grad(&mut model);
        let pred = model.forward(&x).unwrap();
        let loss = criterion.forward(&pred, &y).unwrap().number().unwrap();
        model.backward(&criterion.backward().unwrap()).unwrap();
        optimizer.step(&mut model).unwrap();

        first_loss.get_or_insert(loss);
        last_loss = loss;
    }

    println!("训练前损失: {:?}，训练后损失: {last_loss}", first_loss);
    assert!(last_loss < 1e-6);

    let bias = model.bias().unwrap().value();
    assert_abs_diff_eq!(bias, &Tensor::ones(&[2]), epsilon = 1e-3);
    for w in model.weight().value().to_vec() {
        assert!(w.abs() < 1e-2, "权重{w}没有收敛到0附近");
    }
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 训练/评估模式在模块树中的广播
 */

use crate::nn::{BatchNorm1d, Dropout, Linear, Module, ReLU, Residual, Sequential};
use crate::tensor::Tensor;

fn deep_model() -> Sequential {
    let block = Sequential::new()
        .add(Linear::new(4, 4).unwrap())
        .unwrap()
        .add(Dropout::new_seeded(0.5, 1).unwrap())
        .unwrap();
    Sequential::new()
        .add(Linear::new(4, 4).unwrap())
        .unwrap()
        .add(BatchNorm1d::new(4).unwrap())
        .unwrap()
        .add(ReLU::new())
        .unwrap()
        .add(Residual::new(block).unwrap())
        .unwrap()
}

/// 收集整棵树（含根）的模式
fn all_modes(module: &dyn Module, out: &mut Vec<bool>) {
    out.push(module.is_training());
    for (_, child) in module.named_children() {
        all_modes(child, out);
    }
}

#[test]
fn test_new_module_is_training() {
    let model = deep_model();
    let mut modes = Vec::new();
    all_modes(&model, &mut modes);
    // 根 + 4 个子模块 + Residual 内的 Sequential 及其 2 个子模块
    assert_eq!(modes.len(), 8);
    assert!(modes.iter().all(|&m| m));
}

#[test]
fn test_eval_and_train_propagate() {
    let mut model = deep_model();

    model.eval();
    let mut modes = Vec::new();
    all_modes(&model, &mut modes);
    assert!(modes.iter().all(|&m| !m));

    model.train();
    modes.clear();
    all_modes(&model, &mut modes);
    assert!(modes.iter().all(|&m| m));
}

#[test]
fn test_mode_set_on_subtree_only() {
    let mut model = deep_model();
    model.get_mut(3).unwrap().eval();

    assert!(model.is_training());
    assert!(model.get(0).unwrap().is_training());
    let mut modes = Vec::new();
    all_modes(model.get(3).unwrap(), &mut modes);
    assert_eq!(modes.len(), 4);
    assert!(modes.iter().all(|&m| !m));
}

#[test]
fn test_eval_mode_is_deterministic() {
    let mut model = deep_model();
    let x = Tensor::normal_seeded(0., 1., &[8, 4], 3);

    // 先训练模式走一遍，使 BatchNorm 有滑动统计量
    model.forward(&x).unwrap();
    model.eval();
    let first = model.forward(&x).unwrap();
    let second = model.forward(&x).unwrap();
    assert_eq!(first, second);
}

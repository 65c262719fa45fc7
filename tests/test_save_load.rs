/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 训练后保存、在新构建的同结构模型上加载的集成测试
 */

use only_module::config::TrainConfig;
use only_module::nn::optimizer::Adam;
use only_module::nn::{
    BatchNorm1d, Linear, Module, ModuleError, ReLU, Sequential, StateDict, Trainer, load_model,
    save_model,
};
use only_module::tensor::Tensor;
use std::fs;

fn build(seed: u64) -> Sequential {
    Sequential::new()
        .add_named("fc1", Linear::new_seeded(4, 8, seed).unwrap())
        .unwrap()
        .add_named("bn", BatchNorm1d::new(8).unwrap())
        .unwrap()
        .add_named("act", ReLU::new())
        .unwrap()
        .add_named("fc2", Linear::new_seeded(8, 2, seed + 1).unwrap())
        .unwrap()
}

fn trained() -> (Sequential, Tensor) {
    let x = Tensor::normal_seeded(0., 1., &[32, 4], 1);
    let y = Tensor::normal_seeded(0., 1., &[32, 2], 2);
    let mut model = build(10);
    let config = TrainConfig {
        epochs: 20,
        learning_rate: 0.01,
        log_every: 10,
        seed: Some(10),
    };
    let mut trainer = Trainer::new(config, Adam::new(0.01).unwrap()).unwrap();
    trainer.fit(&mut model, &x, &y).unwrap();
    model.eval();
    (model, x)
}

#[test]
fn test_state_dict_file_round_trip() {
    let temp_file = "test_state_dict_file_round_trip.bin";
    let (mut model, x) = trained();
    model.state_dict().save(temp_file).unwrap();

    let mut restored = build(99);
    restored.load_state_dict(&StateDict::load(temp_file).unwrap()).unwrap();
    restored.eval();

    assert_eq!(restored.state_dict(), model.state_dict());
    assert_eq!(restored.forward(&x).unwrap(), model.forward(&x).unwrap());
    fs::remove_file(temp_file).ok();
}

#[test]
fn test_save_model_round_trip() {
    let path = "test_save_model_round_trip";
    let (mut model, x) = trained();
    save_model(&model, path).unwrap();

    let mut restored = build(99);
    load_model(&mut restored, path).unwrap();
    restored.eval();
    assert_eq!(restored.forward(&x).unwrap(), model.forward(&x).unwrap());

    fs::remove_file(format!("{path}.json")).ok();
    fs::remove_file(format!("{path}.bin")).ok();
}

#[test]
fn test_load_into_mismatched_model() {
    let (model, _) = trained();
    let state = model.state_dict();

    // 多一层：缺失键
    let mut bigger = build(0);
    bigger.push_named("fc3", Linear::new(2, 2).unwrap()).unwrap();
    match bigger.load_state_dict(&state) {
        Err(ModuleError::KeyMismatch { missing, unexpected }) => {
            assert_eq!(missing, ["fc3.weight", "fc3.bias"]);
            assert!(unexpected.is_empty());
        }
        other => panic!("应当报键不匹配，实际为{other:?}"),
    }

    // 同名但形状不同
    let mut wider = Sequential::new()
        .add_named("fc1", Linear::new(4, 16).unwrap())
        .unwrap()
        .add_named("bn", BatchNorm1d::new(16).unwrap())
        .unwrap()
        .add_named("act", ReLU::new())
        .unwrap()
        .add_named("fc2", Linear::new(16, 2).unwrap())
        .unwrap();
    let before = wider.state_dict();
    assert!(matches!(
        wider.load_state_dict(&state),
        Err(ModuleError::ShapeMismatch { .. })
    ));
    assert_eq!(wider.state_dict(), before);
}

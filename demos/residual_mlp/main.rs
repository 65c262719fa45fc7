//! # 残差 MLP 示例
//!
//! 展示自定义模块、训练/评估模式、`Trainer`与完整模型的保存/加载：
//! - 拟合 y = sin(πx₀)·x₁
//! - 可选地从 JSON 文件读取训练配置
//!
//! ## 运行
//! ```bash
//! cargo run --example residual_mlp
//! cargo run --example residual_mlp -- config.json
//! ```

mod model;

use model::ResidualMlp;
use only_module::config::TrainConfig;
use only_module::nn::optimizer::Adam;
use only_module::nn::{Module, ModuleError, Trainer, describe, load_model, save_model};
use only_module::tensor::Tensor;
use std::f32::consts::PI;
use std::time::Instant;

fn main() -> Result<(), ModuleError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    println!("=== 残差 MLP（自定义 Module）===\n");
    let start_time = Instant::now();

    // ========== 1. 配置 ==========
    let config = match std::env::args().nth(1) {
        Some(path) => TrainConfig::from_file(path)?,
        None => TrainConfig {
            epochs: 300,
            learning_rate: 0.01,
            log_every: 50,
            seed: Some(42),
        },
    };
    println!("[1/5] 训练配置: {config:?}");
    let seed = config.seed.unwrap_or(0);

    // ========== 2. 数据 ==========
    let (train_x, train_y) = dataset(128, seed);
    let (test_x, test_y) = dataset(64, seed + 1);
    println!("\n[2/5] 训练集 {} 样本，测试集 {} 样本", train_x.shape()[0], test_x.shape()[0]);

    // ========== 3. 模型 ==========
    let mut model = ResidualMlp::new(2, 32, 2, seed)?;
    println!("\n[3/5] 模型结构:\n{}", model.repr());
    println!("  参数: {} 个张量，{} 个元素", model.num_params(), model.num_param_elements());

    // ========== 4. 训练 ==========
    let mut trainer = Trainer::new(config, Adam::new(0.01)?)?;
    let before = trainer.evaluate(&mut model, &test_x, &test_y)?;
    let history = trainer.fit(&mut model, &train_x, &train_y)?;
    let after = trainer.evaluate(&mut model, &test_x, &test_y)?;
    println!(
        "\n[4/5] 训练损失 {:.6} -> {:.6}，测试损失 {before:.6} -> {after:.6}",
        history.losses.first().copied().unwrap_or(f32::NAN),
        history.final_loss().unwrap_or(f32::NAN)
    );

    // ========== 5. 保存 / 加载 ==========
    let path = std::env::temp_dir().join("only_module_residual_mlp");
    save_model(&model, &path)?;
    println!("\n[5/5] 模型描述:\n{}", describe(&model).to_json()?);

    let mut restored = ResidualMlp::new(2, 32, 2, seed + 1000)?;
    load_model(&mut restored, &path)?;
    let reloaded = trainer.evaluate(&mut restored, &test_x, &test_y)?;
    println!("  加载后的测试损失: {reloaded:.6}（原模型 {after:.6}）");
    std::fs::remove_file(path.with_extension("json"))?;
    std::fs::remove_file(path.with_extension("bin"))?;

    println!("\n总耗时: {:.2?}", start_time.elapsed());
    Ok(())
}

fn dataset(n: usize, seed: u64) -> (Tensor, Tensor) {
    let x = Tensor::uniform_seeded(-1., 1., &[n, 2], seed);
    let y: Vec<f32> = (0..n)
        .map(|i| (PI * x[[i, 0]]).sin() * x[[i, 1]])
        .collect();
    (x, Tensor::new(&y, &[n, 1]))
}

//! # 线性回归示例（模块体系入门）
//!
//! 依次展示：
//! - 构建`Linear`模块并查看其参数（全限定名、形状）
//! - 前向传播、`MseLoss`、反向传播与`SGD`更新组成的训练循环
//! - 用`no_grad`直接改写参数
//! - 状态字典的保存与加载
//!
//! ## 运行
//! ```bash
//! cargo run --example linear_regression
//! ```

use only_module::nn::optimizer::{Optimizer, SGD};
use only_module::nn::{Linear, Module, ModuleError, MseLoss, NoGradGuard, StateDict};
use only_module::tensor::Tensor;

fn main() -> Result<(), ModuleError> {
    env_logger::init();
    println!("=== 线性回归（PyTorch 风格的 Module）===\n");

    // ========== 1. 构建模型 ==========
    let mut model = Linear::new_seeded(3, 2, 42)?;
    println!("[1/5] 模型: {}", model.repr());
    for (name, param) in model.named_parameters() {
        println!("  {name}: {:?}\n{}", param.shape(), param.value());
    }

    // ========== 2. 前向传播 ==========
    let x = Tensor::new(
        &[1., 0., 0., 0., 1., 0., 0., 0., 1., 1., 1., 1.],
        &[4, 3],
    );
    let y = Tensor::ones(&[4, 2]);
    let pred = model.forward(&x)?;
    println!("\n[2/5] 输入形状 {:?} -> 输出形状 {:?}", x.shape(), pred.shape());

    // ========== 3. 训练 ==========
    let epochs = 10000;
    let mut criterion = MseLoss::new();
    let mut optimizer = SGD::new(0.01)?;
    println!("\n[3/5] 训练 {epochs} 步，学习率 {}", optimizer.learning_rate());
    for epoch in 1..=epochs {
        optimizer.zero_grad(&mut model);
        let pred = model.forward(&x)?;
        let loss = criterion.forward(&pred, &y)?;
        model.backward(&criterion.backward()?)?;
        optimizer.step(&mut model)?;

        if epoch % 2000 == 0 {
            println!("  Epoch {epoch:>5}: loss = {:.8}", loss.number().unwrap_or(f32::NAN));
        }
    }
    println!("  weight:\n{}", model.weight().value());
    println!("  bias: {}", model.bias().map_or_else(String::new, |b| b.value().to_string()));

    // ========== 4. 直接改写参数 ==========
    let snapshot = model.state_dict();
    {
        let _guard = NoGradGuard::new();
        model.weight_mut().value_mut().copy_from(&Tensor::zeros(&[2, 3]))?;
    }
    println!("\n[4/5] 手动清零权重后的输出:\n{}", model.forward(&x)?);

    // ========== 5. 保存 / 加载 ==========
    let path = std::env::temp_dir().join("only_module_linear_regression.bin");
    snapshot.save(&path)?;
    let mut restored = Linear::new(3, 2)?;
    restored.load_state_dict(&StateDict::load(&path)?)?;
    println!(
        "\n[5/5] 从 {} 加载的模型输出:\n{}",
        path.display(),
        restored.forward(&x)?
    );
    std::fs::remove_file(&path)?;

    Ok(())
}

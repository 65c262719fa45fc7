/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 全批量训练循环
 *
 * 每轮：zero_grad -> forward -> loss -> backward -> step。
 * 适用于能一次放进内存的回归数据；更复杂的流程直接手写循环即可，
 * 所用的 API 与此处完全相同。
 */

use super::optimizer::Optimizer;
use super::{Module, ModuleError, MseLoss, no_grad};
use crate::config::TrainConfig;
use crate::tensor::Tensor;

/// 训练过程中每轮的损失
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainHistory {
    pub losses: Vec<f32>,
}

impl TrainHistory {
    pub fn final_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }

    /// 最小损失
    pub fn best_loss(&self) -> Option<f32> {
        self.losses.iter().copied().reduce(f32::min)
    }
}

pub struct Trainer<O: Optimizer> {
    config: TrainConfig,
    optimizer: O,
    criterion: MseLoss,
}

impl<O: Optimizer> Trainer<O> {
    /// 优化器的学习率会被设为`config.learning_rate`
    pub fn new(config: TrainConfig, mut optimizer: O) -> Result<Self, ModuleError> {
        config.validate()?;
        optimizer.set_learning_rate(config.learning_rate);
        Ok(Self {
            config,
            optimizer,
            criterion: MseLoss::new(),
        })
    }

    pub fn with_criterion(mut self, criterion: MseLoss) -> Self {
        self.criterion = criterion;
        self
    }

    pub const fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub const fn optimizer(&self) -> &O {
        &self.optimizer
    }

    pub const fn optimizer_mut(&mut self) -> &mut O {
        &mut self.optimizer
    }

    /// 执行一步训练，返回本步（更新前）的损失
    pub fn train_step(
        &mut self,
        model: &mut dyn Module,
        inputs: &Tensor,
        targets: &Tensor,
    ) -> Result<f32, ModuleError> {
        model.clear_forward_cache();
        self.optimizer.zero_grad(model);
        let pred = model.forward(inputs)?;
        let loss = self.criterion.forward(&pred, targets)?;
        model.backward(&self.criterion.backward()?)?;
        self.optimizer.step(model)?;
        Ok(loss_value(&loss))
    }

    /// 在训练模式下训练`config.epochs`轮
    pub fn fit(
        &mut self,
        model: &mut dyn Module,
        inputs: &Tensor,
        targets: &Tensor,
    ) -> Result<TrainHistory, ModuleError> {
        let epochs = self.config.epochs;
        log::info!(
            "开始训练{}：{}轮，学习率{}，共{}个参数元素",
            model.name(),
            epochs,
            self.optimizer.learning_rate(),
            model.num_param_elements()
        );

        model.train();
        let mut history = TrainHistory::default();
        for epoch in 1..=epochs {
            let loss = self.train_step(model, inputs, targets)?;
            history.losses.push(loss);
            if !loss.is_finite() {
                log::warn!("第{epoch}轮的损失为{loss}，训练可能已发散");
            }
            if epoch % self.config.log_every == 0 || epoch == epochs {
                log::info!("Epoch {epoch}/{epochs}: loss = {loss:.6}");
            }
        }
        Ok(history)
    }

    /// 在评估模式、且关闭梯度追踪的情况下计算损失；结束后恢复模型原来的模式
    pub fn evaluate(
        &mut self,
        model: &mut dyn Module,
        inputs: &Tensor,
        targets: &Tensor,
    ) -> Result<f32, ModuleError> {
        let was_training = model.is_training();
        model.eval();
        let criterion = &mut self.criterion;
        let result = no_grad(|| {
            let pred = model.forward(inputs)?;
            criterion.forward(&pred, targets)
        });
        model.set_training(was_training);
        Ok(loss_value(&result?))
    }
}

fn loss_value(loss: &Tensor) -> f32 {
    loss.number().unwrap_or(f32::NAN)
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 优化器基础trait和辅助结构
 */

use crate::nn::{Module, ModuleError};

/// 优化器核心 trait
///
/// 优化器不持有参数：每次`step`时从传入的模块树中按全限定名取出参数，
/// 动量等逐参数状态也以全限定名为键保存。
pub trait Optimizer {
    /// 参数更新（使用已累积的梯度）
    ///
    /// `PyTorch` 风格训练循环：
    /// ```ignore
    /// optimizer.zero_grad(&mut model);
    /// let pred = model.forward(&x)?;
    /// let loss = criterion.forward(&pred, &y)?;
    /// model.backward(&criterion.backward()?)?;
    /// optimizer.step(&mut model)?; // ← 只更新参数，不做 forward/backward
    /// ```
    ///
    /// 实现须在`NoGradGuard`内改写参数；没有梯度或被冻结的参数跳过。
    fn step(&mut self, module: &mut dyn Module) -> Result<(), ModuleError>;

    /// 清空模块树中所有参数的梯度
    fn zero_grad(&self, module: &mut dyn Module) {
        module.zero_grad();
    }

    /// 重置逐参数状态（动量、矩估计等）
    fn reset(&mut self);

    fn learning_rate(&self) -> f32;

    fn set_learning_rate(&mut self, lr: f32);
}

/// 优化器状态管理（内部实现，不对外暴露）
pub(crate) struct OptimizerState {
    learning_rate: f32,
}

impl OptimizerState {
    pub(crate) fn new(learning_rate: f32) -> Result<Self, ModuleError> {
        if !learning_rate.is_finite() || learning_rate <= 0. {
            return Err(ModuleError::InvalidConfig(format!(
                "学习率须为正的有限数，实际为{learning_rate}"
            )));
        }
        Ok(Self { learning_rate })
    }

    pub(crate) const fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub(crate) const fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}

/// 检查取值在[0, 1)内的超参数
pub(crate) fn check_unit_interval(name: &str, value: f32) -> Result<(), ModuleError> {
    if !(0.0..1.0).contains(&value) {
        return Err(ModuleError::InvalidConfig(format!(
            "{name}须在[0, 1)之间，实际为{value}"
        )));
    }
    Ok(())
}

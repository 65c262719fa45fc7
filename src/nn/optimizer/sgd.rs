/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 梯度下降优化器实现
 */

use super::base::{Optimizer, OptimizerState, check_unit_interval};
use crate::nn::{Module, ModuleError, NoGradGuard};
use crate::tensor::Tensor;
use std::collections::HashMap;

/// SGD (随机梯度下降) 优化器，可选动量
///
/// - 无动量：θ = θ - α * ∇θ
/// - 有动量：b = μ * b + ∇θ（首步 b = ∇θ），θ = θ - α * b
pub struct SGD {
    state: OptimizerState,
    momentum: f32,
    /// 以参数全限定名为键的速度
    velocity: HashMap<String, Tensor>,
}

impl SGD {
    pub fn new(learning_rate: f32) -> Result<Self, ModuleError> {
        Self::with_momentum(learning_rate, 0.)
    }

    pub fn with_momentum(learning_rate: f32, momentum: f32) -> Result<Self, ModuleError> {
        let state = OptimizerState::new(learning_rate)?;
        check_unit_interval("momentum", momentum)?;
        Ok(Self {
            state,
            momentum,
            velocity: HashMap::new(),
        })
    }

    pub const fn momentum(&self) -> f32 {
        self.momentum
    }
}

impl Optimizer for SGD {
    fn step(&mut self, module: &mut dyn Module) -> Result<(), ModuleError> {
        let _guard = NoGradGuard::new();
        let lr = self.state.learning_rate();

        for (name, param) in module.named_parameters_mut() {
            if !param.requires_grad() {
                continue;
            }
            let Some(grad) = param.grad() else {
                continue;
            };

            let direction = if self.momentum > 0. {
                let buffer = match self.velocity.remove(&name) {
                    Some(previous) if previous.is_same_shape(grad) => {
                        (previous * self.momentum).try_add(grad)?
                    }
                    _ => grad.clone(),
                };
                self.velocity.insert(name, buffer.clone());
                buffer
            } else {
                grad.clone()
            };

            let new_value = param.value().try_sub(&(direction * lr))?;
            param.value_mut().copy_from(&new_value)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.velocity.clear();
    }

    fn learning_rate(&self) -> f32 {
        self.state.learning_rate()
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.state.set_learning_rate(lr);
    }
}

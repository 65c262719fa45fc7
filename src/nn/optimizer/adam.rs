/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : Adam优化器实现
 */

use super::base::{Optimizer, OptimizerState, check_unit_interval};
use crate::nn::{Module, ModuleError, NoGradGuard};
use crate::tensor::Tensor;
use std::collections::HashMap;

/// Adam优化器
pub struct Adam {
    state: OptimizerState,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// 一阶矩估计，以参数全限定名为键
    m: HashMap<String, Tensor>,
    /// 二阶矩估计
    v: HashMap<String, Tensor>,
    /// 时间步
    t: usize,
}

impl Adam {
    /// 使用默认参数(β1=0.9, β2=0.999, ε=1e-8)创建Adam优化器
    pub fn new(learning_rate: f32) -> Result<Self, ModuleError> {
        Self::with_options(learning_rate, 0.9, 0.999, 1e-8)
    }

    pub fn with_options(
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Result<Self, ModuleError> {
        let state = OptimizerState::new(learning_rate)?;
        check_unit_interval("beta1", beta1)?;
        check_unit_interval("beta2", beta2)?;
        if epsilon <= 0. {
            return Err(ModuleError::InvalidConfig(format!(
                "epsilon须大于0，实际为{epsilon}"
            )));
        }
        Ok(Self {
            state,
            beta1,
            beta2,
            epsilon,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        })
    }

    /// 已执行的步数
    pub const fn steps(&self) -> usize {
        self.t
    }

    /// Adam 参数更新的核心逻辑，返回更新量 α * m̂ / (√v̂ + ε)
    fn update_for(&mut self, name: &str, gradient: &Tensor) -> Result<Tensor, ModuleError> {
        let m = match self.m.remove(name) {
            Some(m) if m.is_same_shape(gradient) => m,
            _ => Tensor::zeros(gradient.shape()),
        };
        let v = match self.v.remove(name) {
            Some(v) if v.is_same_shape(gradient) => v,
            _ => Tensor::zeros(gradient.shape()),
        };

        // m = β1 * m + (1 - β1) * g
        let m = (m * self.beta1).try_add(&(gradient * (1.0 - self.beta1)))?;
        // v = β2 * v + (1 - β2) * g²
        let gradient_squared = gradient.try_mul(gradient)?;
        let v = (v * self.beta2).try_add(&(gradient_squared * (1.0 - self.beta2)))?;

        // 偏差修正
        let m_hat = &m * (1.0 / (1.0 - self.beta1.powi(self.t as i32)));
        let v_hat = &v * (1.0 / (1.0 - self.beta2.powi(self.t as i32)));

        let epsilon = self.epsilon;
        let denominator = v_hat.map(|x| x.sqrt() + epsilon);
        let update = m_hat.try_div(&denominator)? * self.state.learning_rate();

        self.m.insert(name.to_string(), m);
        self.v.insert(name.to_string(), v);
        Ok(update)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, module: &mut dyn Module) -> Result<(), ModuleError> {
        let _guard = NoGradGuard::new();
        self.t += 1;

        for (name, param) in module.named_parameters_mut() {
            if !param.requires_grad() {
                continue;
            }
            let Some(gradient) = param.grad() else {
                continue;
            };
            let update = self.update_for(&name, gradient)?;
            // θ = θ - α * m̂ / (√v̂ + ε)
            let new_value = param.value().try_sub(&update)?;
            param.value_mut().copy_from(&new_value)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.state.learning_rate()
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.state.set_learning_rate(lr);
    }
}

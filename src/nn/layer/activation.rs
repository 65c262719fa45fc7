/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 无参数的激活函数层：ReLU、Sigmoid、Tanh
 */

use crate::nn::{ForwardCache, Module, ModuleCore, ModuleError};
use crate::tensor::Tensor;

/// ReLU：max(0, x)
#[derive(Default)]
pub struct ReLU {
    core: ModuleCore,
    inputs: ForwardCache<Tensor>,
}

impl ReLU {
    pub const fn new() -> Self {
        Self {
            core: ModuleCore::new(),
            inputs: ForwardCache::new(),
        }
    }
}

impl Module for ReLU {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModuleError> {
        let output = x.map(|v| v.max(0.));
        self.inputs.push_with(&output, || x.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError> {
        let name = self.name();
        let input = self.inputs.pop(name, grad_output)?;
        // x = 0 处取次梯度 0
        let mask = input.map(|v| if v > 0. { 1. } else { 0. });
        Ok(grad_output.try_mul(&mask)?)
    }

    fn clear_local_cache(&mut self) {
        self.inputs.clear();
    }
}

/// Sigmoid：1 / (1 + e^-x)
#[derive(Default)]
pub struct Sigmoid {
    core: ModuleCore,
    outputs: ForwardCache<Tensor>,
}

impl Sigmoid {
    pub const fn new() -> Self {
        Self {
            core: ModuleCore::new(),
            outputs: ForwardCache::new(),
        }
    }
}

impl Module for Sigmoid {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModuleError> {
        let output = x.map(|v| 1. / (1. + (-v).exp()));
        self.outputs.push_with(&output, || output.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError> {
        let name = self.name();
        let output = self.outputs.pop(name, grad_output)?;
        // σ'(x) = σ(x)(1 - σ(x))
        let local = output.map(|s| s * (1. - s));
        Ok(grad_output.try_mul(&local)?)
    }

    fn clear_local_cache(&mut self) {
        self.outputs.clear();
    }
}

/// Tanh
#[derive(Default)]
pub struct Tanh {
    core: ModuleCore,
    outputs: ForwardCache<Tensor>,
}

impl Tanh {
    pub const fn new() -> Self {
        Self {
            core: ModuleCore::new(),
            outputs: ForwardCache::new(),
        }
    }
}

impl Module for Tanh {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModuleError> {
        let output = x.map(f32::tanh);
        self.outputs.push_with(&output, || output.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError> {
        let name = self.name();
        let output = self.outputs.pop(name, grad_output)?;
        let local = output.map(|t| 1. - t * t);
        Ok(grad_output.try_mul(&local)?)
    }

    fn clear_local_cache(&mut self) {
        self.outputs.clear();
    }
}

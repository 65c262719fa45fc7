/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 残差连接：y = block(x) + x
 */

use crate::errors::{Operator, TensorError};
use crate::nn::{ChildId, Module, ModuleCore, ModuleError};
use crate::tensor::Tensor;

/// 自定义前向计算的组合模块：子模块`block`的输出与输入逐元素相加
///
/// `block`的输出形状须与输入完全一致（不做广播）。
pub struct Residual {
    core: ModuleCore,
    block: ChildId,
}

impl Residual {
    pub fn new<M: Module + 'static>(block: M) -> Result<Self, ModuleError> {
        let mut core = ModuleCore::new();
        let block = core.register_module("block", block)?;
        Ok(Self { core, block })
    }

    pub fn block(&self) -> &dyn Module {
        self.core.child(self.block)
    }

    pub fn block_mut(&mut self) -> &mut dyn Module {
        self.core.child_mut(self.block)
    }
}

impl Module for Residual {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModuleError> {
        let y = self.block_mut().forward(x)?;
        if !y.is_same_shape(x) {
            return Err(TensorError::OperatorError {
                operator: Operator::Add,
                tensor1_shape: y.shape().to_vec(),
                tensor2_shape: x.shape().to_vec(),
            }
            .into());
        }
        Ok(y.try_add(x)?)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError> {
        // 恒等分支的梯度就是 grad_output 本身
        let grad_block = self.block_mut().backward(grad_output)?;
        Ok(grad_block.try_add(grad_output)?)
    }
}

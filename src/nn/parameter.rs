/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 可训练参数
 */

use super::{ModuleError, is_grad_enabled};
use crate::tensor::Tensor;

/// 可训练参数：数值 + 梯度累积槽
///
/// 参数只能通过`ModuleCore::register_parameter`创建，由注册它的模块独占。
#[derive(Debug, Clone)]
pub struct Parameter {
    value: Tensor,
    /// `None`表示自上次`zero_grad`以来没有累积过梯度
    grad: Option<Tensor>,
    requires_grad: bool,
}

impl Parameter {
    pub(crate) const fn new(value: Tensor) -> Self {
        Self {
            value,
            grad: None,
            requires_grad: true,
        }
    }

    pub const fn value(&self) -> &Tensor {
        &self.value
    }

    /// 直接改写参数的数值。优化器之外的改写通常应放在`no_grad`中进行
    pub const fn value_mut(&mut self) -> &mut Tensor {
        &mut self.value
    }

    pub const fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }

    /// 元素个数
    pub fn numel(&self) -> usize {
        self.value.size()
    }

    pub const fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// 冻结（`false`）或解冻参数。冻结的参数不累积梯度，也不会被优化器更新
    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
        if !requires_grad {
            self.grad = None;
        }
    }

    /// 将`grad`累加到梯度槽。形状须与参数严格一致
    pub fn accumulate_grad(&mut self, grad: &Tensor) -> Result<(), ModuleError> {
        if !self.requires_grad || !is_grad_enabled() {
            return Ok(());
        }
        if !self.value.is_same_shape(grad) {
            return Err(ModuleError::ShapeMismatch {
                name: "grad".to_string(),
                expected: self.value.shape().to_vec(),
                got: grad.shape().to_vec(),
            });
        }
        self.grad = Some(match self.grad.take() {
            Some(accumulated) => accumulated.try_add(grad)?,
            None => grad.clone(),
        });
        Ok(())
    }

    pub fn zero_grad(&mut self) {
        self.grad = None;
    }
}

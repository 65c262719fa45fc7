/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 前向传播缓存栈
 *
 * 同一个模块在一次前向传播中可能被调用多次（如`fc(fc(x))`），
 * 因此每次`forward`都压入一条缓存，`backward`按后进先出的顺序逐条弹出：
 * 第 k 次`backward`对应倒数第 k 次`forward`。
 * 弹出即消耗，同一条缓存不会被用于两次反向传播。
 */

use super::{ModuleError, is_grad_enabled};
use crate::tensor::Tensor;

/// 反向传播所需中间值的栈，附带每次前向输出的形状，用于校验传入的梯度
pub struct ForwardCache<T> {
    entries: Vec<CacheEntry<T>>,
}

struct CacheEntry<T> {
    output_shape: Vec<usize>,
    value: T,
}

impl<T> Default for ForwardCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ForwardCache<T> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 梯度追踪开启时压入一条缓存；关闭时什么也不做（`value`不会被求值）
    pub fn push_with(&mut self, output: &Tensor, value: impl FnOnce() -> T) {
        if is_grad_enabled() {
            self.entries.push(CacheEntry {
                output_shape: output.shape().to_vec(),
                value: value(),
            });
        }
    }

    /// 弹出最近一次前向传播的缓存
    ///
    /// 栈为空时返回`MissingForwardCache`；`grad_output`的形状与对应输出不一致时返回
    /// `ShapeMismatch`，此时缓存保持不变。
    pub fn pop(&mut self, owner: &str, grad_output: &Tensor) -> Result<T, ModuleError> {
        let entry = self
            .entries
            .last()
            .ok_or_else(|| ModuleError::MissingForwardCache(owner.to_string()))?;
        if entry.output_shape != grad_output.shape() {
            return Err(ModuleError::ShapeMismatch {
                name: format!("{owner}的输出梯度"),
                expected: entry.output_shape.clone(),
                got: grad_output.shape().to_vec(),
            });
        }
        self.entries
            .pop()
            .map(|entry| entry.value)
            .ok_or_else(|| ModuleError::MissingForwardCache(owner.to_string()))
    }

    /// 尚未被反向传播消耗的缓存条数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 损失函数封装（PyTorch 风格 API）
 *
 * 损失函数不是模块：没有参数，也不进入模块树。
 * `forward`返回形状为[1]的损失值并缓存反向传播所需的差值，
 * `backward`返回损失对预测值的梯度，直接交给模型的`Module::backward`；
 * 缓存随之被消耗，再次`backward`须先重新`forward`。
 *
 * ```ignore
 * let mut criterion = MseLoss::new();
 * let pred = model.forward(&x)?;
 * let loss = criterion.forward(&pred, &y)?;
 * model.backward(&criterion.backward()?)?;
 * ```
 */

use super::{ModuleError, is_grad_enabled};
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// 损失的归约方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reduction {
    /// 对所有元素求平均
    #[default]
    Mean,
    /// 对所有元素求和
    Sum,
}

// ==================== MseLoss ====================

/// 均方误差损失：`mean((pred - target)²)`或`sum((pred - target)²)`
///
/// `pred`与`target`的形状须完全一致。
#[derive(Debug, Default)]
pub struct MseLoss {
    reduction: Reduction,
    /// 上次前向传播的`pred - target`
    diff: Option<Tensor>,
}

impl MseLoss {
    pub fn new() -> Self {
        Self::with_reduction(Reduction::Mean)
    }

    pub const fn with_reduction(reduction: Reduction) -> Self {
        Self {
            reduction,
            diff: None,
        }
    }

    pub const fn reduction(&self) -> Reduction {
        self.reduction
    }

    pub fn forward(&mut self, pred: &Tensor, target: &Tensor) -> Result<Tensor, ModuleError> {
        if !pred.is_same_shape(target) {
            return Err(ModuleError::ShapeMismatch {
                name: "MseLoss 的目标值".to_string(),
                expected: pred.shape().to_vec(),
                got: target.shape().to_vec(),
            });
        }
        let diff = pred.try_sub(target)?;
        let squared = diff.map(|d| d * d);
        let loss = match self.reduction {
            Reduction::Mean => squared.mean(),
            Reduction::Sum => squared.sum(),
        };
        self.diff = is_grad_enabled().then_some(diff);
        Ok(loss)
    }

    /// 损失对`pred`的梯度：`2(pred - target)`，`Mean`时再除以元素个数
    pub fn backward(&mut self) -> Result<Tensor, ModuleError> {
        let diff = self
            .diff
            .take()
            .ok_or_else(|| ModuleError::MissingForwardCache("MseLoss".to_string()))?;
        let scale = match self.reduction {
            Reduction::Mean => 2. / diff.size() as f32,
            Reduction::Sum => 2.,
        };
        Ok(&diff * scale)
    }
}

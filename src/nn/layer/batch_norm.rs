/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : BatchNorm1d 层
 *
 * 参数：`weight`(γ)、`bias`(β)，形状均为[num_features]；
 * 缓冲区：`running_mean`、`running_var`、`num_batches_tracked`，随状态字典保存，但不被优化器更新。
 *
 * - 训练模式：用当前 batch 的均值/（有偏）方差归一化，并以`momentum`更新滑动统计量
 *   （滑动方差使用无偏估计，与 PyTorch 一致）；
 * - 评估模式：用滑动统计量归一化。
 */

use crate::nn::{BufferId, ForwardCache, Module, ModuleCore, ModuleError, ParamId};
use crate::tensor::Tensor;

pub struct BatchNorm1d {
    core: ModuleCore,
    weight: ParamId,
    bias: ParamId,
    running_mean: BufferId,
    running_var: BufferId,
    num_batches_tracked: BufferId,
    num_features: usize,
    eps: f32,
    momentum: f32,
    caches: ForwardCache<BatchNormCache>,
}

struct BatchNormCache {
    /// 归一化后的输入
    x_hat: Tensor,
    /// 1/√(var + eps)，形状[num_features]
    inv_std: Tensor,
    /// 是否使用了 batch 统计量（决定反向传播公式）
    batch_stats: bool,
}

impl BatchNorm1d {
    pub fn new(num_features: usize) -> Result<Self, ModuleError> {
        Self::with_options(num_features, 1e-5, 0.1)
    }

    pub fn with_options(num_features: usize, eps: f32, momentum: f32) -> Result<Self, ModuleError> {
        if num_features == 0 {
            return Err(ModuleError::InvalidConfig(
                "BatchNorm1d 的特征数须大于0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&momentum) || eps <= 0. {
            return Err(ModuleError::InvalidConfig(format!(
                "BatchNorm1d 的 momentum 须在[0, 1]之间且 eps 须大于0，实际为 momentum={momentum}, eps={eps}"
            )));
        }

        let mut core = ModuleCore::new();
        let weight = core.register_parameter("weight", Tensor::ones(&[num_features]))?;
        let bias = core.register_parameter("bias", Tensor::zeros(&[num_features]))?;
        let running_mean = core.register_buffer("running_mean", Tensor::zeros(&[num_features]))?;
        let running_var = core.register_buffer("running_var", Tensor::ones(&[num_features]))?;
        let num_batches_tracked = core.register_buffer("num_batches_tracked", Tensor::zeros(&[]))?;

        Ok(Self {
            core,
            weight,
            bias,
            running_mean,
            running_var,
            num_batches_tracked,
            num_features,
            eps,
            momentum,
            caches: ForwardCache::new(),
        })
    }

    pub fn running_mean(&self) -> &Tensor {
        self.core.buffer(self.running_mean)
    }

    pub fn running_var(&self) -> &Tensor {
        self.core.buffer(self.running_var)
    }

    pub fn num_batches_tracked(&self) -> usize {
        self.core
            .buffer(self.num_batches_tracked)
            .number()
            .map_or(0, |n| n as usize)
    }

    fn check_input(&self, x: &Tensor) -> Result<(), ModuleError> {
        if x.dimension() != 2 || x.shape()[1] != self.num_features {
            let batch = x.shape().first().copied().unwrap_or(0);
            return Err(ModuleError::ShapeMismatch {
                name: format!("{}的输入", self.name()),
                expected: vec![batch, self.num_features],
                got: x.shape().to_vec(),
            });
        }
        Ok(())
    }

    /// 返回 batch 均值与有偏方差，并更新滑动统计量
    fn batch_statistics(&mut self, x: &Tensor) -> Result<(Tensor, Tensor), ModuleError> {
        let batch = x.shape()[0];
        if batch < 2 {
            return Err(ModuleError::InvalidConfig(format!(
                "训练模式下{}每个特征需要至少2个样本，实际为{batch}",
                self.name()
            )));
        }
        let mean = x.mean_axis_0();
        let centered = x.try_sub(&mean)?;
        let var = centered.map(|v| v * v).mean_axis_0();

        let m = self.momentum;
        let unbiased = &var * (batch as f32 / (batch - 1) as f32);
        let new_mean = (self.running_mean() * (1. - m)).try_add(&(&mean * m))?;
        let new_var = (self.running_var() * (1. - m)).try_add(&(&unbiased * m))?;
        self.core.buffer_mut(self.running_mean).copy_from(&new_mean)?;
        self.core.buffer_mut(self.running_var).copy_from(&new_var)?;
        let tracked = self.core.buffer_mut(self.num_batches_tracked);
        *tracked = &*tracked + 1.;

        Ok((mean, var))
    }
}

impl Module for BatchNorm1d {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModuleError> {
        self.check_input(x)?;
        let batch_stats = self.is_training();
        let (mean, var) = if batch_stats {
            self.batch_statistics(x)?
        } else {
            (self.running_mean().clone(), self.running_var().clone())
        };

        let eps = self.eps;
        let inv_std = var.map(|v| 1. / (v + eps).sqrt());
        let x_hat = x.try_sub(&mean)?.try_mul(&inv_std)?;
        let gamma = self.core.parameter(self.weight).value();
        let beta = self.core.parameter(self.bias).value();
        let output = x_hat.try_mul(gamma)?.try_add(beta)?;

        self.caches.push_with(&output, || BatchNormCache {
            x_hat,
            inv_std,
            batch_stats,
        });
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError> {
        let name = self.name();
        let cache = self.caches.pop(name, grad_output)?;
        let gamma = self.core.parameter(self.weight).value();

        let grad_gamma = grad_output.try_mul(&cache.x_hat)?.sum_axis_0();
        let grad_beta = grad_output.sum_axis_0();
        let grad_x_hat = grad_output.try_mul(gamma)?;

        let grad_input = if cache.batch_stats {
            // dx = inv_std / N * (N * dx̂ - Σdx̂ - x̂ * Σ(dx̂ * x̂))
            let n = grad_output.shape()[0] as f32;
            let sum_grad = grad_x_hat.sum_axis_0();
            let sum_grad_x_hat = grad_x_hat.try_mul(&cache.x_hat)?.sum_axis_0();
            (&grad_x_hat * n)
                .try_sub(&sum_grad)?
                .try_sub(&cache.x_hat.try_mul(&sum_grad_x_hat)?)?
                .try_mul(&(&cache.inv_std * (1. / n)))?
        } else {
            grad_x_hat.try_mul(&cache.inv_std)?
        };

        self.core
            .parameter_mut(self.weight)
            .accumulate_grad(&grad_gamma)?;
        self.core
            .parameter_mut(self.bias)
            .accumulate_grad(&grad_beta)?;
        Ok(grad_input)
    }

    fn clear_local_cache(&mut self) {
        self.caches.clear();
    }

    fn extra_repr(&self) -> String {
        format!(
            "{}, eps={}, momentum={}",
            self.num_features, self.eps, self.momentum
        )
    }
}

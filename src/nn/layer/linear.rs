/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : Linear (全连接) 层
 */

use crate::nn::{ForwardCache, Module, ModuleCore, ModuleError, ParamId, Parameter};
use crate::tensor::Tensor;

/// Linear (全连接) 层
///
/// PyTorch 风格的全连接层：`output = x @ Wᵀ + b`
///
/// # 输入/输出形状
/// - 输入：[batch_size, in_features]
/// - 输出：[batch_size, out_features]
/// - 权重`weight`：[out_features, in_features]
/// - 偏置`bias`：[out_features]（可选）
///
/// # 使用示例
/// ```ignore
/// let mut fc = Linear::new(3, 2)?;
/// let y = fc.forward(&Tensor::zeros(&[4, 3]))?; // [4, 2]
/// ```
pub struct Linear {
    core: ModuleCore,
    weight: ParamId,
    bias: Option<ParamId>,
    in_features: usize,
    out_features: usize,
    /// 每次前向传播的输入，反向传播时按后进先出取回
    inputs: ForwardCache<Tensor>,
}

impl Linear {
    /// 创建带偏置的 Linear 层，参数服从 U(-1/√in, 1/√in)
    pub fn new(in_features: usize, out_features: usize) -> Result<Self, ModuleError> {
        Self::with_options(in_features, out_features, true, None)
    }

    /// 同`new`，但使用固定种子初始化，保证可重复性
    pub fn new_seeded(
        in_features: usize,
        out_features: usize,
        seed: u64,
    ) -> Result<Self, ModuleError> {
        Self::with_options(in_features, out_features, true, Some(seed))
    }

    /// 创建不带偏置的 Linear 层
    pub fn without_bias(in_features: usize, out_features: usize) -> Result<Self, ModuleError> {
        Self::with_options(in_features, out_features, false, None)
    }

    /// # 参数
    /// - `use_bias`: 是否使用偏置
    /// - `seed`: 随机种子，`None`则使用线程随机数
    pub fn with_options(
        in_features: usize,
        out_features: usize,
        use_bias: bool,
        seed: Option<u64>,
    ) -> Result<Self, ModuleError> {
        if in_features == 0 || out_features == 0 {
            return Err(ModuleError::InvalidConfig(format!(
                "Linear 的输入、输出维度须大于0，实际为({in_features}, {out_features})"
            )));
        }
        let bound = 1.0 / (in_features as f32).sqrt();
        let init = |shape: &[usize], offset: u64| match seed {
            Some(seed) => Tensor::uniform_seeded(-bound, bound, shape, seed.wrapping_add(offset)),
            None => Tensor::uniform(-bound, bound, shape),
        };

        let mut core = ModuleCore::new();
        let weight = core.register_parameter("weight", init(&[out_features, in_features], 0))?;
        let bias = if use_bias {
            Some(core.register_parameter("bias", init(&[out_features], 1))?)
        } else {
            None
        };

        Ok(Self {
            core,
            weight,
            bias,
            in_features,
            out_features,
            inputs: ForwardCache::new(),
        })
    }

    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    pub const fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn weight(&self) -> &Parameter {
        self.core.parameter(self.weight)
    }

    pub fn weight_mut(&mut self) -> &mut Parameter {
        self.core.parameter_mut(self.weight)
    }

    pub fn bias(&self) -> Option<&Parameter> {
        self.bias.map(|id| self.core.parameter(id))
    }

    pub fn bias_mut(&mut self) -> Option<&mut Parameter> {
        let id = self.bias?;
        Some(self.core.parameter_mut(id))
    }
}

impl Module for Linear {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModuleError> {
        // x @ Wᵀ: [batch, in] @ [in, out] = [batch, out]
        let weight_t = self.weight().value().transpose()?;
        let mut output = x.mat_mul(&weight_t)?;
        if let Some(bias) = self.bias() {
            output = output.try_add(bias.value())?;
        }
        self.inputs.push_with(&output, || x.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError> {
        let name = self.name();
        let input = self.inputs.pop(name, grad_output)?;

        // dW = gᵀ @ x: [out, batch] @ [batch, in] = [out, in]
        let grad_weight = grad_output.transpose()?.mat_mul(&input)?;
        // dx = g @ W: [batch, out] @ [out, in] = [batch, in]
        let grad_input = grad_output.mat_mul(self.weight().value())?;
        let grad_bias = self.bias.map(|_| grad_output.sum_axis_0());

        self.weight_mut().accumulate_grad(&grad_weight)?;
        if let (Some(bias), Some(grad_bias)) = (self.bias_mut(), grad_bias) {
            bias.accumulate_grad(&grad_bias)?;
        }
        Ok(grad_input)
    }

    fn clear_local_cache(&mut self) {
        self.inputs.clear();
    }

    fn extra_repr(&self) -> String {
        format!(
            "in_features={}, out_features={}, bias={}",
            self.in_features,
            self.out_features,
            self.bias.is_some()
        )
    }
}

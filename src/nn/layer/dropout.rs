/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : Dropout 层
 *
 * 训练模式下以概率`p`将元素置零，并把保留的元素放大`1/(1-p)`倍，使期望不变；
 * 评估模式下原样输出。
 */

use crate::nn::{ForwardCache, Module, ModuleCore, ModuleError};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct Dropout {
    core: ModuleCore,
    p: f32,
    rng: StdRng,
    /// 训练模式下为掩码（已含缩放），评估模式下为`None`（恒等）
    masks: ForwardCache<Option<Tensor>>,
}

impl Dropout {
    pub fn new(p: f32) -> Result<Self, ModuleError> {
        Self::build(p, StdRng::from_entropy())
    }

    pub fn new_seeded(p: f32, seed: u64) -> Result<Self, ModuleError> {
        Self::build(p, StdRng::seed_from_u64(seed))
    }

    fn build(p: f32, rng: StdRng) -> Result<Self, ModuleError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(ModuleError::InvalidConfig(format!(
                "Dropout 的概率须在[0, 1]之间，实际为{p}"
            )));
        }
        Ok(Self {
            core: ModuleCore::new(),
            p,
            rng,
            masks: ForwardCache::new(),
        })
    }

    pub const fn p(&self) -> f32 {
        self.p
    }
}

impl Module for Dropout {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModuleError> {
        if !self.is_training() || self.p == 0. {
            let output = x.clone();
            self.masks.push_with(&output, || None);
            return Ok(output);
        }

        let keep_scale = if self.p < 1. { 1. / (1. - self.p) } else { 0. };
        let p = self.p;
        let rng = &mut self.rng;
        let mask = x.map(|_| if rng.r#gen::<f32>() < p { 0. } else { keep_scale });
        let output = x.try_mul(&mask)?;
        self.masks.push_with(&output, || Some(mask));
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError> {
        let name = self.name();
        match self.masks.pop(name, grad_output)? {
            None => Ok(grad_output.clone()),
            Some(mask) => Ok(grad_output.try_mul(&mask)?),
        }
    }

    fn clear_local_cache(&mut self) {
        self.masks.clear();
    }

    fn extra_repr(&self) -> String {
        format!("p={}", self.p)
    }
}

//! 残差 MLP 模型定义

use only_module::nn::{
    BatchNorm1d, ChildId, Dropout, Linear, Module, ModuleCore, ModuleError, ReLU, Residual,
    Sequential,
};
use only_module::tensor::Tensor;

/// 残差 MLP
///
/// 网络结构: input -> Linear -> BatchNorm1d -> ReLU -> [Residual(Linear -> ReLU)] × depth -> Dropout -> Linear
pub struct ResidualMlp {
    core: ModuleCore,
    stem: ChildId,
    blocks: ChildId,
    head: ChildId,
}

impl ResidualMlp {
    pub fn new(
        in_features: usize,
        hidden: usize,
        depth: usize,
        seed: u64,
    ) -> Result<Self, ModuleError> {
        let mut core = ModuleCore::new();
        let stem = core.register_module(
            "stem",
            Sequential::new()
                .add_named("fc", Linear::new_seeded(in_features, hidden, seed)?)?
                .add_named("bn", BatchNorm1d::new(hidden)?)?
                .add_named("act", ReLU::new())?,
        )?;

        let mut blocks = Sequential::new();
        for i in 0..depth {
            let block = Sequential::new()
                .add(Linear::new_seeded(hidden, hidden, seed + 1 + i as u64)?)?
                .add(ReLU::new())?;
            blocks.push(Residual::new(block)?)?;
        }
        let blocks = core.register_module("blocks", blocks)?;

        let head = core.register_module(
            "head",
            Sequential::new()
                .add_named("dropout", Dropout::new_seeded(0.1, seed)?)?
                .add_named("fc", Linear::new_seeded(hidden, 1, seed + 100)?)?,
        )?;

        Ok(Self {
            core,
            stem,
            blocks,
            head,
        })
    }
}

impl Module for ResidualMlp {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModuleError> {
        let h = self.core.child_mut(self.stem).forward(x)?;
        let h = self.core.child_mut(self.blocks).forward(&h)?;
        self.core.child_mut(self.head).forward(&h)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError> {
        let g = self.core.child_mut(self.head).backward(grad_output)?;
        let g = self.core.child_mut(self.blocks).backward(&g)?;
        self.core.child_mut(self.stem).backward(&g)
    }
}

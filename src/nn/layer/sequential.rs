/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : Sequential 容器：前向按顺序串联子模块，反向按逆序回传梯度
 */

use crate::nn::{ChildId, Module, ModuleCore, ModuleError};
use crate::tensor::Tensor;

/// 顺序容器
///
/// 未命名的子模块以其在容器中的序号（字符串）作为名称，
/// 因此参数名形如`0.weight`、`2.bias`，与 PyTorch 一致。
///
/// # 使用示例
/// ```ignore
/// let mut model = Sequential::new()
///     .add(Linear::new(3, 8)?)?
///     .add(ReLU::new())?
///     .add(Linear::new(8, 1)?)?;
/// let y = model.forward(&x)?;
/// ```
///
/// 执行顺序即`ModuleCore`中子模块的注册顺序，因此经`core_mut().register_module`
/// 直接注册的子模块同样参与前向、反向传播。
#[derive(Default)]
pub struct Sequential {
    core: ModuleCore,
}

impl Sequential {
    pub const fn new() -> Self {
        Self {
            core: ModuleCore::new(),
        }
    }

    /// 由(可选名称, 模块)序列构造
    pub fn from_modules<I>(modules: I) -> Result<Self, ModuleError>
    where
        I: IntoIterator<Item = (Option<String>, Box<dyn Module>)>,
    {
        let mut sequential = Self::new();
        for (name, module) in modules {
            sequential.push_boxed(name.as_deref(), module)?;
        }
        Ok(sequential)
    }

    /// 链式追加一个未命名的子模块
    pub fn add<M: Module + 'static>(mut self, module: M) -> Result<Self, ModuleError> {
        self.push(module)?;
        Ok(self)
    }

    /// 链式追加一个命名的子模块
    pub fn add_named<M: Module + 'static>(mut self, name: &str, module: M) -> Result<Self, ModuleError> {
        self.push_named(name, module)?;
        Ok(self)
    }

    pub fn push<M: Module + 'static>(&mut self, module: M) -> Result<ChildId, ModuleError> {
        self.push_boxed(None, Box::new(module))
    }

    pub fn push_named<M: Module + 'static>(
        &mut self,
        name: &str,
        module: M,
    ) -> Result<ChildId, ModuleError> {
        self.push_boxed(Some(name), Box::new(module))
    }

    pub fn push_boxed(
        &mut self,
        name: Option<&str>,
        module: Box<dyn Module>,
    ) -> Result<ChildId, ModuleError> {
        let index = self.len().to_string();
        self.core
            .register_boxed_module(name.unwrap_or(&index), module)
    }

    pub const fn len(&self) -> usize {
        self.core.num_children()
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按位置取子模块
    pub fn get(&self, index: usize) -> Option<&dyn Module> {
        self.core.children().nth(index).map(|(_, child)| child)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut dyn Module> {
        self.core
            .children_mut()
            .nth(index)
            .map(|(_, child)| child as &mut dyn Module)
    }
}

impl Module for Sequential {
    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    /// 第 i 个子模块的输出作为第 i+1 个的输入；空容器原样返回输入
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModuleError> {
        let mut x = input.clone();
        for (_, child) in self.core.children_mut() {
            x = child.forward(&x)?;
        }
        Ok(x)
    }

    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError> {
        let mut grad = grad_output.clone();
        for (_, child) in self.core.children_mut().rev() {
            grad = child.backward(&grad)?;
        }
        Ok(grad)
    }
}

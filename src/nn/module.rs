/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : Module trait 与 ModuleCore（参数/缓冲区/子模块的注册表）
 *
 * 模块以“包含”而非“继承”的方式组合：每个模块持有一个`ModuleCore`，
 * 其中按注册顺序保存自身的参数、缓冲区和（独占所有权的）子模块，
 * 因此模块树天然无环，且遍历顺序稳定。
 *
 * 注册是显式的：构造时调用`register_*`，拿到的`ParamId`/`BufferId`/`ChildId`
 * 句柄用于在前向、反向传播中取回对应对象。
 */

use super::{IncompatibleKeys, ModuleError, Parameter, StateDict};
use crate::tensor::Tensor;

/// 参数句柄，仅对签发它的`ModuleCore`有效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(usize);

/// 缓冲区句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(usize);

/// 子模块句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildId(usize);

/// 模块的注册表
pub struct ModuleCore {
    parameters: Vec<(String, Parameter)>,
    buffers: Vec<(String, Tensor)>,
    children: Vec<(String, Box<dyn Module>)>,
    training: bool,
}

impl Default for ModuleCore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleCore {
    /// 新建的模块处于训练模式
    pub const fn new() -> Self {
        Self {
            parameters: Vec::new(),
            buffers: Vec::new(),
            children: Vec::new(),
            training: true,
        }
    }

    // ========== 注册 ==========

    pub fn register_parameter(&mut self, name: &str, value: Tensor) -> Result<ParamId, ModuleError> {
        self.check_name(name)?;
        log::debug!("注册参数`{name}`，形状{:?}", value.shape());
        self.parameters
            .push((name.to_string(), Parameter::new(value)));
        Ok(ParamId(self.parameters.len() - 1))
    }

    /// 注册不参与训练、但随状态字典一起保存/加载的张量
    pub fn register_buffer(&mut self, name: &str, value: Tensor) -> Result<BufferId, ModuleError> {
        self.check_name(name)?;
        log::debug!("注册缓冲区`{name}`，形状{:?}", value.shape());
        self.buffers.push((name.to_string(), value));
        Ok(BufferId(self.buffers.len() - 1))
    }

    pub fn register_module<M: Module + 'static>(
        &mut self,
        name: &str,
        module: M,
    ) -> Result<ChildId, ModuleError> {
        self.register_boxed_module(name, Box::new(module))
    }

    pub fn register_boxed_module(
        &mut self,
        name: &str,
        module: Box<dyn Module>,
    ) -> Result<ChildId, ModuleError> {
        self.check_name(name)?;
        log::debug!("注册子模块`{name}`：{}", module.name());
        self.children.push((name.to_string(), module));
        Ok(ChildId(self.children.len() - 1))
    }

    /// 同一模块内，参数、缓冲区、子模块共用一个命名空间
    fn check_name(&self, name: &str) -> Result<(), ModuleError> {
        if name.is_empty() || name.contains('.') {
            return Err(ModuleError::InvalidName(name.to_string()));
        }
        let taken = self.parameters.iter().any(|(n, _)| n == name)
            || self.buffers.iter().any(|(n, _)| n == name)
            || self.children.iter().any(|(n, _)| n == name);
        if taken {
            return Err(ModuleError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    // ========== 按句柄取回 ==========

    pub fn parameter(&self, id: ParamId) -> &Parameter {
        &self.parameters[id.0].1
    }

    pub fn parameter_mut(&mut self, id: ParamId) -> &mut Parameter {
        &mut self.parameters[id.0].1
    }

    pub fn buffer(&self, id: BufferId) -> &Tensor {
        &self.buffers[id.0].1
    }

    pub fn buffer_mut(&mut self, id: BufferId) -> &mut Tensor {
        &mut self.buffers[id.0].1
    }

    pub fn child(&self, id: ChildId) -> &dyn Module {
        self.children[id.0].1.as_ref()
    }

    pub fn child_mut(&mut self, id: ChildId) -> &mut dyn Module {
        self.children[id.0].1.as_mut()
    }

    /// 按注册顺序遍历自身（不含子模块）的参数
    pub fn local_parameters(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.parameters
            .iter()
            .map(|(name, param)| (name.as_str(), param))
    }

    pub fn local_buffers(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.buffers
            .iter()
            .map(|(name, buffer)| (name.as_str(), buffer))
    }

    /// 按注册顺序遍历直接子模块
    pub fn children(
        &self,
    ) -> impl DoubleEndedIterator<Item = (&str, &(dyn Module + 'static))> + ExactSizeIterator {
        self.children
            .iter()
            .map(|(name, child)| (name.as_str(), child.as_ref()))
    }

    pub fn children_mut(
        &mut self,
    ) -> impl DoubleEndedIterator<Item = (&str, &mut (dyn Module + 'static))> + ExactSizeIterator {
        self.children
            .iter_mut()
            .map(|(name, child)| (name.as_str(), child.as_mut()))
    }

    pub const fn num_children(&self) -> usize {
        self.children.len()
    }

    // ========== 训练/评估模式 ==========

    pub const fn is_training(&self) -> bool {
        self.training
    }

    /// 设置自身的模式，并通过子模块的`Module::set_training`向下广播
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
        for (_, child) in &mut self.children {
            child.set_training(training);
        }
    }

    // ========== 深度优先遍历（父先于子，同层按注册顺序）==========

    fn collect_parameters<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Parameter)>) {
        for (name, param) in &self.parameters {
            out.push((join_name(prefix, name), param));
        }
        for (name, child) in &self.children {
            child
                .core()
                .collect_parameters(&join_name(prefix, name), out);
        }
    }

    fn collect_parameters_mut<'a>(
        &'a mut self,
        prefix: &str,
        out: &mut Vec<(String, &'a mut Parameter)>,
    ) {
        for (name, param) in &mut self.parameters {
            out.push((join_name(prefix, name), param));
        }
        for (name, child) in &mut self.children {
            child
                .core_mut()
                .collect_parameters_mut(&join_name(prefix, name), out);
        }
    }

    fn collect_buffers<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Tensor)>) {
        for (name, buffer) in &self.buffers {
            out.push((join_name(prefix, name), buffer));
        }
        for (name, child) in &self.children {
            child.core().collect_buffers(&join_name(prefix, name), out);
        }
    }

    /// 状态字典的顺序：每个模块先自身参数、再自身缓冲区，然后依次进入子模块
    fn collect_state<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Tensor)>) {
        for (name, param) in &self.parameters {
            out.push((join_name(prefix, name), param.value()));
        }
        for (name, buffer) in &self.buffers {
            out.push((join_name(prefix, name), buffer));
        }
        for (name, child) in &self.children {
            child.core().collect_state(&join_name(prefix, name), out);
        }
    }

    fn collect_state_mut<'a>(&'a mut self, prefix: &str, out: &mut Vec<(String, &'a mut Tensor)>) {
        for (name, param) in &mut self.parameters {
            out.push((join_name(prefix, name), param.value_mut()));
        }
        for (name, buffer) in &mut self.buffers {
            out.push((join_name(prefix, name), buffer));
        }
        for (name, child) in &mut self.children {
            child
                .core_mut()
                .collect_state_mut(&join_name(prefix, name), out);
        }
    }

    // ========== 状态字典 ==========

    fn state_dict(&self) -> StateDict {
        let mut entries = Vec::new();
        self.collect_state("", &mut entries);
        entries
            .into_iter()
            .map(|(name, tensor)| (name, tensor.clone()))
            .collect()
    }

    /// 先校验全部键和形状，全部通过后才写入，因此失败时模块保持原样
    fn load_state(&mut self, state: &StateDict, strict: bool) -> Result<IncompatibleKeys, ModuleError> {
        let mut expected = Vec::new();
        self.collect_state("", &mut expected);

        let missing_keys = expected
            .iter()
            .filter(|(name, _)| !state.contains_key(name))
            .map(|(name, _)| name.clone())
            .collect::<Vec<_>>();
        let unexpected_keys = state
            .keys()
            .filter(|key| !expected.iter().any(|(name, _)| name == key))
            .map(str::to_string)
            .collect::<Vec<_>>();
        if strict && (!missing_keys.is_empty() || !unexpected_keys.is_empty()) {
            return Err(ModuleError::KeyMismatch {
                missing: missing_keys,
                unexpected: unexpected_keys,
            });
        }

        for (name, current) in &expected {
            if let Some(loaded) = state.get(name) {
                if !current.is_same_shape(loaded) {
                    return Err(ModuleError::ShapeMismatch {
                        name: name.clone(),
                        expected: current.shape().to_vec(),
                        got: loaded.shape().to_vec(),
                    });
                }
            }
        }

        let mut targets = Vec::new();
        self.collect_state_mut("", &mut targets);
        for (name, target) in targets {
            if let Some(loaded) = state.get(&name) {
                target.copy_from(loaded)?;
            }
        }

        let report = IncompatibleKeys {
            missing_keys,
            unexpected_keys,
        };
        if !report.is_empty() {
            log::warn!(
                "非严格加载状态字典：缺失{:?}，忽略{:?}",
                report.missing_keys,
                report.unexpected_keys
            );
        }
        Ok(report)
    }
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// 模块 trait
///
/// # 设计原则
/// - 只需实现`core`/`core_mut`（交出注册表）以及`forward`/`backward`；
///   参数枚举、模式切换、状态字典等都由默认方法基于注册表完成
/// - `forward`取`&mut self`，以便把反向传播所需的中间值压入`ForwardCache`（`no_grad`下不缓存）；
///   同一模块可在一次前向传播中被多次调用，`backward`须按相反的顺序调用相同的次数
/// - `backward`接收损失对输出的梯度，把参数梯度累加到各`Parameter`中，并返回损失对输入的梯度
///
/// # 使用示例
///
/// ```ignore
/// use only_module::nn::{Linear, Module, ModuleCore, ChildId, ReLU};
///
/// struct Mlp {
///     core: ModuleCore,
///     fc1: ChildId,
///     act: ChildId,
///     fc2: ChildId,
/// }
///
/// impl Mlp {
///     fn new() -> Result<Self, ModuleError> {
///         let mut core = ModuleCore::new();
///         let fc1 = core.register_module("fc1", Linear::new(4, 8)?)?;
///         let act = core.register_module("act", ReLU::new())?;
///         let fc2 = core.register_module("fc2", Linear::new(8, 1)?)?;
///         Ok(Self { core, fc1, act, fc2 })
///     }
/// }
///
/// impl Module for Mlp {
///     fn core(&self) -> &ModuleCore { &self.core }
///     fn core_mut(&mut self) -> &mut ModuleCore { &mut self.core }
///
///     fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModuleError> {
///         let h = self.core.child_mut(self.fc1).forward(x)?;
///         let h = self.core.child_mut(self.act).forward(&h)?;
///         self.core.child_mut(self.fc2).forward(&h)
///     }
///
///     fn backward(&mut self, grad: &Tensor) -> Result<Tensor, ModuleError> {
///         let g = self.core.child_mut(self.fc2).backward(grad)?;
///         let g = self.core.child_mut(self.act).backward(&g)?;
///         self.core.child_mut(self.fc1).backward(&g)
///     }
/// }
/// ```
pub trait Module {
    fn core(&self) -> &ModuleCore;

    fn core_mut(&mut self) -> &mut ModuleCore;

    /// 前向传播
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModuleError>;

    /// 反向传播：输入损失对输出的梯度，返回损失对输入的梯度
    fn backward(&mut self, grad_output: &Tensor) -> Result<Tensor, ModuleError>;

    /// 模块的类型名（不含路径），用于打印和模型描述
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// 打印时放在类型名括号内的额外信息，如`in_features=3, out_features=2`
    fn extra_repr(&self) -> String {
        String::new()
    }

    // ========== 参数、缓冲区、子模块 ==========

    /// 以全限定名（以`.`连接各级名称）枚举整棵模块树的参数
    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut out = Vec::new();
        self.core().collect_parameters("", &mut out);
        out
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.named_parameters()
            .into_iter()
            .map(|(_, param)| param)
            .collect()
    }

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Parameter)> {
        let mut out = Vec::new();
        self.core_mut().collect_parameters_mut("", &mut out);
        out
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        self.named_parameters_mut()
            .into_iter()
            .map(|(_, param)| param)
            .collect()
    }

    fn named_buffers(&self) -> Vec<(String, &Tensor)> {
        let mut out = Vec::new();
        self.core().collect_buffers("", &mut out);
        out
    }

    /// 直接子模块
    fn named_children(&self) -> Vec<(&str, &(dyn Module + 'static))> {
        self.core().children().collect()
    }

    /// 参数（张量）个数
    fn num_params(&self) -> usize {
        self.named_parameters().len()
    }

    /// 参数的元素总数
    fn num_param_elements(&self) -> usize {
        self.parameters().iter().map(|param| param.numel()).sum()
    }

    fn zero_grad(&mut self) {
        for param in self.parameters_mut() {
            param.zero_grad();
        }
    }

    // ========== 前向缓存 ==========

    /// 丢弃模块自身（不含子模块）尚未被`backward`消耗的前向缓存；持有`ForwardCache`的模块须覆盖
    fn clear_local_cache(&mut self) {}

    /// 丢弃整棵模块树的前向缓存，如开启梯度追踪做了只前向、不反向的推理之后
    fn clear_forward_cache(&mut self) {
        self.clear_local_cache();
        for (_, child) in self.core_mut().children_mut() {
            child.clear_forward_cache();
        }
    }

    // ========== 训练/评估模式 ==========

    fn train(&mut self) {
        self.set_training(true);
    }

    fn eval(&mut self) {
        self.set_training(false);
    }

    fn set_training(&mut self, training: bool) {
        self.core_mut().set_training(training);
    }

    fn is_training(&self) -> bool {
        self.core().is_training()
    }

    // ========== 状态字典 ==========

    /// 整棵模块树的参数与缓冲区的快照（不含梯度）
    fn state_dict(&self) -> StateDict {
        self.core().state_dict()
    }

    /// 严格加载：键集合须与`state_dict()`完全一致，形状须逐个一致
    fn load_state_dict(&mut self, state: &StateDict) -> Result<(), ModuleError> {
        self.load_state_dict_with(state, true).map(|_| ())
    }

    /// `strict`为`false`时，缺失或多余的键不报错，而是在返回值中列出；形状不一致仍报错
    fn load_state_dict_with(
        &mut self,
        state: &StateDict,
        strict: bool,
    ) -> Result<IncompatibleKeys, ModuleError> {
        self.core_mut().load_state(state, strict)
    }

    /// 类似 PyTorch 的模块树打印
    fn repr(&self) -> String {
        let mut out = format!("{}({}", self.name(), self.extra_repr());
        let children = self.named_children();
        if children.is_empty() {
            out.push(')');
            return out;
        }
        out.push('\n');
        for (name, child) in children {
            let child_repr = child.repr().replace('\n', "\n  ");
            out.push_str(&format!("  ({name}): {child_repr}\n"));
        }
        out.push(')');
        out
    }
}

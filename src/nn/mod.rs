/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 负责神经网络（neural network）模块体系的构建
 *
 * - module：Module trait 与注册表 ModuleCore
 * - parameter / state_dict：可训练参数与持久化格式
 * - layer：内置层与容器
 * - criterion / optimizer / trainer：训练所需的损失、优化器和训练循环
 */

mod criterion;
mod descriptor;
mod error;
mod forward_cache;
mod grad_mode;
pub mod layer;
mod model_io;
mod module;
pub mod optimizer;
mod parameter;
mod state_dict;
mod trainer;

pub use criterion::{MseLoss, Reduction};
pub use descriptor::{ChildDescriptor, ModuleDescriptor, TensorDescriptor};
pub use error::ModuleError;
pub use forward_cache::ForwardCache;
pub use grad_mode::{NoGradGuard, is_grad_enabled, no_grad};
pub use layer::{BatchNorm1d, Dropout, Linear, ReLU, Residual, Sequential, Sigmoid, Tanh};
pub use model_io::{describe, load_model, save_model};
pub use module::{BufferId, ChildId, Module, ModuleCore, ParamId};
pub use optimizer::{Adam, Optimizer, SGD};
pub use parameter::Parameter;
pub use state_dict::{IncompatibleKeys, StateDict};
pub use trainer::{TrainHistory, Trainer};

#[cfg(test)]
mod tests;

//! # Only Module
//!
//! `only_module`用纯rust实现了一个类似[pytorch](https://pytorch.org)`torch.nn.Module`的模块体系：
//! 模块以树的形式组合，树中的每个可训练参数都有唯一的、以`.`连接的全限定名，
//! 训练/评估模式可一次性广播到整棵树，参数和缓冲区可以按名称保存、加载。
//!
//! ```ignore
//! use only_module::nn::{Linear, Module, ReLU, Sequential};
//!
//! let mut model = Sequential::new()
//!     .add(Linear::new(3, 8)?)?
//!     .add(ReLU::new())?
//!     .add(Linear::new(8, 1)?)?;
//! for (name, param) in model.named_parameters() {
//!     println!("{name}: {:?}", param.shape()); // 0.weight: [8, 3] ...
//! }
//! ```

pub mod config;
pub mod errors;
pub mod nn;
pub mod tensor;

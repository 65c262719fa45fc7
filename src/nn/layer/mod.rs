/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : Layer 模块 - 内置的叶子模块与组合模块
 *
 * - 叶子模块：直接持有参数/缓冲区（Linear、BatchNorm1d）或无参数（激活函数、Dropout）
 * - 组合模块：前向计算完全由子模块决定（Sequential），或自定义组合方式（Residual）
 */

mod activation;
mod batch_norm;
mod dropout;
mod linear;
mod residual;
mod sequential;

pub use activation::{ReLU, Sigmoid, Tanh};
pub use batch_norm::BatchNorm1d;
pub use dropout::Dropout;
pub use linear::Linear;
pub use residual::Residual;
pub use sequential::Sequential;

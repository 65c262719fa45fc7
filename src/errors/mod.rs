/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 张量层面的错误类型。模块层面的错误见`crate::nn::ModuleError`
 */

use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不兼容，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },

    #[error("数据长度{data_len}与形状{shape:?}所需的元素个数不一致")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },

    #[error("{operator}只接受{expected}阶张量，但输入的张量为{got}阶")]
    DimensionMismatch {
        operator: Operator,
        expected: usize,
        got: usize,
    },

    #[error("张量列表为空")]
    EmptyList,

    #[error("轴{axis}超出了张量的维数{dimension}")]
    AxisOutOfRange { axis: usize, dimension: usize },

    #[error("区间[{start}, {end})超出了轴{axis}的长度{len}")]
    RangeOutOfBounds {
        axis: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 与形状相关的运算：转置、拼接、截取、原地赋值
 */

use super::Tensor;
use crate::errors::{Operator, TensorError};
use ndarray::{Axis, Slice};

impl Tensor {
    /// 矩阵转置，只接受2阶张量
    pub fn transpose(&self) -> Result<Self, TensorError> {
        if self.dimension() != 2 {
            return Err(TensorError::DimensionMismatch {
                operator: Operator::Transpose,
                expected: 2,
                got: self.dimension(),
            });
        }
        Ok(Self::from_array(
            self.data.t().as_standard_layout().into_owned(),
        ))
    }

    /// 沿`axis`拼接多个张量，除`axis`外其余维度须一致
    pub fn concat(tensors: &[&Self], axis: usize) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        if axis >= first.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                dimension: first.dimension(),
            });
        }
        for tensor in &tensors[1..] {
            let compatible = tensor.dimension() == first.dimension()
                && tensor
                    .shape()
                    .iter()
                    .zip(first.shape())
                    .enumerate()
                    .all(|(i, (a, b))| i == axis || a == b);
            if !compatible {
                return Err(TensorError::OperatorError {
                    operator: Operator::Concat,
                    tensor1_shape: first.shape().to_vec(),
                    tensor2_shape: tensor.shape().to_vec(),
                });
            }
        }

        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data = ndarray::concatenate(Axis(axis), &views).map_err(|_| {
            TensorError::OperatorError {
                operator: Operator::Concat,
                tensor1_shape: first.shape().to_vec(),
                tensor2_shape: tensors[tensors.len() - 1].shape().to_vec(),
            }
        })?;
        Ok(Self::from_array(data))
    }

    /// 沿`axis`截取`[start, start + len)`部分，是`concat`的逆操作
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self, TensorError> {
        if axis >= self.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                dimension: self.dimension(),
            });
        }
        let axis_len = self.shape()[axis];
        if start + len > axis_len {
            return Err(TensorError::RangeOutOfBounds {
                axis,
                start,
                end: start + len,
                len: axis_len,
            });
        }
        let sliced = self
            .data
            .slice_axis(Axis(axis), Slice::from(start..start + len))
            .to_owned();
        Ok(Self::from_array(sliced))
    }

    /// 用`other`的数值原地覆盖自身，形状须严格一致（不做广播）
    pub fn copy_from(&mut self, other: &Self) -> Result<(), TensorError> {
        if !self.is_same_shape(other) {
            return Err(TensorError::OperatorError {
                operator: Operator::Assign,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            });
        }
        self.data.assign(&other.data);
        Ok(())
    }
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 张量的逐元素四则运算。
 *                 1. 张量与纯数：通过运算符（`+ - *`、取负）完成，不会失败；
 *                 2. 张量与张量：通过`try_*`方法完成，支持 NumPy 风格的广播，
 *                    形状不兼容时返回`TensorError`而不是panic。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::{IxDyn, Zip};
use std::ops::{Add, Mul, Neg, Sub};

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓张量（不）带引用 与 f32↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl Add<f32> for &Tensor {
    type Output = Tensor;

    fn add(self, scalar: f32) -> Tensor {
        Tensor::from_array(&self.data + scalar)
    }
}
impl Add<f32> for Tensor {
    type Output = Self;

    fn add(self, scalar: f32) -> Self {
        Self::from_array(self.data + scalar)
    }
}

impl Sub<f32> for &Tensor {
    type Output = Tensor;

    fn sub(self, scalar: f32) -> Tensor {
        Tensor::from_array(&self.data - scalar)
    }
}
impl Sub<f32> for Tensor {
    type Output = Self;

    fn sub(self, scalar: f32) -> Self {
        Self::from_array(self.data - scalar)
    }
}

impl Mul<f32> for &Tensor {
    type Output = Tensor;

    fn mul(self, scalar: f32) -> Tensor {
        Tensor::from_array(&self.data * scalar)
    }
}
impl Mul<f32> for Tensor {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self::from_array(self.data * scalar)
    }
}
impl Mul<&Tensor> for f32 {
    type Output = Tensor;

    fn mul(self, tensor: &Tensor) -> Tensor {
        tensor * self
    }
}

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor::from_array(-&self.data)
    }
}
impl Neg for Tensor {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_array(-self.data)
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑张量（不）带引用 与 f32↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

impl Tensor {
    pub fn try_add(&self, other: &Self) -> Result<Self, TensorError> {
        self.broadcast_with(other, Operator::Add, |a, b| a + b)
    }

    pub fn try_sub(&self, other: &Self) -> Result<Self, TensorError> {
        self.broadcast_with(other, Operator::Sub, |a, b| a - b)
    }

    pub fn try_mul(&self, other: &Self) -> Result<Self, TensorError> {
        self.broadcast_with(other, Operator::Mul, |a, b| a * b)
    }

    /// 除数中的零元素按 IEEE 754 规则得到`inf`/`NaN`，不额外报错
    pub fn try_div(&self, other: &Self) -> Result<Self, TensorError> {
        self.broadcast_with(other, Operator::Div, |a, b| a / b)
    }

    /// 判断两个张量能否按 NumPy 规则广播
    pub fn can_broadcast_with(&self, other: &Self) -> bool {
        broadcast_shape(self.shape(), other.shape()).is_some()
    }

    fn broadcast_with<F>(&self, other: &Self, operator: Operator, f: F) -> Result<Self, TensorError>
    where
        F: Fn(f32, f32) -> f32,
    {
        let error = || TensorError::OperatorError {
            operator,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        let shape = broadcast_shape(self.shape(), other.shape()).ok_or_else(error)?;
        let lhs = self.data.broadcast(IxDyn(&shape)).ok_or_else(error)?;
        let rhs = other.data.broadcast(IxDyn(&shape)).ok_or_else(error)?;
        let data = Zip::from(&lhs).and(&rhs).map_collect(|&a, &b| f(a, b));
        Ok(Self::from_array(data))
    }
}

/// 广播规则：从右向左对齐维度，每个维度须相等或其中之一为1，
/// 维数不同时较短的形状在前面补1
fn broadcast_shape(shape_1: &[usize], shape_2: &[usize]) -> Option<Vec<usize>> {
    let ndim = shape_1.len().max(shape_2.len());
    let mut result = vec![0; ndim];
    for i in 0..ndim {
        let d1 = dim_from_right(shape_1, ndim, i);
        let d2 = dim_from_right(shape_2, ndim, i);
        result[i] = match (d1, d2) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => return None,
        };
    }
    Some(result)
}

fn dim_from_right(shape: &[usize], ndim: usize, i: usize) -> usize {
    let offset = ndim - shape.len();
    if i < offset { 1 } else { shape[i - offset] }
}

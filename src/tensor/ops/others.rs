use crate::tensor::Tensor;
use approx::AbsDiffEq;
use ndarray::Axis;
use std::fmt;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Self::new(&[scalar], &[1])
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl AbsDiffEq for Tensor {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    /// 形状不同直接视为不相等
    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.is_same_shape(other)
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

impl Tensor {
    /// 对张量中的所有元素求和并返回一个形状为[1]的标量。
    pub fn sum(&self) -> Self {
        Self::from(self.data.sum())
    }

    /// 所有元素的均值，形状为[1]；空张量的均值为`NaN`
    pub fn mean(&self) -> Self {
        Self::from(self.data.sum() / self.size() as f32)
    }

    /// 沿第0维（通常是batch维）求和，结果的阶数减一。如[4, 2] -> [2]
    ///
    /// # Panics
    /// 张量为0阶时
    pub fn sum_axis_0(&self) -> Self {
        Self::from_array(self.data.sum_axis(Axis(0)))
    }

    /// 沿第0维求均值，结果的阶数减一
    ///
    /// # Panics
    /// 张量为0阶时
    pub fn mean_axis_0(&self) -> Self {
        let n = self.shape()[0] as f32;
        Self::from_array(self.data.sum_axis(Axis(0)) / n)
    }

    /// 对每个元素应用`f`
    pub fn map<F: FnMut(f32) -> f32>(&self, f: F) -> Self {
        Self::from_array(self.data.mapv(f))
    }
}

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::Ix2;

impl Tensor {
    /// 实现矩阵乘法。只接受2阶张量，
    /// 且前一个张量的列数（col）须等于后一个张量的行数（row），否则返回错误。
    pub fn mat_mul(&self, other: &Self) -> Result<Self, TensorError> {
        for tensor in [self, other] {
            if tensor.dimension() != 2 {
                return Err(TensorError::DimensionMismatch {
                    operator: Operator::MatMul,
                    expected: 2,
                    got: tensor.dimension(),
                });
            }
        }
        let error = || TensorError::OperatorError {
            operator: Operator::MatMul,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        if self.shape()[1] != other.shape()[0] {
            return Err(error());
        }
        // 将动态维度数组转换为常量维度数组
        let lhs = self
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| error())?;
        let rhs = other
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| error())?;
        Ok(Self::from_array(lhs.dot(&rhs).into_dyn()))
    }
}

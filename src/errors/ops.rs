use std::fmt::{self, Display};

/// 会因形状问题而失败的张量运算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    MatMul,
    Transpose,
    Concat,
    Narrow,
    Assign,
}
impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation_name = match self {
            Self::Add => "相加",
            Self::Sub => "相减",
            Self::Mul => "相乘",
            Self::Div => "相除",
            Self::MatMul => "矩阵乘法",
            Self::Transpose => "转置",
            Self::Concat => "拼接",
            Self::Narrow => "截取",
            Self::Assign => "赋值",
        };
        write!(f, "{operation_name}")
    }
}

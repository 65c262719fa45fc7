/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 模块体系的错误类型
 *
 * 底层张量运算的错误（形状不兼容等）原样包装在`Tensor`变体中向上传递，不做任何恢复。
 */

use crate::errors::TensorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModuleError {
    #[error(transparent)]
    Tensor(#[from] TensorError),

    #[error("名称`{0}`已在该模块中注册过")]
    DuplicateName(String),

    #[error("非法的名称`{0}`：名称不能为空，也不能包含`.`")]
    InvalidName(String),

    #[error("状态字典的键与模块不匹配：缺失{missing:?}，多余{unexpected:?}")]
    KeyMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("`{name}`的形状不匹配：期望{expected:?}，实际为{got:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("{0}在反向传播前没有执行过需要梯度的前向传播")]
    MissingForwardCache(String),

    #[error("非法的配置：{0}")]
    InvalidConfig(String),

    #[error("无效的参数文件：{0}")]
    InvalidFile(String),

    #[error("读写文件失败：{0}")]
    Io(#[from] std::io::Error),

    #[error("二进制（反）序列化失败：{0}")]
    Bincode(#[from] bincode::Error),

    #[error("JSON（反）序列化失败：{0}")]
    Json(#[from] serde_json::Error),
}

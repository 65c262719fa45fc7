/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 模块描述符（Module Descriptor）
 *                 模块树结构的可读中间表示，用于模型保存和调试输出
 */

use serde::{Deserialize, Serialize};

/// 模块树的可序列化描述（只含结构和形状，不含数值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// 格式版本（用于向后兼容），仅根模块填写
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// 模块类型名，如`Linear`
    pub module_type: String,
    /// 类型特定的配置信息，同`Module::extra_repr`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra_repr: String,
    pub training: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TensorDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<TensorDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildDescriptor>,
    /// 参数文件路径（相对于 JSON 文件），仅在保存完整模型时使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_file: Option<String>,
}

/// 参数或缓冲区的描述（局部名称）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorDescriptor {
    pub name: String,
    pub shape: Vec<usize>,
    /// 仅参数有意义
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_grad: Option<bool>,
}

/// 子模块描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildDescriptor {
    pub name: String,
    pub module: ModuleDescriptor,
}

impl ModuleDescriptor {
    pub fn new(module_type: &str, training: bool) -> Self {
        Self {
            version: None,
            module_type: module_type.to_string(),
            extra_repr: String::new(),
            training,
            parameters: Vec::new(),
            buffers: Vec::new(),
            children: Vec::new(),
            params_file: None,
        }
    }

    /// 整棵子树的参数元素总数
    pub fn total_params(&self) -> usize {
        let own = self
            .parameters
            .iter()
            .map(|p| p.shape.iter().product::<usize>())
            .sum::<usize>();
        own + self
            .children
            .iter()
            .map(|c| c.module.total_params())
            .sum::<usize>()
    }

    /// 结构是否一致：类型、参数/缓冲区的名称和形状、子模块，忽略版本、模式和文件信息
    pub fn same_structure(&self, other: &Self) -> bool {
        let tensors_match = |a: &[TensorDescriptor], b: &[TensorDescriptor]| {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(x, y)| x.name == y.name && x.shape == y.shape)
        };
        self.module_type == other.module_type
            && tensors_match(&self.parameters, &other.parameters)
            && tensors_match(&self.buffers, &other.buffers)
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(x, y)| x.name == y.name && x.module.same_structure(&y.module))
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

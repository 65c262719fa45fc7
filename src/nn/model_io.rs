/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 高层模型 I/O（describe/save_model/load_model）
 *
 * 职责：完整模型的保存/加载（结构 JSON + 参数 bin）
 * 依赖：ModuleDescriptor + StateDict::save()/load()
 *
 * 与 state_dict.rs 的区别：
 * - state_dict.rs：底层二进制序列化（只处理张量的原始读写）
 * - model_io.rs：生成/解析 ModuleDescriptor，并调用底层序列化
 */

use super::descriptor::{ChildDescriptor, ModuleDescriptor, TensorDescriptor};
use super::{Module, ModuleError, StateDict};
use std::path::Path;

/// 生成模块树的描述符
pub fn describe(module: &dyn Module) -> ModuleDescriptor {
    let mut descriptor = describe_node(module);
    descriptor.version = Some(env!("CARGO_PKG_VERSION").to_string());
    descriptor
}

fn describe_node(module: &dyn Module) -> ModuleDescriptor {
    let core = module.core();
    let mut descriptor = ModuleDescriptor::new(module.name(), module.is_training());
    descriptor.extra_repr = module.extra_repr();
    descriptor.parameters = core
        .local_parameters()
        .map(|(name, param)| TensorDescriptor {
            name: name.to_string(),
            shape: param.shape().to_vec(),
            requires_grad: Some(param.requires_grad()),
        })
        .collect();
    descriptor.buffers = core
        .local_buffers()
        .map(|(name, buffer)| TensorDescriptor {
            name: name.to_string(),
            shape: buffer.shape().to_vec(),
            requires_grad: None,
        })
        .collect();
    descriptor.children = core
        .children()
        .map(|(name, child)| ChildDescriptor {
            name: name.to_string(),
            module: describe_node(child),
        })
        .collect();
    descriptor
}

/// 保存完整模型（结构 JSON + 参数 bin）
///
/// 自动生成两个文件：
/// - `{path}.json`: 模块树的结构描述（可读）
/// - `{path}.bin`: 状态字典（紧凑）
///
/// # 示例
/// ```ignore
/// save_model(&model, "models/mlp")?;
/// // 生成：models/mlp.json + models/mlp.bin
/// ```
pub fn save_model<P: AsRef<Path>>(module: &dyn Module, path: P) -> Result<(), ModuleError> {
    let path = path.as_ref();
    let json_path = path.with_extension("json");
    let bin_path = path.with_extension("bin");

    // 1. 保存状态字典到 bin 文件
    module.state_dict().save(&bin_path)?;

    // 2. 生成描述符并设置 params_file
    let mut descriptor = describe(module);
    descriptor.params_file = Some(bin_path.file_name().map_or_else(
        || "params.bin".to_string(),
        |s| s.to_string_lossy().to_string(),
    ));

    // 3. 保存 JSON
    std::fs::write(&json_path, descriptor.to_json()?)?;
    log::info!(
        "模型已保存：{}（{}个参数元素）",
        json_path.display(),
        descriptor.total_params()
    );
    Ok(())
}

/// 加载模型参数（需要先用代码构建相同结构的模块）
///
/// 描述符中的结构须与`module`一致，随后严格加载状态字典；任何一步失败时模块保持原样。
///
/// # 示例
/// ```ignore
/// let mut model = build_mlp()?;
/// load_model(&mut model, "models/mlp")?;
/// ```
pub fn load_model<P: AsRef<Path>>(module: &mut dyn Module, path: P) -> Result<(), ModuleError> {
    let path = path.as_ref();
    let json_path = path.with_extension("json");

    // 1. 读取并解析 JSON
    let json = std::fs::read_to_string(&json_path)?;
    let descriptor = ModuleDescriptor::from_json(&json)?;
    if !descriptor.same_structure(&describe(module)) {
        return Err(ModuleError::InvalidFile(format!(
            "{}描述的模块结构与当前模型不一致",
            json_path.display()
        )));
    }

    // 2. 确定参数文件路径
    let bin_path = if let Some(ref params_file) = descriptor.params_file {
        path.parent().map_or_else(
            || Path::new(params_file).to_path_buf(),
            |p| p.join(params_file),
        )
    } else {
        path.with_extension("bin")
    };

    // 3. 加载参数
    let state = StateDict::load(&bin_path)?;
    module.load_state_dict(&state)?;
    log::info!("模型已从{}加载", json_path.display());
    Ok(())
}

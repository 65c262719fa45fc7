/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 训练配置
 *
 * 可直接在代码中构造，也可从 JSON 读取，缺省字段取默认值：
 * ```json
 * { "epochs": 500, "learning_rate": 0.05, "log_every": 50, "seed": 42 }
 * ```
 */

use crate::nn::ModuleError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// 训练轮数
    pub epochs: usize,
    pub learning_rate: f32,
    /// 每隔多少轮打印一次损失
    pub log_every: usize,
    /// 参数初始化和 Dropout 使用的随机种子，`None`表示不固定
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            learning_rate: 0.01,
            log_every: 10,
            seed: None,
        }
    }
}

impl TrainConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ModuleError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModuleError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ModuleError> {
        if self.epochs == 0 {
            return Err(ModuleError::InvalidConfig("epochs 须大于0".to_string()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0. {
            return Err(ModuleError::InvalidConfig(format!(
                "学习率须为正的有限数，实际为{}",
                self.learning_rate
            )));
        }
        if self.log_every == 0 {
            return Err(ModuleError::InvalidConfig("log_every 须大于0".to_string()));
        }
        Ok(())
    }
}

/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 状态字典：全限定名 -> 张量 的有序映射，是模块持久化的唯一格式
 *
 * 文件格式：4字节魔数 + 4字节小端版本号 + bincode 编码的有序条目
 */

use super::ModuleError;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// 有序的状态字典，迭代顺序即插入顺序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDict {
    entries: Vec<(String, Tensor)>,
}

/// 非严格加载时的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncompatibleKeys {
    /// 模块中有、但状态字典中没有的键
    pub missing_keys: Vec<String>,
    /// 状态字典中有、但模块中没有的键
    pub unexpected_keys: Vec<String>,
}

impl IncompatibleKeys {
    pub fn is_empty(&self) -> bool {
        self.missing_keys.is_empty() && self.unexpected_keys.is_empty()
    }
}

impl StateDict {
    /// 文件魔数
    const MAGIC: &'static [u8; 4] = b"OMSD";
    /// 文件版本
    const VERSION: u32 = 1;

    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 插入条目。键已存在时原位替换并返回旧值，否则追加到末尾
    pub fn insert(&mut self, name: impl Into<String>, tensor: Tensor) -> Option<Tensor> {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, tensor)),
            None => {
                self.entries.push((name, tensor));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, tensor)| tensor)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tensor> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, tensor)| tensor)
    }

    pub fn remove(&mut self, name: &str) -> Option<Tensor> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.entries
            .iter()
            .map(|(key, tensor)| (key.as_str(), tensor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ========== 保存/加载 ==========

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModuleError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        writer.write_all(Self::MAGIC)?;
        writer.write_all(&Self::VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut writer, &self.entries)?;
        writer.flush()?;
        log::debug!(
            "已保存{}个条目到{}",
            self.entries.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModuleError> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| ModuleError::InvalidFile(format!("读取魔数失败: {e}")))?;
        if &magic != Self::MAGIC {
            return Err(ModuleError::InvalidFile(
                "这不是状态字典文件，请使用`StateDict::save`保存的文件".to_string(),
            ));
        }

        let mut version_bytes = [0u8; 4];
        reader
            .read_exact(&mut version_bytes)
            .map_err(|e| ModuleError::InvalidFile(format!("读取版本失败: {e}")))?;
        let version = u32::from_le_bytes(version_bytes);
        if version != Self::VERSION {
            return Err(ModuleError::InvalidFile(format!(
                "不支持的文件版本: {version}"
            )));
        }

        let entries: Vec<(String, Tensor)> = bincode::deserialize_from(&mut reader)?;
        Ok(Self { entries })
    }
}

impl FromIterator<(String, Tensor)> for StateDict {
    /// 重复的键以后出现的为准，位置保持首次出现处
    fn from_iter<I: IntoIterator<Item = (String, Tensor)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (name, tensor) in iter {
            dict.insert(name, tensor);
        }
        dict
    }
}

impl IntoIterator for StateDict {
    type Item = (String, Tensor);
    type IntoIter = std::vec::IntoIter<(String, Tensor)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

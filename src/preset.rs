//! 风格预设存储模块
//!
//! # 设计思路
//!
//! 用户可以把一组风格选项保存为命名预设，之后一键恢复。
//! 数据量很小，直接用单个 JSON 文件承载：顶层对象以预设名为键。
//!
//! # 实现思路
//!
//! - 每次操作都重新读取文件，写入时整体覆盖，不做内存缓存。
//! - 文件不存在视为空存储；文件损坏时记录警告并按空存储处理。
//! - 更新已有预设时保留 `created_at`，只刷新 `updated_at`。
//! - 时间戳使用 RFC 3339（`chrono`）。

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::prompt::StylePreferences;

/// 预设存储错误。
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("预设文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("预设序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("预设名称无效: {0}")]
    InvalidName(String),

    #[error("预设不存在: {0}")]
    NotFound(String),
}

/// 单条预设记录（落盘格式）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRecord {
    pub name: String,
    pub data: StylePreferences,
    pub created_at: String,
    pub updated_at: String,
}

/// 预设元信息（不含数据本体）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetInfo {
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

type PresetMap = BTreeMap<String, PresetRecord>;

/// 基于 JSON 文件的预设存储。
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 默认存储位置：`data/configs/saved_configs.json`。
    pub fn default_path() -> PathBuf {
        Path::new("data").join("configs").join("saved_configs.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存预设（新建或覆盖），返回写入后的记录。
    pub fn save(&self, name: &str, data: StylePreferences) -> Result<PresetRecord, PresetError> {
        let name = normalize_name(name)?;
        let mut presets = self.load_all();
        let now = Local::now().to_rfc3339();

        let created_at = presets
            .get(&name)
            .map(|existing| existing.created_at.clone())
            .unwrap_or_else(|| now.clone());

        let record = PresetRecord {
            name: name.clone(),
            data,
            created_at,
            updated_at: now,
        };
        presets.insert(name.clone(), record.clone());
        self.write_all(&presets)?;

        log::info!("💾 已保存风格预设: {}", name);
        Ok(record)
    }

    /// 读取预设数据。
    pub fn load(&self, name: &str) -> Result<StylePreferences, PresetError> {
        let name = normalize_name(name)?;
        self.load_all()
            .remove(&name)
            .map(|record| record.data)
            .ok_or(PresetError::NotFound(name))
    }

    /// 按名称排序返回所有预设名。
    pub fn list_names(&self) -> Vec<String> {
        self.load_all().into_keys().collect()
    }

    pub fn info(&self, name: &str) -> Result<PresetInfo, PresetError> {
        let name = normalize_name(name)?;
        self.load_all()
            .remove(&name)
            .map(|record| PresetInfo {
                name: record.name,
                created_at: record.created_at,
                updated_at: record.updated_at,
            })
            .ok_or(PresetError::NotFound(name))
    }

    /// 删除预设。返回是否确实删除了记录。
    pub fn delete(&self, name: &str) -> Result<bool, PresetError> {
        let name = normalize_name(name)?;
        let mut presets = self.load_all();
        if presets.remove(&name).is_none() {
            return Ok(false);
        }

        self.write_all(&presets)?;
        log::info!("🗑️ 已删除风格预设: {}", name);
        Ok(true)
    }

    fn load_all(&self) -> PresetMap {
        if !self.path.exists() {
            return PresetMap::new();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("⚠️ 读取预设文件失败，按空存储处理: {}", e);
                return PresetMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(presets) => presets,
            Err(e) => {
                log::warn!(
                    "⚠️ 预设文件格式异常，按空存储处理: {} ({})",
                    self.path.display(),
                    e
                );
                PresetMap::new()
            }
        }
    }

    fn write_all(&self, presets: &PresetMap) -> Result<(), PresetError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(presets)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

fn normalize_name(name: &str) -> Result<String, PresetError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PresetError::InvalidName("名称不能为空".to_string()));
    }
    Ok(trimmed.to_string())
}

//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义 crate 边界上的统一 `AppError` 枚举，各子模块保留自己的细分错误
//! （`ImageError` / `PresetError` / `GenerationError`），在边界处通过 `#[from]` 上转。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为子模块错误提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于前端或 JSON 日志直接展示。

use serde::Serialize;

use crate::generation::GenerationError;
use crate::image_handler::ImageError;
use crate::preset::PresetError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片处理流水线错误（加载 / 解码 / 裁剪 / 拼接 / 编码）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 风格预设读写失败
    #[error("{0}")]
    Preset(#[from] PresetError),

    /// 远程生成失败
    #[error("{0}")]
    Generation(#[from] GenerationError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 存储目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 命令行参数错误
    #[error("参数错误: {0}")]
    Usage(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

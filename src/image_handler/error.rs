//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图片链路（加载 → 解码 → 裁剪 → 拼接 → 编码）中的所有错误来源，
//! 避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! `code()` / `stage()` 提供稳定的机器可读标识，供上层把失败翻译成面向用户的提示文案。

/// 图片处理统一错误类型。
///
/// 该类型会在 crate 边界被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// 前景定位在搜索半径内没有找到任何不透明像素。
    #[error("未找到内容：{0}")]
    NoContentFound(String),

    /// 拼接批次中某一帧无法加载。
    #[error("第 {index} 帧加载失败：{reason}")]
    FrameLoad { index: usize, reason: String },

    /// 缩放或拼接因结构性原因失败（空输入、零尺寸帧等）。
    #[error("精灵图拼接失败：{0}")]
    Combine(String),

    #[error("编码错误：{0}")]
    Encode(String),
}

impl ImageError {
    /// 稳定错误码，便于前端或日志聚合按类型统计。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "E_DECODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::NoContentFound(_) => "E_NO_CONTENT",
            Self::FrameLoad { .. } => "E_FRAME_LOAD",
            Self::Combine(_) => "E_COMBINE",
            Self::Encode(_) => "E_ENCODE",
        }
    }

    /// 出错所在的处理阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileSystem(_) | Self::ResourceLimit(_) => "load",
            Self::Decode(_) | Self::InvalidFormat(_) => "decode",
            Self::NoContentFound(_) => "crop",
            Self::FrameLoad { .. } | Self::Combine(_) => "combine",
            Self::Encode(_) => "encode",
        }
    }
}

impl From<ImageError> for String {
    /// 兼容部分仍使用字符串错误的调用点。
    fn from(error: ImageError) -> Self {
        error.to_string()
    }
}

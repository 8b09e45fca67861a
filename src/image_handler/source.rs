//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示外部来源语义（有限集合，穷尽匹配）
//! - `RawImageData` 表示已加载但未解码的字节
//!
//! 解码之后，核心算法只接触一种规范化类型 `DynamicImage`。

use std::path::PathBuf;

use image::DynamicImage;

/// 图片输入来源。
pub enum ImageSource {
    /// 本地文件路径来源。
    FilePath(PathBuf),
    /// 内存中的已编码字节（PNG 等）。
    Bytes(Vec<u8>),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
    /// 行优先排列的原始像素数组。
    Pixels {
        width: u32,
        height: u32,
        /// 1（灰度）、3（RGB）或 4（RGBA）。
        channels: u8,
        data: Vec<u8>,
    },
    /// 已解码图像，直接透传。
    Decoded(DynamicImage),
}

impl ImageSource {
    /// 来源提示（用于日志与诊断）。
    pub fn hint(&self) -> &'static str {
        match self {
            Self::FilePath(_) => "file",
            Self::Bytes(_) => "bytes",
            Self::Base64(_) => "base64",
            Self::Pixels { .. } => "pixels",
            Self::Decoded(_) => "decoded",
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::FilePath(path)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        Self::Decoded(image)
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

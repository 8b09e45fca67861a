//! # 远程生成模块（generation）
//!
//! ## 设计思路
//!
//! 远程图像生成服务只通过 `AssetGenerator` trait 接入：
//! - `client`：基于 HTTP 的 Gemini 实现
//! - `runner`：逐帧顺序调用，汇总部分成功结果并在全部成功时拼接精灵图
//! - `frames`：内置的攻击 / 跳跃 / 死亡帧提示词
//! - `assets`：角色 / 背景 / 道具 / 多动作精灵等单资源流程，结果按分类落盘
//!
//! ## 实现思路
//!
//! 上层流程只依赖 trait，测试时可以换成脚本化的假生成器，不需要真实网络。
//! 配额耗尽（HTTP 429 / `RESOURCE_EXHAUSTED`）单独成为 `GenerationError::Quota`，
//! 调用方据此立即停止后续请求。

mod assets;
mod client;
mod frames;
mod runner;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

use image::DynamicImage;

use crate::image_handler::ImageError;

pub use assets::{AssetService, SavedAsset, SavedSequence, SpriteAsset};
pub use client::{GeminiClient, GeminiConfig};
pub use frames::{ActionSet, FramePrompt};
pub use runner::{FrameSequenceRunner, GeneratedFrame, SequenceReport, SequenceStatus};

/// 单次生成请求：文本提示词 + 可选参考图。
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub references: Vec<DynamicImage>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, reference: DynamicImage) -> Self {
        self.references.push(reference);
        self
    }
}

/// 生成结果。
#[derive(Debug, Clone)]
pub enum GeneratedMedia {
    Image(DynamicImage),
    /// 视频字节原样透传，不在本 crate 内解码。
    Video(Vec<u8>),
}

impl GeneratedMedia {
    pub fn into_image(self) -> Result<DynamicImage, GenerationError> {
        match self {
            Self::Image(image) => Ok(image),
            Self::Video(bytes) => Err(GenerationError::EmptyResponse(format!(
                "期望图片，实际返回视频（{} 字节）",
                bytes.len()
            ))),
        }
    }
}

/// 远程生成错误。
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// 配额耗尽，后续请求同样会失败。
    #[error("生成配额已耗尽: {0}")]
    Quota(String),

    #[error("网络请求失败: {0}")]
    Network(String),

    #[error("生成服务返回错误（HTTP {status}）: {message}")]
    Api { status: u16, message: String },

    #[error("生成结果中没有可用内容: {0}")]
    EmptyResponse(String),

    #[error("生成配置无效: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl GenerationError {
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Quota(_))
    }

    /// 从错误文本识别配额耗尽。
    pub(crate) fn mentions_quota(message: &str) -> bool {
        message.contains("429") || message.contains("RESOURCE_EXHAUSTED")
    }
}

/// 远程资源生成器。
pub trait AssetGenerator: Send + Sync {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<GeneratedMedia, GenerationError>> + Send;
}

impl<G: AssetGenerator> AssetGenerator for &G {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<GeneratedMedia, GenerationError>> + Send {
        (**self).generate(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_markers_are_recognized() {
        assert!(GenerationError::mentions_quota("HTTP 429 Too Many Requests"));
        assert!(GenerationError::mentions_quota("{\"status\": \"RESOURCE_EXHAUSTED\"}"));
        assert!(!GenerationError::mentions_quota("INVALID_ARGUMENT"));
    }

    #[test]
    fn video_is_not_an_image() {
        let result = GeneratedMedia::Video(vec![0; 4]).into_image();
        assert!(matches!(result, Err(GenerationError::EmptyResponse(_))));
    }
}

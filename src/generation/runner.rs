//! # 逐帧生成编排
//!
//! ## 设计思路
//!
//! 远程服务的配额模型不接受并发突发请求，因此严格顺序调用，两次请求之间固定间隔。
//! 已发出的请求不会被中途取消；配额耗尽时立即停止后续帧。
//!
//! ## 实现思路
//!
//! 1. 可选：把参考图作为第 0 帧放在结果最前面
//! 2. 逐帧请求，单帧失败记录后继续
//! 3. 只有全部请求帧都成功时才拼接精灵图；拼接失败不影响已生成的帧

use std::path::PathBuf;
use std::time::Duration;

use image::{DynamicImage, RgbImage};

use super::{AssetGenerator, FramePrompt, GeminiConfig, GenerationError, GenerationRequest};
use crate::image_handler::ImageError;
use crate::sprite::{self, SheetOptions};
use crate::storage::{AssetKind, OutputLayout};

/// 参考图作为首帧时使用的名称。
pub const REFERENCE_FRAME_NAME: &str = "reference";

/// 已生成的单帧。
#[derive(Debug, Clone)]
pub struct GeneratedFrame {
    pub name: String,
    pub image: DynamicImage,
}

/// 整体结果状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceStatus {
    /// 所有帧成功且精灵图已拼接。
    Complete,
    /// 所有帧成功，但拼接失败。
    SheetFailed(String),
    /// 部分帧失败，未拼接。
    Partial { generated: usize, requested: usize },
    /// 没有任何帧生成成功。
    Failed,
}

impl SequenceStatus {
    /// 面向用户的一行摘要。
    pub fn summary(&self, requested: usize) -> String {
        match self {
            Self::Complete => format!("✅ 已生成 {} 帧并拼接精灵图", requested),
            Self::SheetFailed(reason) => {
                format!("✅ 已生成 {} 帧（精灵图拼接失败：{}）", requested, reason)
            }
            Self::Partial { generated, requested } => {
                format!("⚠️ 已生成 {}/{} 帧，部分帧失败", generated, requested)
            }
            Self::Failed => "❌ 没有生成任何帧".to_string(),
        }
    }
}

/// 逐帧生成结果。
#[derive(Debug)]
pub struct SequenceReport {
    /// 按顺序排列的帧（含可选的参考首帧）。
    pub frames: Vec<GeneratedFrame>,
    pub sheet: Option<RgbImage>,
    pub status: SequenceStatus,
    /// 失败帧名称与原因。
    pub failures: Vec<(String, GenerationError)>,
}

impl SequenceReport {
    /// 将所有帧与精灵图保存到 `characters` 目录，返回写入路径（按帧顺序，精灵图最后）。
    pub fn save(&self, layout: &OutputLayout, action: &str) -> Result<Vec<PathBuf>, ImageError> {
        let mut paths = Vec::with_capacity(self.frames.len() + 1);

        for frame in &self.frames {
            let prefix = format!("{}_{}", action, frame.name);
            paths.push(layout.save(AssetKind::Character, &prefix, &frame.image)?);
        }

        if let Some(sheet) = &self.sheet {
            let prefix = format!("{}_combined", action);
            let sheet = DynamicImage::ImageRgb8(sheet.clone());
            paths.push(layout.save(AssetKind::Character, &prefix, &sheet)?);
        }

        Ok(paths)
    }
}

/// 顺序逐帧生成器。
pub struct FrameSequenceRunner<G> {
    generator: G,
    delay: Duration,
    prepend_reference: bool,
    sheet_options: SheetOptions,
}

impl<G: AssetGenerator> FrameSequenceRunner<G> {
    pub fn new(generator: G, delay: Duration) -> Self {
        Self {
            generator,
            delay,
            prepend_reference: true,
            sheet_options: SheetOptions::default(),
        }
    }

    /// 使用 `GeminiConfig::frame_delay` 作为请求间隔。
    pub fn with_config(generator: G, config: &GeminiConfig) -> Self {
        Self::new(generator, config.frame_delay)
    }

    /// 是否把参考图作为首帧放入结果与精灵图。
    pub fn prepend_reference(mut self, enabled: bool) -> Self {
        self.prepend_reference = enabled;
        self
    }

    pub fn sheet_options(mut self, options: SheetOptions) -> Self {
        self.sheet_options = options;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// 逐帧生成。
    ///
    /// 配额耗尽时直接返回 `Err(GenerationError::Quota)`，已生成的帧被丢弃。
    pub async fn run(
        &self,
        prompts: &[FramePrompt],
        reference: Option<&DynamicImage>,
    ) -> Result<SequenceReport, GenerationError> {
        let requested = prompts.len();
        let mut frames = Vec::with_capacity(requested + 1);
        let mut failures = Vec::new();

        if self.prepend_reference {
            if let Some(reference) = reference {
                frames.push(GeneratedFrame {
                    name: REFERENCE_FRAME_NAME.to_string(),
                    image: reference.clone(),
                });
            }
        }
        let base_len = frames.len();

        log::info!("🎬 开始逐帧生成 - 共 {} 帧", requested);

        for (index, frame) in prompts.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let mut request = GenerationRequest::new(frame.prompt.clone());
            if let Some(reference) = reference {
                request = request.with_reference(reference.clone());
            }

            let result = self
                .generator
                .generate(&request)
                .await
                .and_then(|media| media.into_image());

            match result {
                Ok(image) => {
                    log::info!("✅ {} 生成完成（{}/{}）", frame.name, index + 1, requested);
                    frames.push(GeneratedFrame {
                        name: frame.name.clone(),
                        image,
                    });
                }
                Err(err) if err.is_quota() => {
                    log::error!("❌ {} 因配额耗尽失败，停止后续生成", frame.name);
                    return Err(err);
                }
                Err(err) => {
                    log::warn!("⚠️ {} 生成失败，继续下一帧：{}", frame.name, err);
                    failures.push((frame.name.clone(), err));
                }
            }
        }

        let generated = frames.len() - base_len;
        let (sheet, status) = if generated == 0 {
            (None, SequenceStatus::Failed)
        } else if generated < requested {
            (None, SequenceStatus::Partial { generated, requested })
        } else {
            let images: Vec<DynamicImage> = frames.iter().map(|f| f.image.clone()).collect();
            match sprite::combine_horizontal_with(&images, self.sheet_options) {
                Ok(sheet) => (Some(sheet), SequenceStatus::Complete),
                Err(err) => {
                    log::warn!("⚠️ 精灵图拼接失败：{}", err);
                    (None, SequenceStatus::SheetFailed(err.to_string()))
                }
            }
        };

        log::info!("{}", status.summary(requested));

        Ok(SequenceReport {
            frames,
            sheet,
            status,
            failures,
        })
    }
}

//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排与配置管理，算法本身在 `crate::sprite` 中。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节（或直接使用像素 / 已解码图像）
//! 3. 解码为规范化 `DynamicImage`
//! 4. 执行裁剪或拼接
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ImageConfig>>` 支持运行时动态切档。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `load/decode/process/total` 阶段耗时，便于性能诊断。
//! - 拼接时单帧加载失败只记录并跳过，全部失败才报错。

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use image::{DynamicImage, GenericImageView, RgbImage};

use super::source::RawImageData;
use super::{ImageConfig, ImageError, ImagePerformanceProfile, ImageSource};
use crate::sprite::{self, CropRect, SheetOptions};

/// 图片处理器。
///
/// 封装了配置状态，并编排各子模块实现完整流程。
pub struct ImageHandler {
    pub(super) config: Arc<RwLock<ImageConfig>>,
}

/// 自动裁剪结果。
#[derive(Debug, Clone)]
pub struct CropOutcome {
    /// 裁剪后的图像（保留原始颜色类型）。
    pub image: DynamicImage,
    /// 在原图中的裁剪矩形（右、下为开区间）。
    pub rect: CropRect,
    /// 泛洪起点。
    pub seed: (u32, u32),
}

/// 拼接结果。
#[derive(Debug)]
pub struct CombineReport {
    /// 横向精灵图（不透明 RGB）。
    pub sheet: RgbImage,
    /// 实际参与拼接的帧数。
    pub frame_count: usize,
    /// 被跳过的帧：输入下标与失败原因。
    pub skipped: Vec<(usize, ImageError)>,
}

impl CombineReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl ImageHandler {
    /// 根据初始配置创建处理器。
    ///
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub(crate) fn config_snapshot(&self) -> Result<ImageConfig, ImageError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 设置性能档位。
    pub fn set_performance_profile(&self, profile: ImagePerformanceProfile) -> Result<(), ImageError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_performance_profile(profile);

        log::info!(
            "⚙️ 已切换图片性能档位：{:?}（filter={:?}）",
            profile,
            config.sheet_filter
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn get_performance_profile(&self) -> Result<ImagePerformanceProfile, ImageError> {
        let config = self
            .config
            .read()
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_performance_profile())
    }

    /// 设置裁剪参数（alpha 容差与边距）。
    pub fn set_crop_params(&self, alpha_tolerance: u8, padding: u32) -> Result<(), ImageError> {
        if padding > 512 {
            return Err(ImageError::InvalidFormat("padding 必须在 0~512 像素之间".to_string()));
        }

        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.alpha_tolerance = alpha_tolerance;
        config.crop_padding = padding;

        Ok(())
    }

    /// 获取裁剪参数 `(alpha_tolerance, padding)`。
    pub fn get_crop_params(&self) -> Result<(u8, u32), ImageError> {
        let config = self
            .config
            .read()
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok((config.alpha_tolerance, config.crop_padding))
    }

    /// 解码任意来源为规范化图像。
    pub fn decode(&self, source: ImageSource) -> Result<DynamicImage, ImageError> {
        let config = self.config_snapshot()?;
        self.decode_source(source, &config)
    }

    /// 唯一的解码边界：所有来源都在这里被穷尽匹配。
    pub(super) fn decode_source(
        &self,
        source: ImageSource,
        config: &ImageConfig,
    ) -> Result<DynamicImage, ImageError> {
        let raw: RawImageData = match source {
            ImageSource::FilePath(path) => self.load_from_file(&path, config)?,
            ImageSource::Bytes(bytes) => self.load_from_bytes(bytes, config)?,
            ImageSource::Base64(data) => self.load_from_base64(&data, config)?,
            ImageSource::Pixels {
                width,
                height,
                channels,
                data,
            } => return Self::decode_pixels(config, width, height, channels, data),
            ImageSource::Decoded(image) => return Ok(image),
        };

        self.decode_raw(raw, config)
    }

    /// 自动裁剪：定位中心附近前景，泛洪得到连通域包围盒，外扩边距后裁剪。
    ///
    /// 外部调用方通过 [`ImageServiceState::auto_crop`](super::ImageServiceState::auto_crop) 使用。
    pub fn auto_crop(&self, source: ImageSource) -> Result<CropOutcome, ImageError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();
        let hint = source.hint();

        let decode_start = Instant::now();
        let image = self.decode_source(source, &config)?;
        let decode_elapsed = decode_start.elapsed();

        let process_start = Instant::now();
        let (width, height) = image.dimensions();
        let rgba = image.to_rgba8();
        let center = (width / 2, height / 2);

        let seed = sprite::locate_seed_with(&rgba, center, config.seed_search()).ok_or_else(|| {
            ImageError::NoContentFound(format!(
                "中心 ({}, {}) 附近未找到不透明像素",
                center.0, center.1
            ))
        })?;
        log::debug!("🎯 前景种子：({}, {})", seed.0, seed.1);

        let rect = sprite::extract_crop_box(&rgba, seed, config.alpha_tolerance, config.crop_padding)?;
        let cropped = image.crop_imm(rect.left, rect.top, rect.width(), rect.height());
        let process_elapsed = process_start.elapsed();

        log::info!(
            "✂️ 自动裁剪完成 - 来源: {} 原图: {}x{} 裁剪: {}x{} decode={}ms process={}ms total={}ms",
            hint,
            width,
            height,
            cropped.width(),
            cropped.height(),
            decode_elapsed.as_millis(),
            process_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(CropOutcome {
            image: cropped,
            rect,
            seed,
        })
    }

    /// 裁剪文件并以 PNG 写出。
    pub fn auto_crop_file(&self, input: &Path, output: &Path) -> Result<CropOutcome, ImageError> {
        let outcome = self.auto_crop(ImageSource::FilePath(input.to_path_buf()))?;
        crate::storage::save_png(&outcome.image, output)?;
        Ok(outcome)
    }

    /// 将多个来源按顺序拼接为横向精灵图。
    ///
    /// 单帧加载失败不会中断流程；只要有一帧成功即可出图。
    pub fn combine_sources(&self, sources: Vec<ImageSource>) -> Result<CombineReport, ImageError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        if sources.is_empty() {
            return Err(ImageError::Combine("没有可拼接的帧".to_string()));
        }

        let requested = sources.len();
        let mut frames = Vec::with_capacity(requested);
        let mut skipped = Vec::new();
        let mut decode_elapsed = Duration::ZERO;

        for (index, source) in sources.into_iter().enumerate() {
            let decode_start = Instant::now();
            let result = self.decode_source(source, &config);
            decode_elapsed += decode_start.elapsed();

            match result {
                Ok(frame) => frames.push(frame),
                Err(err) => {
                    log::warn!("⚠️ 第 {} 帧加载失败，已跳过：{}", index, err);
                    skipped.push((index, err));
                }
            }
        }

        if frames.is_empty() {
            let (index, reason) = skipped
                .first()
                .map(|(index, err)| (*index, err.to_string()))
                .unwrap_or_default();
            return Err(ImageError::FrameLoad {
                index,
                reason: format!("全部 {} 帧均加载失败（首个错误：{}）", requested, reason),
            });
        }

        let process_start = Instant::now();
        let options = SheetOptions {
            filter: config.sheet_filter,
            background: config.sheet_background,
            max_pixels: config.max_decoded_pixels,
            max_bytes: config.max_decoded_bytes,
        };
        let sheet = sprite::combine_horizontal_with(&frames, options)?;
        let process_elapsed = process_start.elapsed();

        log::info!(
            "🎞️ 精灵图处理完成 - 请求: {} 成功: {} 跳过: {} decode={}ms process={}ms total={}ms",
            requested,
            frames.len(),
            skipped.len(),
            decode_elapsed.as_millis(),
            process_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(CombineReport {
            sheet,
            frame_count: frames.len(),
            skipped,
        })
    }
}

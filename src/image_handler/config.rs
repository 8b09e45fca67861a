//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ImageConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中性能档位（quality / balanced / speed）作为高层语义，映射到精灵图拼接时的重采样滤镜。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置（拼接默认使用 Lanczos3）。
//! - `ImagePerformanceProfile` 负责档位字符串解析与反向输出。
//! - `apply_performance_profile` 将档位转换为具体滤镜。
//! - `infer_performance_profile` 用于从当前配置反推档位（给前端展示状态）。

use image::Rgb;
use image::imageops::FilterType;

use super::ImageError;
use crate::sprite::SeedSearch;

/// 图片处理配置。
///
/// 字段覆盖了加载、解码、前景裁剪与精灵图拼接四个阶段。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 连通域泛洪时视为前景的最小 alpha（严格大于该值才算前景）。
    pub alpha_tolerance: u8,
    /// 裁剪框四周额外保留的边距（像素）。
    pub crop_padding: u32,
    /// 前景种子搜索的半径步长。
    pub seed_radius_step: u32,
    /// 前景种子搜索在每一圈上的水平偏移步长。
    pub seed_offset_step: u32,
    /// 精灵图拼接时的重采样滤镜。
    pub sheet_filter: FilterType,
    /// 透明区域铺底颜色。
    pub sheet_background: Rgb<u8>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            alpha_tolerance: 10,
            crop_padding: 5,
            seed_radius_step: 10,
            seed_offset_step: 5,
            sheet_filter: FilterType::Lanczos3,
            sheet_background: Rgb([255, 255, 255]),
        }
    }
}

impl ImageConfig {
    /// 当前配置对应的种子搜索参数。
    pub(crate) fn seed_search(&self) -> SeedSearch {
        SeedSearch {
            radius_step: self.seed_radius_step,
            offset_step: self.seed_offset_step,
        }
    }
}

/// 图片性能档位（面向产品/用户语义）。
///
/// - `Quality`：Lanczos3，尽量保真
/// - `Balanced`：CatmullRom，质量与性能平衡
/// - `Speed`：Triangle，优先拼接速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl ImagePerformanceProfile {
    /// 从外部字符串解析档位（忽略大小写与首尾空白）。
    ///
    /// 外部调用方通过 `ImageServiceState::set_performance_profile` 使用。
    pub(crate) fn from_str(profile: &str) -> Result<Self, ImageError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(ImageError::InvalidFormat(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串，供前端展示与持久化。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl ImageConfig {
    /// 基于当前滤镜反推性能档位。
    pub(crate) fn infer_performance_profile(&self) -> ImagePerformanceProfile {
        match self.sheet_filter {
            FilterType::Lanczos3 | FilterType::Gaussian => ImagePerformanceProfile::Quality,
            FilterType::CatmullRom => ImagePerformanceProfile::Balanced,
            FilterType::Triangle | FilterType::Nearest => ImagePerformanceProfile::Speed,
        }
    }

    /// 应用指定性能档位到实际参数。
    pub(crate) fn apply_performance_profile(&mut self, profile: ImagePerformanceProfile) {
        self.sheet_filter = match profile {
            ImagePerformanceProfile::Quality => FilterType::Lanczos3,
            ImagePerformanceProfile::Balanced => FilterType::CatmullRom,
            ImagePerformanceProfile::Speed => FilterType::Triangle,
        };
    }
}

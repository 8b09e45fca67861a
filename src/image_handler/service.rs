//! # 服务层（显式构造的服务对象）
//!
//! ## 设计思路
//!
//! 使用 `ImageServiceState` 作为显式构造、显式传递的服务对象，替代全局单例函数。
//! 好处：
//! 1. 生命周期清晰（由 `main.rs` 或上层应用统一管理）
//! 2. 测试可创建独立实例，减少共享状态副作用
//! 3. 可按会话注入不同配置
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `auto_crop` / `auto_crop_file`：前景自动裁剪
//! - `combine`：多帧拼接为精灵图
//! - `set_performance_profile` / `get_performance_profile`：切换与读取性能档位

use std::path::Path;

use image::DynamicImage;

use super::{
    CombineReport, CropOutcome, ImageConfig, ImageError, ImageHandler, ImagePerformanceProfile,
    ImageSource,
};

/// 图片处理服务状态。
///
/// 内部持有 `ImageHandler`，可放入 `Arc` 在线程间共享。
pub struct ImageServiceState {
    handler: ImageHandler,
}

impl ImageServiceState {
    /// 使用默认配置创建服务状态。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use sprite_forge::image_handler::ImageServiceState;
    ///
    /// let service = ImageServiceState::new()?;
    /// # Ok::<(), sprite_forge::image_handler::ImageError>(())
    /// ```
    pub fn new() -> Result<Self, ImageError> {
        Self::with_config(ImageConfig::default())
    }

    /// 使用自定义配置创建服务状态。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use sprite_forge::image_handler::{ImageConfig, ImageServiceState};
    ///
    /// let mut config = ImageConfig::default();
    /// config.crop_padding = 0;
    /// let service = ImageServiceState::with_config(config)?;
    /// # Ok::<(), sprite_forge::image_handler::ImageError>(())
    /// ```
    pub fn with_config(config: ImageConfig) -> Result<Self, ImageError> {
        let handler = ImageHandler::new(config)?;
        Ok(Self { handler })
    }

    pub fn decode(&self, source: ImageSource) -> Result<DynamicImage, ImageError> {
        self.handler.decode(source)
    }

    /// 自动裁剪单张图片。
    pub fn auto_crop(&self, source: ImageSource) -> Result<CropOutcome, ImageError> {
        self.handler.auto_crop(source)
    }

    /// 裁剪文件并写出 PNG。
    pub fn auto_crop_file(&self, input: &Path, output: &Path) -> Result<CropOutcome, ImageError> {
        self.handler.auto_crop_file(input, output)
    }

    /// 拼接多帧为横向精灵图。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use sprite_forge::image_handler::{ImageServiceState, ImageSource};
    ///
    /// let service = ImageServiceState::new()?;
    /// let report = service.combine(vec![
    ///     ImageSource::FilePath("frame_0.png".into()),
    ///     ImageSource::FilePath("frame_1.png".into()),
    /// ])?;
    /// println!("{}x{}", report.sheet.width(), report.sheet.height());
    /// # Ok::<(), sprite_forge::image_handler::ImageError>(())
    /// ```
    pub fn combine(&self, sources: Vec<ImageSource>) -> Result<CombineReport, ImageError> {
        self.handler.combine_sources(sources)
    }

    /// 设置性能档位（字符串）。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use sprite_forge::image_handler::ImageServiceState;
    ///
    /// let service = ImageServiceState::new()?;
    /// service.set_performance_profile("speed")?;
    /// # Ok::<(), sprite_forge::image_handler::ImageError>(())
    /// ```
    pub fn set_performance_profile(&self, profile: &str) -> Result<(), ImageError> {
        let profile = ImagePerformanceProfile::from_str(profile)?;
        self.handler.set_performance_profile(profile)
    }

    /// 获取当前生效性能档位（字符串）。
    pub fn get_performance_profile(&self) -> Result<String, ImageError> {
        let profile = self.handler.get_performance_profile()?;
        Ok(profile.as_str().to_string())
    }

    pub fn set_crop_params(&self, alpha_tolerance: u8, padding: u32) -> Result<(), ImageError> {
        self.handler.set_crop_params(alpha_tolerance, padding)
    }
}

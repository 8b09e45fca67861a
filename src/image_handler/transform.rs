//! # 几何变换
//!
//! 编辑面板上的几个一次性操作：水平翻转、顺时针旋转、等比缩放后居中留白。
//! 旋转总是扩展画布，不会裁掉内容。

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage, imageops};

use super::ImageError;

/// 水平镜像。
pub fn flip_horizontal(image: &DynamicImage) -> DynamicImage {
    image.fliph()
}

/// 顺时针旋转 90°，输出宽高互换。
pub fn rotate_90(image: &DynamicImage) -> DynamicImage {
    image.rotate90()
}

pub fn rotate_180(image: &DynamicImage) -> DynamicImage {
    image.rotate180()
}

/// 顺时针旋转 270°（等价于逆时针 90°）。
pub fn rotate_270(image: &DynamicImage) -> DynamicImage {
    image.rotate270()
}

/// 等比缩放到目标画布内，并居中铺在 `background` 上。
///
/// 缩放比取 `min(target_w / w, target_h / h)`，结果尺寸向下取整（至少 1）。
/// 输出恒为 `target_width x target_height` 的 RGBA 图像。
pub fn resize_with_padding(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    background: Rgba<u8>,
) -> Result<RgbaImage, ImageError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || target_width == 0 || target_height == 0 {
        return Err(ImageError::ResourceLimit(format!(
            "无法缩放：源尺寸 {}x{}，目标尺寸 {}x{}",
            width, height, target_width, target_height
        )));
    }

    let ratio = f64::min(
        f64::from(target_width) / f64::from(width),
        f64::from(target_height) / f64::from(height),
    );
    let new_width = ((f64::from(width) * ratio) as u32).clamp(1, target_width);
    let new_height = ((f64::from(height) * ratio) as u32).clamp(1, target_height);

    let resized = imageops::resize(&image.to_rgba8(), new_width, new_height, FilterType::Lanczos3);

    let mut canvas = RgbaImage::from_pixel(target_width, target_height, background);
    let offset_x = i64::from((target_width - new_width) / 2);
    let offset_y = i64::from((target_height - new_height) / 2);
    imageops::overlay(&mut canvas, &resized, offset_x, offset_y);

    log::debug!(
        "📐 缩放留白 - {}x{} → {}x{}（画布 {}x{}）",
        width,
        height,
        new_width,
        new_height,
        target_width,
        target_height
    );

    Ok(canvas)
}

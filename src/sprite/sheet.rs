//! # 帧序列拼接
//!
//! 把一组来源各异（有的带透明、有的不带、尺寸不一）的帧合成一张横向精灵图：
//!
//! 1. 每帧先铺到不透明底色上（带 alpha 的用自身 alpha 作混合蒙版），统一成 RGB；
//! 2. 以第一帧高度为基准，各帧按自身宽高比缩放到同一高度；
//! 3. 按输入顺序从左到右无缝拼接。
//!
//! 输出永远不含 alpha 通道，避免精灵图里出现不一致的背景。

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage, imageops};

use crate::image_handler::{ImageError, resize_rgb};

/// 拼接参数。
#[derive(Debug, Clone, Copy)]
pub struct SheetOptions {
    /// 重采样滤镜。
    pub filter: FilterType,
    /// 透明区域铺底颜色。
    pub background: Rgb<u8>,
    /// 输出精灵图的像素上限（`total_width * base_height`）。
    pub max_pixels: u64,
    /// 输出精灵图的内存上限（按 RGB 每像素 3 字节估算）。
    pub max_bytes: u64,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
            background: Rgb([255, 255, 255]),
            max_pixels: 40_000_000,
            max_bytes: 160 * 1024 * 1024,
        }
    }
}

/// 把单帧转为不透明 RGB。
///
/// 带 alpha 的帧按 `out = src * a + background * (1 - a)` 混合；不带 alpha 的直接转换。
pub fn normalize_opaque(frame: &DynamicImage, background: Rgb<u8>) -> RgbImage {
    if !frame.color().has_alpha() {
        return frame.to_rgb8();
    }

    let rgba = frame.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let pixel = rgba.get_pixel(x, y);
        let alpha = u32::from(pixel[3]);
        let blend = |src: u8, dst: u8| {
            ((u32::from(src) * alpha + u32::from(dst) * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([
            blend(pixel[0], background[0]),
            blend(pixel[1], background[1]),
            blend(pixel[2], background[2]),
        ])
    })
}

/// 以 `base_height` 为目标高度，按宽高比计算缩放后宽度（四舍五入，至少 1）。
///
/// 结果超出 `u32` 时饱和到 `u32::MAX`，由拼接阶段的尺寸上限拒绝。
pub fn scaled_width(width: u32, height: u32, base_height: u32) -> u32 {
    let scaled = f64::from(base_height) * (f64::from(width) / f64::from(height));
    (scaled.round() as u32).max(1)
}

/// 在分配任何缓冲区之前校验输出尺寸。
fn plan_sheet_width(
    target_widths: &[u32],
    base_height: u32,
    options: &SheetOptions,
) -> Result<u32, ImageError> {
    let total_width = target_widths
        .iter()
        .try_fold(0u32, |acc, width| acc.checked_add(*width))
        .ok_or_else(|| ImageError::Combine("精灵图总宽度溢出".to_string()))?;

    let pixels = u64::from(total_width) * u64::from(base_height);
    if pixels > options.max_pixels {
        return Err(ImageError::Combine(format!(
            "精灵图尺寸 {}x{} 超出像素上限 {}",
            total_width, base_height, options.max_pixels
        )));
    }

    let bytes = pixels.saturating_mul(3);
    if bytes > options.max_bytes {
        return Err(ImageError::Combine(format!(
            "精灵图预计占用 {} 字节，超出内存上限 {}",
            bytes, options.max_bytes
        )));
    }

    Ok(total_width)
}

/// 使用默认参数（Lanczos3 + 白底）拼接精灵图。
pub fn combine_horizontal(frames: &[DynamicImage]) -> Result<RgbImage, ImageError> {
    combine_horizontal_with(frames, SheetOptions::default())
}

/// 按给定参数拼接精灵图。
///
/// 空输入或任一帧宽高为 0 时返回 `ImageError::Combine`。
pub fn combine_horizontal_with(
    frames: &[DynamicImage],
    options: SheetOptions,
) -> Result<RgbImage, ImageError> {
    if frames.is_empty() {
        return Err(ImageError::Combine("没有可拼接的帧".to_string()));
    }

    for (index, frame) in frames.iter().enumerate() {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::Combine(format!(
                "第 {} 帧尺寸为 {}x{}，无法缩放",
                index, width, height
            )));
        }
    }

    let base_height = frames[0].height();
    let target_widths: Vec<u32> = frames
        .iter()
        .map(|frame| scaled_width(frame.width(), frame.height(), base_height))
        .collect();
    let total_width = plan_sheet_width(&target_widths, base_height, &options)?;
    log::debug!("🎞️ 拼接基准高度：{} 输出宽度：{}", base_height, total_width);

    let mut resized = Vec::with_capacity(frames.len());
    for (index, (frame, target_width)) in frames.iter().zip(target_widths).enumerate() {
        let frame = normalize_opaque(frame, options.background);
        let frame = if frame.dimensions() == (target_width, base_height) {
            frame
        } else {
            resize_rgb(&frame, target_width, base_height, options.filter).map_err(|e| {
                ImageError::Combine(format!("第 {} 帧缩放失败：{}", index, e))
            })?
        };
        log::debug!("🎞️ 第 {} 帧缩放后尺寸：{}x{}", index, frame.width(), frame.height());
        resized.push(frame);
    }

    let mut sheet = RgbImage::new(total_width, base_height);
    let mut offset_x = 0i64;
    for frame in &resized {
        imageops::replace(&mut sheet, frame, offset_x, 0);
        offset_x += i64::from(frame.width());
    }

    log::info!(
        "✅ 精灵图拼接完成 - 帧数: {} 输出尺寸: {}x{}",
        resized.len(),
        total_width,
        base_height
    );

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    fn assert_close(actual: &Rgb<u8>, expected: [u8; 3]) {
        for (a, e) in actual.0.iter().zip(expected) {
            assert!(a.abs_diff(e) <= 2, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn heights_are_normalized_to_first_frame() {
        let frames = vec![
            solid_rgb(100, 100, [255, 0, 0]),
            solid_rgb(100, 50, [0, 255, 0]),
            solid_rgb(100, 200, [0, 0, 255]),
        ];

        let sheet = combine_horizontal(&frames).expect("combine succeeds");

        assert_eq!(sheet.dimensions(), (350, 100));
        assert_close(sheet.get_pixel(50, 50), [255, 0, 0]);
        assert_close(sheet.get_pixel(200, 50), [0, 255, 0]);
        assert_close(sheet.get_pixel(325, 50), [0, 0, 255]);
    }

    #[test]
    fn transparent_areas_become_white() {
        let mut rgba = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 0]));
        for y in 5..15 {
            for x in 5..15 {
                rgba.put_pixel(x, y, Rgba([10, 20, 30, 255]));
            }
        }
        let frames = vec![DynamicImage::ImageRgba8(rgba), solid_rgb(20, 20, [1, 2, 3])];

        let sheet = combine_horizontal(&frames).expect("combine succeeds");

        assert_eq!(sheet.dimensions(), (40, 20));
        assert_eq!(*sheet.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*sheet.get_pixel(10, 10), Rgb([10, 20, 30]));
        assert_eq!(*sheet.get_pixel(30, 10), Rgb([1, 2, 3]));
    }

    #[test]
    fn half_transparent_pixels_blend_with_background() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let out = normalize_opaque(&DynamicImage::ImageRgba8(rgba), Rgb([255, 255, 255]));
        assert_eq!(*out.get_pixel(0, 0), Rgb([127, 127, 127]));
    }

    #[test]
    fn order_is_preserved() {
        let frames: Vec<DynamicImage> = (0..5u8)
            .map(|i| solid_rgb(4, 4, [i * 40, 0, 0]))
            .collect();

        let sheet = combine_horizontal(&frames).expect("combine succeeds");

        for i in 0..5u32 {
            assert_eq!(sheet.get_pixel(i * 4 + 1, 1)[0], (i * 40) as u8);
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(combine_horizontal(&[]), Err(ImageError::Combine(_))));
    }

    #[test]
    fn zero_size_frame_is_rejected() {
        let frames = vec![
            solid_rgb(4, 4, [0, 0, 0]),
            DynamicImage::ImageRgb8(RgbImage::new(0, 4)),
        ];
        assert!(matches!(combine_horizontal(&frames), Err(ImageError::Combine(_))));
    }

    #[test]
    fn oversized_sheet_is_rejected_before_allocation() {
        let frames = vec![
            DynamicImage::ImageRgb8(RgbImage::new(1, 20_000)),
            DynamicImage::ImageRgb8(RgbImage::new(20_000, 1)),
        ];

        let result = combine_horizontal(&frames);

        assert!(matches!(result, Err(ImageError::Combine(_))));
    }

    #[test]
    fn sheet_limits_come_from_options() {
        let frames = vec![solid_rgb(10, 10, [0, 0, 0]), solid_rgb(10, 10, [0, 0, 0])];
        let tight = SheetOptions {
            max_pixels: 150,
            ..SheetOptions::default()
        };
        assert!(matches!(
            combine_horizontal_with(&frames, tight),
            Err(ImageError::Combine(_))
        ));

        let byte_bound = SheetOptions {
            max_bytes: 500,
            ..SheetOptions::default()
        };
        assert!(matches!(
            combine_horizontal_with(&frames, byte_bound),
            Err(ImageError::Combine(_))
        ));

        let exact = SheetOptions {
            max_pixels: 200,
            max_bytes: 600,
            ..SheetOptions::default()
        };
        let sheet = combine_horizontal_with(&frames, exact).expect("sheet at the limit");
        assert_eq!(sheet.dimensions(), (20, 10));
    }

    #[test]
    fn scaled_width_rounds_and_never_hits_zero() {
        assert_eq!(scaled_width(100, 50, 100), 200);
        assert_eq!(scaled_width(3, 2, 3), 5);
        assert_eq!(scaled_width(1, 1000, 10), 1);
    }
}

//! # 前景种子定位
//!
//! 生成图通常把角色放在画面中央，但中心像素可能恰好落在透明缝隙里（例如双腿之间）。
//! 这里从中心向外按固定步长做稀疏扫描，找到第一个 alpha > 0 的像素作为泛洪起点。
//!
//! 搜索是粗粒度的：半径每次 +`radius_step`，每一圈只检查方框上下两条边上
//! 间隔 `offset_step` 的若干点。找不到时返回 `None`，由调用方报告“无内容”。

use image::RgbaImage;

/// 种子搜索步长。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSearch {
    /// 半径步长。
    pub radius_step: u32,
    /// 每圈水平偏移步长。
    pub offset_step: u32,
}

impl Default for SeedSearch {
    fn default() -> Self {
        Self {
            radius_step: 10,
            offset_step: 5,
        }
    }
}

/// 使用默认步长定位前景种子。
///
/// # 示例
/// ```
/// use image::{Rgba, RgbaImage};
/// use sprite_forge::sprite::locate_seed;
///
/// let image = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
/// assert_eq!(locate_seed(&image, (4, 4)), Some((4, 4)));
/// ```
pub fn locate_seed(image: &RgbaImage, center: (u32, u32)) -> Option<(u32, u32)> {
    locate_seed_with(image, center, SeedSearch::default())
}

/// 按给定步长定位前景种子。
///
/// 半径取值为 `1, 1 + step, 1 + 2*step, ...`，严格小于 `min(width, height) / 2`。
pub fn locate_seed_with(
    image: &RgbaImage,
    center: (u32, u32),
    search: SeedSearch,
) -> Option<(u32, u32)> {
    let (width, height) = image.dimensions();
    let (cx, cy) = center;

    if cx < width && cy < height && image.get_pixel(cx, cy)[3] > 0 {
        return Some(center);
    }

    let radius_step = search.radius_step.max(1) as usize;
    let offset_step = search.offset_step.max(1) as usize;
    let bound = i64::from(width.min(height) / 2);
    let (cx, cy) = (i64::from(cx), i64::from(cy));

    let is_foreground = |x: i64, y: i64| {
        x >= 0
            && y >= 0
            && x < i64::from(width)
            && y < i64::from(height)
            && image.get_pixel(x as u32, y as u32)[3] > 0
    };

    for r in (1..bound).step_by(radius_step) {
        for offset in (-r..=r).step_by(offset_step) {
            for x in [cx + offset, cx - offset] {
                for y in [cy - r, cy + r] {
                    if is_foreground(x, y) {
                        return Some((x as u32, y as u32));
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);
    const SOLID: Rgba<u8> = Rgba([20, 40, 60, 255]);

    #[test]
    fn returns_center_when_already_foreground() {
        let mut image = RgbaImage::from_pixel(64, 64, CLEAR);
        image.put_pixel(32, 32, Rgba([0, 0, 0, 1]));

        assert_eq!(locate_seed(&image, (32, 32)), Some((32, 32)));
    }

    #[test]
    fn fully_transparent_image_has_no_seed() {
        let image = RgbaImage::from_pixel(128, 96, CLEAR);
        assert_eq!(locate_seed(&image, (64, 48)), None);
    }

    #[test]
    fn finds_content_on_first_ring_top_row() {
        let mut image = RgbaImage::from_pixel(64, 64, CLEAR);
        // r = 1，offset = -1：先检查 x = 31 再检查 x = 33
        image.put_pixel(33, 31, SOLID);

        assert_eq!(locate_seed(&image, (32, 32)), Some((33, 31)));
    }

    #[test]
    fn finds_ring_below_transparent_center() {
        let mut image = RgbaImage::from_pixel(100, 100, CLEAR);
        // 第三圈 r = 21，底边 y = 71
        for x in 40..60 {
            image.put_pixel(x, 71, SOLID);
        }

        let seed = locate_seed(&image, (50, 50)).expect("content below center");
        assert_eq!(seed.1, 71);
        assert!((40..60).contains(&seed.0));
    }

    #[test]
    fn content_beyond_search_bound_is_ignored() {
        let mut image = RgbaImage::from_pixel(40, 40, CLEAR);
        // bound = 20，半径仅取 1 和 11，角落不可达
        image.put_pixel(0, 0, SOLID);
        image.put_pixel(39, 39, SOLID);

        assert_eq!(locate_seed(&image, (20, 20)), None);
    }

    #[test]
    fn coarse_steps_can_miss_thin_content() {
        let mut image = RgbaImage::from_pixel(64, 64, CLEAR);
        // y = 27 不在任何一圈的上下边上
        for x in 0..64 {
            image.put_pixel(x, 27, SOLID);
        }

        assert_eq!(locate_seed(&image, (32, 32)), None);
    }

    #[test]
    fn finer_steps_find_thin_content() {
        let mut image = RgbaImage::from_pixel(64, 64, CLEAR);
        for x in 0..64 {
            image.put_pixel(x, 27, SOLID);
        }

        let search = SeedSearch { radius_step: 1, offset_step: 1 };
        let seed = locate_seed_with(&image, (32, 32), search).expect("thin line found");
        assert_eq!(seed.1, 27);
    }

    #[test]
    fn out_of_bounds_center_still_searches() {
        let mut image = RgbaImage::from_pixel(10, 10, CLEAR);
        image.put_pixel(9, 9, SOLID);

        assert_eq!(locate_seed(&image, (10, 10)), Some((9, 9)));
    }
}

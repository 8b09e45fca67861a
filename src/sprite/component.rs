//! # 连通域裁剪
//!
//! ## 设计思路
//!
//! 从种子像素出发做 4 邻接 BFS 泛洪，只扩展 alpha 严格大于容差的像素，
//! 边走边维护访问像素的包围盒。最终包围盒外扩固定边距并裁到图像范围内，
//! 得到建议裁剪矩形；是否真正裁剪由调用方决定，本模块不修改任何图像。
//!
//! ## 实现思路
//!
//! - 访问状态用与图像同尺寸的平铺数组记录，替代坐标哈希集合。
//! - 额外记录“已判定为背景”的像素，避免同一透明像素被多个前景邻居重复检查；
//!   这只影响性能，不影响结果。
//! - 两个不相交的前景块互不影响：只有与种子连通的那一块会进入包围盒。

use std::collections::VecDeque;

use image::RgbaImage;

use crate::image_handler::ImageError;

const PROGRESS_LOG_INTERVAL: usize = 10_000;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unseen,
    Visited,
    Rejected,
}

/// 紧致包围盒（闭区间，`min <= max`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    fn at(x: u32, y: u32) -> Self {
        Self { min_x: x, min_y: y, max_x: x, max_y: y }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    /// 四周外扩 `padding`，左上裁到 0，右下（开区间）裁到图像宽高。
    pub fn padded(&self, padding: u32, width: u32, height: u32) -> CropRect {
        CropRect {
            left: self.min_x.saturating_sub(padding),
            top: self.min_y.saturating_sub(padding),
            right: width.min(self.max_x.saturating_add(1).saturating_add(padding)),
            bottom: height.min(self.max_y.saturating_add(1).saturating_add(padding)),
        }
    }
}

/// 裁剪矩形，`right` / `bottom` 为开区间，可直接用于 `crop_imm`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// 一次泛洪的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentScan {
    /// 未外扩的包围盒。
    pub bounds: BoundingBox,
    /// 连通域内像素数。
    pub pixel_count: usize,
}

/// 从种子出发追踪连通域，返回未外扩的包围盒。
///
/// 种子本身无条件计入连通域；调用方负责保证种子是前景像素。
pub fn trace_component(
    image: &RgbaImage,
    seed: (u32, u32),
    alpha_tolerance: u8,
) -> Result<ComponentScan, ImageError> {
    let (width, height) = image.dimensions();
    let (seed_x, seed_y) = seed;
    if seed_x >= width || seed_y >= height {
        return Err(ImageError::InvalidFormat(format!(
            "种子坐标 ({}, {}) 超出图像范围 {}x{}",
            seed_x, seed_y, width, height
        )));
    }

    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;
    let mut marks = vec![Mark::Unseen; width as usize * height as usize];
    let mut queue = VecDeque::new();

    marks[index(seed_x, seed_y)] = Mark::Visited;
    queue.push_back((seed_x, seed_y));

    let mut bounds = BoundingBox::at(seed_x, seed_y);
    let mut pixel_count = 0usize;

    while let Some((x, y)) = queue.pop_front() {
        bounds.include(x, y);

        pixel_count += 1;
        if pixel_count % PROGRESS_LOG_INTERVAL == 0 {
            log::debug!("🧭 泛洪进度：已处理 {} 像素", pixel_count);
        }

        let neighbors = [
            (x.checked_sub(1), Some(y)),
            (x.checked_add(1).filter(|nx| *nx < width), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), y.checked_add(1).filter(|ny| *ny < height)),
        ];

        for (nx, ny) in neighbors {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };

            let slot = &mut marks[index(nx, ny)];
            if *slot != Mark::Unseen {
                continue;
            }

            if image.get_pixel(nx, ny)[3] > alpha_tolerance {
                *slot = Mark::Visited;
                queue.push_back((nx, ny));
            } else {
                *slot = Mark::Rejected;
            }
        }
    }

    log::info!(
        "✅ 连通域追踪完成 - 种子: ({}, {}) 像素数: {} 包围盒: ({}, {}, {}, {})",
        seed_x,
        seed_y,
        pixel_count,
        bounds.min_x,
        bounds.min_y,
        bounds.max_x,
        bounds.max_y
    );

    Ok(ComponentScan { bounds, pixel_count })
}

/// 计算种子所在连通域的建议裁剪矩形（已外扩并裁到图像范围）。
///
/// # 示例
/// ```
/// use image::{Rgba, RgbaImage};
/// use sprite_forge::sprite::extract_crop_box;
///
/// let mut image = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 0]));
/// for y in 20..30 {
///     for x in 20..30 {
///         image.put_pixel(x, y, Rgba([255, 255, 255, 255]));
///     }
/// }
///
/// let rect = extract_crop_box(&image, (25, 25), 10, 5)?;
/// assert_eq!((rect.left, rect.top, rect.right, rect.bottom), (15, 15, 35, 35));
/// # Ok::<(), sprite_forge::image_handler::ImageError>(())
/// ```
pub fn extract_crop_box(
    image: &RgbaImage,
    seed: (u32, u32),
    alpha_tolerance: u8,
    padding: u32,
) -> Result<CropRect, ImageError> {
    let scan = trace_component(image, seed, alpha_tolerance)?;
    let (width, height) = image.dimensions();
    Ok(scan.bounds.padded(padding, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);
    const SOLID: Rgba<u8> = Rgba([200, 30, 30, 255]);

    fn fill_rect(image: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                image.put_pixel(x, y, color);
            }
        }
    }

    #[test]
    fn only_seed_blob_is_included() {
        let mut image = RgbaImage::from_pixel(120, 80, CLEAR);
        fill_rect(&mut image, 10, 10, 29, 39, SOLID);
        fill_rect(&mut image, 60, 5, 99, 70, SOLID);

        let scan = trace_component(&image, (15, 15), 10).expect("trace succeeds");

        assert_eq!(
            scan.bounds,
            BoundingBox { min_x: 10, min_y: 10, max_x: 29, max_y: 39 }
        );
        assert_eq!(scan.pixel_count, 20 * 30);
    }

    #[test]
    fn diagonal_neighbors_are_not_connected() {
        let mut image = RgbaImage::from_pixel(10, 10, CLEAR);
        image.put_pixel(4, 4, SOLID);
        image.put_pixel(5, 5, SOLID);

        let scan = trace_component(&image, (4, 4), 10).expect("trace succeeds");

        assert_eq!(scan.bounds, BoundingBox::at(4, 4));
        assert_eq!(scan.pixel_count, 1);
    }

    #[test]
    fn tolerance_is_strictly_greater_than() {
        let mut image = RgbaImage::from_pixel(10, 1, CLEAR);
        image.put_pixel(2, 0, SOLID);
        image.put_pixel(3, 0, Rgba([0, 0, 0, 11]));
        image.put_pixel(4, 0, Rgba([0, 0, 0, 10]));
        image.put_pixel(5, 0, SOLID);

        let scan = trace_component(&image, (2, 0), 10).expect("trace succeeds");

        assert_eq!(scan.bounds.max_x, 3);
        assert_eq!(scan.pixel_count, 2);
    }

    #[test]
    fn padding_clamps_at_image_edges() {
        let mut image = RgbaImage::from_pixel(50, 40, CLEAR);
        fill_rect(&mut image, 0, 0, 9, 9, SOLID);
        fill_rect(&mut image, 45, 35, 49, 39, SOLID);

        let top_left = extract_crop_box(&image, (0, 0), 10, 5).expect("crop box");
        assert_eq!(top_left, CropRect { left: 0, top: 0, right: 15, bottom: 15 });

        let bottom_right = extract_crop_box(&image, (49, 39), 10, 5).expect("crop box");
        assert_eq!(bottom_right, CropRect { left: 40, top: 30, right: 50, bottom: 40 });
    }

    #[test]
    fn hollow_ring_is_traced_around_transparent_hole() {
        let mut image = RgbaImage::from_pixel(30, 30, CLEAR);
        fill_rect(&mut image, 5, 5, 24, 24, SOLID);
        fill_rect(&mut image, 10, 10, 19, 19, CLEAR);

        let scan = trace_component(&image, (5, 5), 10).expect("trace succeeds");

        assert_eq!(
            scan.bounds,
            BoundingBox { min_x: 5, min_y: 5, max_x: 24, max_y: 24 }
        );
        assert_eq!(scan.pixel_count, 20 * 20 - 10 * 10);
    }

    #[test]
    fn seed_outside_image_is_rejected() {
        let image = RgbaImage::from_pixel(4, 4, SOLID);
        let result = trace_component(&image, (4, 0), 10);
        assert!(matches!(result, Err(ImageError::InvalidFormat(_))));
    }

    #[test]
    fn crop_rect_dimensions() {
        let bounds = BoundingBox { min_x: 206, min_y: 206, max_x: 305, max_y: 305 };
        let rect = bounds.padded(5, 512, 512);

        assert_eq!(rect, CropRect { left: 201, top: 201, right: 311, bottom: 311 });
        assert_eq!(rect.width(), 110);
        assert_eq!(bounds.width(), 100);
        assert!(bounds.contains(206, 305));
        assert!(!bounds.contains(205, 305));
    }

    /// 递归 DFS 参考实现，用于与 BFS 结果对比。
    fn reference_bounds(image: &RgbaImage, seed: (u32, u32), tolerance: u8) -> BoundingBox {
        let (width, height) = image.dimensions();
        let mut seen = vec![false; (width * height) as usize];
        let mut stack = vec![seed];
        let mut bounds = BoundingBox::at(seed.0, seed.1);
        seen[(seed.1 * width + seed.0) as usize] = true;

        while let Some((x, y)) = stack.pop() {
            bounds.include(x, y);
            let candidates = [
                (x as i64 - 1, y as i64),
                (x as i64 + 1, y as i64),
                (x as i64, y as i64 - 1),
                (x as i64, y as i64 + 1),
            ];
            for (nx, ny) in candidates {
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                let idx = (ny * width + nx) as usize;
                if !seen[idx] && image.get_pixel(nx, ny)[3] > tolerance {
                    seen[idx] = true;
                    stack.push((nx, ny));
                }
            }
        }

        bounds
    }

    proptest! {
        #[test]
        fn bfs_matches_reference_and_stays_in_bounds(
            width in 1u32..24,
            height in 1u32..24,
            alphas in proptest::collection::vec(any::<u8>(), 24 * 24),
            seed_pick in any::<usize>(),
            padding in 0u32..8,
        ) {
            let image = RgbaImage::from_fn(width, height, |x, y| {
                Rgba([0, 0, 0, alphas[(y * 24 + x) as usize]])
            });
            let seed_x = (seed_pick % width as usize) as u32;
            let seed_y = ((seed_pick / width as usize) % height as usize) as u32;

            let scan = trace_component(&image, (seed_x, seed_y), 10).expect("trace succeeds");
            prop_assert_eq!(scan.bounds, reference_bounds(&image, (seed_x, seed_y), 10));
            prop_assert!(scan.bounds.contains(seed_x, seed_y));

            let rect = scan.bounds.padded(padding, width, height);
            prop_assert!(rect.left <= rect.right && rect.right <= width);
            prop_assert!(rect.top <= rect.bottom && rect.bottom <= height);
            prop_assert!(rect.width() >= 1 && rect.height() >= 1);
        }
    }
}

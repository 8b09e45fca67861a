//! 生成产物存储目录管理模块
//!
//! # 设计思路
//!
//! 统一管理生成结果（角色、背景、道具、参考图）的落盘路径，
//! 并在目录不存在时自动创建。
//!
//! # 实现思路
//!
//! - 根目录下固定四个子目录：`characters` / `backgrounds` / `items` / `references`。
//! - 文件名为 `前缀_时间戳.png`，时间戳精确到微秒，连续生成不会覆盖。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::error::AppError;
use crate::image_handler::ImageError;

/// 产物分类，对应根目录下的子目录。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Character,
    Background,
    Item,
    Reference,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Character,
        AssetKind::Background,
        AssetKind::Item,
        AssetKind::Reference,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Character => "characters",
            Self::Background => "backgrounds",
            Self::Item => "items",
            Self::Reference => "references",
        }
    }
}

/// 输出目录布局。
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// 以 `root` 为根创建布局，并确保所有子目录存在。
    ///
    /// # 返回
    /// - `Ok(OutputLayout)`：目录已就绪
    /// - `Err(AppError::Storage)`：无法创建目录
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let layout = Self { root: root.into() };

        for kind in AssetKind::ALL {
            let dir = layout.dir(kind);
            if !dir.exists() {
                fs::create_dir_all(&dir).map_err(|e| {
                    AppError::Storage(format!("创建目录 '{}' 失败: {}", dir.display(), e))
                })?;
            }
        }

        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, kind: AssetKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// 为某类产物生成一个新的文件路径。
    pub fn next_path(&self, kind: AssetKind, prefix: &str) -> PathBuf {
        timestamped_png(&self.dir(kind), prefix)
    }

    /// 保存图片到对应分类目录，返回写入路径。
    pub fn save(
        &self,
        kind: AssetKind,
        prefix: &str,
        image: &DynamicImage,
    ) -> Result<PathBuf, ImageError> {
        let path = self.next_path(kind, prefix);
        save_png(image, &path)?;
        Ok(path)
    }
}

/// 生成 `prefix_YYYYmmddHHMMSSffffff.png` 形式的路径。
pub fn timestamped_png(dir: &Path, prefix: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d%H%M%S%6f");
    dir.join(format!("{}_{}.png", prefix, timestamp))
}

/// 以 PNG 格式写出图片，父目录不存在时自动创建。
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<(), ImageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                ImageError::FileSystem(format!("创建目录 '{}' 失败: {}", parent.display(), e))
            })?;
        }
    }

    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| ImageError::Encode(format!("写入 PNG '{}' 失败: {}", path.display(), e)))?;

    log::info!("💾 已保存图片: {}", path.display());
    Ok(())
}

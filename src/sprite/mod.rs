//! # 精灵图核心算法（sprite）
//!
//! ## 设计思路
//!
//! 这里只放纯函数：输入是已解码的内存图像，输出是新的数据，不做 I/O、不持有全局状态。
//! 来源识别、解码、落盘都在 `image_handler` 完成后再调用这里。
//!
//! - `seed`：前景种子定位（中心透明时向外稀疏扫描）
//! - `component`：4 邻接泛洪 + 包围盒 + 外扩裁剪矩形
//! - `sheet`：帧序列铺底、等高缩放与横向拼接
//!
//! ```text
//! 生成结果(单帧) ──► locate_seed ──► extract_crop_box ──► crop_imm（由调用方执行）
//! 生成结果(多帧) ──────────────────────────────────────► combine_horizontal ──► 精灵图
//! ```
//!
//! 两条链路相互独立，拼接不依赖裁剪是否执行过。

mod component;
mod seed;
mod sheet;

pub use component::{BoundingBox, ComponentScan, CropRect, extract_crop_box, trace_component};
pub use seed::{SeedSearch, locate_seed, locate_seed_with};
pub use sheet::{
    SheetOptions, combine_horizontal, combine_horizontal_with, normalize_opaque, scaled_width,
};

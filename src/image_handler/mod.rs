//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“图片来源识别 → 加载校验 → 解码 → 裁剪 / 拼接 → 几何变换”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：显式构造的服务对象（`ImageServiceState`）
//! - `handler`：编排整条处理流水线
//! - `loader`：负责文件 / 字节 / Base64 加载与安全校验
//! - `pipeline`：负责解码、像素限制、高质量缩放
//! - `transform`：翻转、旋转、等比缩放留白
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 实现思路
//!
//! 对外仅暴露必要类型，内部细节保持 `mod` 私有。
//! 核心算法放在 `crate::sprite`，这里只负责把任意来源变成 `DynamicImage` 再交给算法。
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! 调用方（CLI / 生成流程）
//!    ↓
//! service.rs（服务入口）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（来源加载 + 体积 / 签名校验）
//!    ├─ pipeline.rs（解码 + 像素限制 + 缩放）
//!    └─ crate::sprite（种子定位 / 连通域裁剪 / 横向拼接）
//!    ↓
//! 返回 ImageError，由 crate 边界上转为 AppError
//! ```
//!
//! ## 分层职责建议
//!
//! - 配置与策略变更优先改 `config.rs`
//! - 业务流程顺序变更优先改 `handler.rs`
//! - 新增输入来源：先在 `source.rs` 加变体，编译器会指出 `handler.rs` 中需要补的分支

mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod service;
mod source;
mod transform;

pub use config::{ImageConfig, ImagePerformanceProfile};
pub use error::ImageError;
pub use handler::{CombineReport, CropOutcome};
pub use service::ImageServiceState;
pub use source::ImageSource;
pub use transform::{flip_horizontal, resize_with_padding, rotate_180, rotate_270, rotate_90};

/// 内部核心编排器，通过 `ImageServiceState` 对外提供能力。
pub(crate) use handler::ImageHandler;
pub(crate) use pipeline::resize_rgb;

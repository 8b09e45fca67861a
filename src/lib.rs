//! # 2D 游戏素材工具：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        调用方（CLI / 上层 UI / 生成流程）                 │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕                                                  │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ image_handler  来源识别·解码·裁剪/拼接编排·几何变换   │
//! │  │   └─ sprite     种子定位 / 连通域裁剪 / 横向拼接       │
//! │  │                                                       │
//! │  ├─ generation     远程生成 trait + Gemini + 资源/逐帧编排 │
//! │  ├─ prompt         风格偏好与提示词模板                   │
//! │  ├─ preset         风格预设 JSON 存储                     │
//! │  └─ storage        产物目录布局与 PNG 落盘                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`image_handler`] | 从文件/字节/Base64/像素加载图片，编排自动裁剪与精灵图拼接 |
//! | [`sprite`] | 纯算法：前景种子定位、4 邻接连通域裁剪框、帧序列横向拼接 |
//! | [`generation`] | `AssetGenerator` trait、Gemini HTTP 客户端、单资源生成服务 `AssetService`、顺序逐帧生成 |
//! | [`prompt`] | `StylePreferences` 与各类提示词模板、预览 |
//! | [`preset`] | 命名风格预设的保存、读取、列举、删除 |
//! | [`storage`] | 输出目录布局、时间戳文件名、PNG 写出 |

pub mod error;
pub mod generation;
pub mod image_handler;
pub mod preset;
pub mod prompt;
pub mod sprite;
pub mod storage;

//! # 2D 游戏素材工具：命令行入口
//!
//! 本文件仅负责日志初始化与参数分发，业务逻辑见 `lib.rs` 架构文档。
//!
//! ```text
//! sprite-forge crop <input> <output>
//! sprite-forge combine <output> <frame>...
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use image::DynamicImage;
use sprite_forge::error::AppError;
use sprite_forge::image_handler::{ImageServiceState, ImageSource};
use sprite_forge::storage;

const USAGE: &str = "用法:\n  sprite-forge crop <input> <output>\n  sprite-forge combine <output> <frame>...";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ {}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), AppError> {
    let service = ImageServiceState::new()?;

    match args {
        [command, input, output] if command == "crop" => crop(&service, Path::new(input), Path::new(output)),
        [command, output, frames @ ..] if command == "combine" && !frames.is_empty() => {
            combine(&service, Path::new(output), frames)
        }
        _ => Err(AppError::Usage(USAGE.to_string())),
    }
}

fn crop(service: &ImageServiceState, input: &Path, output: &Path) -> Result<(), AppError> {
    let outcome = service.auto_crop_file(input, output)?;
    log::info!(
        "✂️ 裁剪区域 ({}, {}) - ({}, {})，已写入 {}",
        outcome.rect.left,
        outcome.rect.top,
        outcome.rect.right,
        outcome.rect.bottom,
        output.display()
    );
    Ok(())
}

fn combine(service: &ImageServiceState, output: &Path, frames: &[String]) -> Result<(), AppError> {
    let sources = frames
        .iter()
        .map(|frame| ImageSource::FilePath(PathBuf::from(frame)))
        .collect();

    let report = service.combine(sources)?;
    for (index, err) in &report.skipped {
        log::warn!("⚠️ 已跳过第 {} 帧（{}）：{}", index, frames[*index], err);
    }

    storage::save_png(&DynamicImage::ImageRgb8(report.sheet), output)?;
    log::info!("🎞️ 精灵图已写入 {}（{} 帧）", output.display(), report.frame_count);
    Ok(())
}

//! # 单资源生成流程
//!
//! ## 设计思路
//!
//! `AssetService` 把“提示词模板 → 远程生成 → 按分类落盘”串成一条链路：
//! 角色、像素风角色、背景、道具、多动作精灵、内置动作帧序列，以及用户上传参考图的保存。
//! 生成器通过 `AssetGenerator` 注入，输出目录由 `OutputLayout` 管理。
//!
//! ## 实现思路
//!
//! - 描述为空时直接拒绝，不发起请求。
//! - 多次调用的流程（多动作精灵、帧序列）严格顺序执行，两次请求之间间隔 `frame_delay`。
//! - 多动作精灵遇到任何错误立即返回，已保存的文件保留在磁盘上。

use std::path::PathBuf;
use std::time::Duration;

use image::DynamicImage;

use super::{
    ActionSet, AssetGenerator, FrameSequenceRunner, GeminiClient, GeminiConfig, GenerationError,
    GenerationRequest, SequenceReport,
};
use crate::error::AppError;
use crate::image_handler::{ImageServiceState, ImageSource};
use crate::prompt::{self, Orientation, PixelCharacterSpec, StylePreferences};
use crate::storage::{AssetKind, OutputLayout};

const DEFAULT_FRAME_DELAY: Duration = Duration::from_secs(3);

/// 已保存的单个资源。
#[derive(Debug, Clone)]
pub struct SavedAsset {
    pub path: PathBuf,
    pub image: DynamicImage,
}

/// 多动作精灵中的一项。
#[derive(Debug, Clone)]
pub struct SpriteAsset {
    pub action: String,
    pub path: PathBuf,
    pub image: DynamicImage,
}

/// 帧序列生成结果及其落盘路径（帧在前，精灵图最后）。
#[derive(Debug)]
pub struct SavedSequence {
    pub report: SequenceReport,
    pub paths: Vec<PathBuf>,
}

/// 资源生成服务。
pub struct AssetService<G> {
    generator: G,
    layout: OutputLayout,
    frame_delay: Duration,
}

impl AssetService<GeminiClient> {
    /// 从环境变量构建 Gemini 客户端与输出目录。
    pub fn from_env() -> Result<Self, AppError> {
        let config = GeminiConfig::from_env()?;
        let client = GeminiClient::new(config.clone())?;
        Self::from_config(client, &config)
    }
}

impl<G: AssetGenerator> AssetService<G> {
    pub fn new(generator: G, layout: OutputLayout) -> Self {
        Self {
            generator,
            layout,
            frame_delay: DEFAULT_FRAME_DELAY,
        }
    }

    /// 以 `config.output_dir` 为输出根目录、`config.frame_delay` 为请求间隔。
    pub fn from_config(generator: G, config: &GeminiConfig) -> Result<Self, AppError> {
        let layout = OutputLayout::new(&config.output_dir)?;
        Ok(Self::new(generator, layout).frame_delay(config.frame_delay))
    }

    pub fn frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// 校验并保存用户上传的参考图到 `references` 目录。
    ///
    /// 来源先经过统一解码入口，无法解码的输入不会落盘。
    pub fn save_reference_image(
        &self,
        images: &ImageServiceState,
        source: ImageSource,
    ) -> Result<SavedAsset, GenerationError> {
        let image = images.decode(source)?;
        let path = self.layout.save(AssetKind::Reference, "reference", &image)?;
        log::info!("📎 参考图已保存: {}", path.display());
        Ok(SavedAsset { path, image })
    }

    pub async fn generate_character(
        &self,
        description: &str,
        style: Option<&StylePreferences>,
        reference: Option<&DynamicImage>,
    ) -> Result<SavedAsset, GenerationError> {
        require_description(description)?;
        let request = build_request(prompt::character_prompt(description, style), reference);
        self.generate_and_save(&request, AssetKind::Character, "character")
            .await
    }

    /// 像素风 Q 版角色（正面、白底），保存在 `characters` 目录。
    pub async fn generate_pixel_character(
        &self,
        spec: PixelCharacterSpec<'_>,
    ) -> Result<SavedAsset, GenerationError> {
        require_description(spec.description)?;
        let request = GenerationRequest::new(prompt::pixel_character_prompt(spec));
        self.generate_and_save(&request, AssetKind::Character, "character")
            .await
    }

    pub async fn generate_background(
        &self,
        description: &str,
        orientation: Orientation,
        style: Option<&StylePreferences>,
    ) -> Result<SavedAsset, GenerationError> {
        require_description(description)?;
        let request = GenerationRequest::new(prompt::background_prompt(description, orientation, style));
        let prefix = format!("background_{}", orientation.as_str());
        self.generate_and_save(&request, AssetKind::Background, &prefix)
            .await
    }

    pub async fn generate_item(
        &self,
        description: &str,
        style: Option<&StylePreferences>,
        reference: Option<&DynamicImage>,
    ) -> Result<SavedAsset, GenerationError> {
        require_description(description)?;
        let request = build_request(prompt::item_prompt(description, style), reference);
        self.generate_and_save(&request, AssetKind::Item, "item").await
    }

    /// 为每个动作各生成一张精灵，按输入顺序返回。
    pub async fn generate_character_sprites(
        &self,
        description: &str,
        actions: &[&str],
        style: Option<&StylePreferences>,
        reference: Option<&DynamicImage>,
    ) -> Result<Vec<SpriteAsset>, GenerationError> {
        require_description(description)?;
        let mut sprites = Vec::with_capacity(actions.len());

        for (index, action) in actions.iter().enumerate() {
            if index > 0 && !self.frame_delay.is_zero() {
                tokio::time::sleep(self.frame_delay).await;
            }

            let request = build_request(prompt::sprite_prompt(description, action, style), reference);
            let prefix = format!("character_{}", action);
            let saved = self
                .generate_and_save(&request, AssetKind::Character, &prefix)
                .await?;

            log::info!("✅ 动作 {} 生成完成（{}/{}）", action, index + 1, actions.len());
            sprites.push(SpriteAsset {
                action: action.to_string(),
                path: saved.path,
                image: saved.image,
            });
        }

        Ok(sprites)
    }

    /// 运行内置动作帧序列，并把帧与精灵图保存到 `characters` 目录。
    pub async fn generate_action_sequence(
        &self,
        action: ActionSet,
        reference: Option<&DynamicImage>,
    ) -> Result<SavedSequence, GenerationError> {
        let runner = FrameSequenceRunner::new(&self.generator, self.frame_delay);
        let report = runner.run(&action.frames(), reference).await?;
        let paths = report.save(&self.layout, action.as_str())?;
        Ok(SavedSequence { report, paths })
    }

    async fn generate_and_save(
        &self,
        request: &GenerationRequest,
        kind: AssetKind,
        prefix: &str,
    ) -> Result<SavedAsset, GenerationError> {
        let image = self.generator.generate(request).await?.into_image()?;
        let path = self.layout.save(kind, prefix, &image)?;
        Ok(SavedAsset { path, image })
    }
}

fn require_description(description: &str) -> Result<(), GenerationError> {
    if description.trim().is_empty() {
        return Err(GenerationError::InvalidConfig("资源描述不能为空".to_string()));
    }
    Ok(())
}

fn build_request(prompt: String, reference: Option<&DynamicImage>) -> GenerationRequest {
    let request = GenerationRequest::new(prompt);
    match reference {
        Some(reference) => request.with_reference(reference.clone()),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::{ScriptedGenerator, frame_image};
    use image::{Rgba, RgbaImage};
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("sprite_forge_assets_{}", nanos))
    }

    fn scripted_service(script: Vec<Result<crate::generation::GeneratedMedia, GenerationError>>) -> AssetService<ScriptedGenerator> {
        let layout = OutputLayout::new(unique_temp_dir()).expect("layout init failed");
        AssetService::new(ScriptedGenerator::new(script), layout).frame_delay(Duration::ZERO)
    }

    fn file_name(path: &Path) -> &str {
        path.file_name().and_then(|n| n.to_str()).expect("utf-8 file name")
    }

    fn in_dir(service: &AssetService<ScriptedGenerator>, kind: AssetKind, path: &Path) -> bool {
        path.parent() == Some(service.layout().dir(kind).as_path())
    }

    #[tokio::test]
    async fn character_is_saved_with_reference_attached() {
        let service = scripted_service(vec![Ok(frame_image(40))]);
        let reference = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));

        let saved = service
            .generate_character("a knight", None, Some(&reference))
            .await
            .expect("character generation succeeds");

        assert!(in_dir(&service, AssetKind::Character, &saved.path));
        assert!(file_name(&saved.path).starts_with("character_"));
        assert!(saved.path.is_file());

        let seen = service.generator().seen.lock().expect("seen lock");
        assert_eq!(seen[0].references.len(), 1);
        assert!(seen[0].prompt.starts_with("Create a character image"));

        let _ = std::fs::remove_dir_all(service.layout().root());
    }

    #[tokio::test]
    async fn background_and_item_land_in_their_directories() {
        let service = scripted_service(vec![Ok(frame_image(10)), Ok(frame_image(20))]);

        let background = service
            .generate_background("a forest", Orientation::Portrait, None)
            .await
            .expect("background generation succeeds");
        let item = service
            .generate_item("a potion", None, None)
            .await
            .expect("item generation succeeds");

        assert!(in_dir(&service, AssetKind::Background, &background.path));
        assert!(file_name(&background.path).starts_with("background_portrait_"));
        assert!(in_dir(&service, AssetKind::Item, &item.path));
        assert!(file_name(&item.path).starts_with("item_"));

        let prompts = service.generator().prompts();
        assert!(prompts[0].contains("portrait orientation (9:16 aspect ratio)"));
        assert!(prompts[1].starts_with("Create a 2D game item sprite"));

        let _ = std::fs::remove_dir_all(service.layout().root());
    }

    #[tokio::test]
    async fn pixel_character_uses_pixel_prompt() {
        let service = scripted_service(vec![Ok(frame_image(90))]);

        let saved = service
            .generate_pixel_character(PixelCharacterSpec {
                description: "a baker",
                weapon: "Baguette",
                ..PixelCharacterSpec::default()
            })
            .await
            .expect("pixel character generation succeeds");

        assert!(in_dir(&service, AssetKind::Character, &saved.path));
        let prompts = service.generator().prompts();
        assert!(prompts[0].starts_with("Create a PIXEL ART character sprite"));
        assert!(prompts[0].contains("Weapon: Long French bread baguette"));

        let _ = std::fs::remove_dir_all(service.layout().root());
    }

    #[tokio::test]
    async fn sprites_follow_action_order() {
        let service = scripted_service(vec![Ok(frame_image(1)), Ok(frame_image(2)), Ok(frame_image(3))]);

        let sprites = service
            .generate_character_sprites("a knight", &["idle", "walk", "attack"], None, None)
            .await
            .expect("sprite generation succeeds");

        let actions: Vec<&str> = sprites.iter().map(|s| s.action.as_str()).collect();
        assert_eq!(actions, ["idle", "walk", "attack"]);
        assert!(file_name(&sprites[1].path).starts_with("character_walk_"));
        assert!(service.generator().prompts()[2].contains("performing the action: attack"));

        let _ = std::fs::remove_dir_all(service.layout().root());
    }

    #[tokio::test]
    async fn sprite_loop_stops_on_first_error() {
        let service = scripted_service(vec![
            Ok(frame_image(1)),
            Err(GenerationError::Quota("429".to_string())),
            Ok(frame_image(3)),
        ]);

        let result = service
            .generate_character_sprites("a knight", &["idle", "walk", "attack"], None, None)
            .await;

        assert!(matches!(result, Err(GenerationError::Quota(_))));
        assert_eq!(service.generator().calls(), 2);

        let _ = std::fs::remove_dir_all(service.layout().root());
    }

    #[tokio::test(start_paused = true)]
    async fn sprite_loop_waits_between_requests() {
        let service = scripted_service(vec![Ok(frame_image(1)), Ok(frame_image(2))]).frame_delay(Duration::from_secs(3));

        let start = tokio::time::Instant::now();
        service
            .generate_character_sprites("a knight", &["idle", "walk"], None, None)
            .await
            .expect("sprite generation succeeds");

        assert_eq!(start.elapsed(), Duration::from_secs(3));

        let _ = std::fs::remove_dir_all(service.layout().root());
    }

    #[tokio::test]
    async fn blank_description_is_rejected_without_calling_generator() {
        let service = scripted_service(Vec::new());

        let result = service.generate_item("   ", None, None).await;

        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
        assert_eq!(service.generator().calls(), 0);

        let _ = std::fs::remove_dir_all(service.layout().root());
    }

    #[tokio::test]
    async fn action_sequence_saves_frames_and_sheet() {
        let script = (0..5).map(|i| Ok(frame_image(i * 40))).collect();
        let service = scripted_service(script);

        let saved = service
            .generate_action_sequence(ActionSet::Dead, None)
            .await
            .expect("sequence generation succeeds");

        assert_eq!(saved.paths.len(), 6);
        assert!(file_name(&saved.paths[0]).starts_with("dead_"));
        assert!(file_name(&saved.paths[5]).starts_with("dead_combined_"));
        assert!(saved.report.sheet.is_some());

        let _ = std::fs::remove_dir_all(service.layout().root());
    }

    #[test]
    fn reference_image_is_validated_and_saved() {
        let service = scripted_service(Vec::new());
        let images = ImageServiceState::new().expect("image service init failed");
        let reference = DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([9, 9, 9, 255])));

        let saved = service
            .save_reference_image(&images, ImageSource::Decoded(reference))
            .expect("reference saved");
        assert!(in_dir(&service, AssetKind::Reference, &saved.path));
        assert!(file_name(&saved.path).starts_with("reference_"));

        let broken = service.save_reference_image(&images, ImageSource::Bytes(b"not an image".to_vec()));
        assert!(matches!(broken, Err(GenerationError::Image(_))));

        let _ = std::fs::remove_dir_all(service.layout().root());
    }

    #[test]
    fn from_config_uses_output_dir_and_delay() {
        let mut config = GeminiConfig::new("key");
        config.output_dir = unique_temp_dir();
        config.frame_delay = Duration::from_millis(5);

        let service = AssetService::from_config(ScriptedGenerator::new(Vec::new()), &config)
            .expect("service from config");

        assert_eq!(service.layout().root(), config.output_dir.as_path());
        assert!(service.layout().dir(AssetKind::Reference).is_dir());
        assert_eq!(service.frame_delay, Duration::from_millis(5));

        let _ = std::fs::remove_dir_all(&config.output_dir);
    }
}

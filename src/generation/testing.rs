//! 测试用脚本化生成器。

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use image::{DynamicImage, Rgba, RgbaImage};

use super::{AssetGenerator, GeneratedMedia, GenerationError, GenerationRequest};

/// 按脚本依次返回结果，并记录收到的请求。
pub(crate) struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<GeneratedMedia, GenerationError>>>,
    pub(crate) seen: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(script: Vec<Result<GeneratedMedia, GenerationError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.lock().expect("seen lock").len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.seen
            .lock()
            .expect("seen lock")
            .iter()
            .map(|request| request.prompt.clone())
            .collect()
    }
}

impl AssetGenerator for ScriptedGenerator {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<GeneratedMedia, GenerationError>> + Send {
        self.seen.lock().expect("seen lock").push(request.clone());
        let next = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::EmptyResponse("script exhausted".to_string())));
        async move { next }
    }
}

pub(crate) fn frame_image(shade: u8) -> GeneratedMedia {
    GeneratedMedia::Image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        10,
        10,
        Rgba([shade, shade, shade, 255]),
    )))
}

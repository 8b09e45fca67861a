//! # Gemini HTTP 客户端
//!
//! ## 设计思路
//!
//! 直接调用 `models/{model}:generateContent` REST 接口：
//! 请求体由一段文本与若干 PNG 参考图（Base64 内联）组成，
//! 响应中取第一个 `inlineData` 部分作为生成结果。
//!
//! ## 实现思路
//!
//! - 配置从环境变量读取（`GEMINI_API_KEY` 必填）。
//! - 超时 / 5xx / 网络抖动按指数退避 + 抖动重试。
//! - 429 或响应体含 `RESOURCE_EXHAUSTED` 直接映射为 `Quota`，不重试。

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{AssetGenerator, GeneratedMedia, GenerationError, GenerationRequest};
use crate::image_handler::ImageError;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
const DEFAULT_OUTPUT_DIR: &str = "data/output";
const RETRY_BASE_DELAY_MS: u64 = 500;
const ERROR_BODY_PREVIEW_CHARS: usize = 300;

/// Gemini 调用配置。
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// API 根地址（不含 `/models/...`）。
    pub endpoint: String,
    /// 生成产物根目录。
    pub output_dir: PathBuf,
    /// 逐帧生成时两次请求之间的间隔。
    pub frame_delay: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// 单次请求最大尝试次数（含首次）。
    pub max_attempts: u8,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            frame_delay: Duration::from_secs(3),
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            max_attempts: 3,
        }
    }

    /// 从进程环境变量读取配置。
    pub fn from_env() -> Result<Self, GenerationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意键值查找函数读取配置。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GenerationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = non_empty("GEMINI_API_KEY").ok_or_else(|| {
            GenerationError::InvalidConfig("未设置 GEMINI_API_KEY 环境变量".to_string())
        })?;

        let mut config = Self::new(api_key);
        if let Some(model) = non_empty("IMAGE_MODEL_NAME") {
            config.model = model;
        }
        if let Some(output_dir) = non_empty("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(output_dir);
        }

        Ok(config)
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateContentBody {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "inlineData", alias = "inline_data")]
    inline_data: Option<InlineData>,
}

/// Gemini 图像生成客户端。
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::InvalidConfig("API Key 不能为空".to_string()));
        }
        if config.max_attempts == 0 {
            return Err(GenerationError::InvalidConfig("max_attempts 至少为 1".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GenerationError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn build_body(request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        let mut parts = vec![RequestPart::Text {
            text: request.prompt.clone(),
        }];

        for reference in &request.references {
            parts.push(RequestPart::Inline {
                inline_data: InlineData {
                    mime_type: "image/png".to_string(),
                    data: general_purpose::STANDARD.encode(encode_png(reference)?),
                },
            });
        }

        let body = GenerateContentBody {
            contents: vec![RequestContent { parts }],
        };
        serde_json::to_vec(&body)
            .map_err(|e| GenerationError::InvalidConfig(format!("请求体序列化失败：{}", e)))
    }

    async fn post_with_retry(&self, body: Vec<u8>) -> Result<Vec<u8>, GenerationError> {
        let url = self.config.generate_url();
        let mut attempt: u8 = 1;

        loop {
            let sent = self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone())
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= self.config.max_attempts || !is_retryable_network_error(&err) {
                        return Err(GenerationError::Network(err.to_string()));
                    }
                    let delay_ms = compute_retry_delay_with_jitter(attempt);
                    log::warn!(
                        "⚠️ 生成请求失败（第 {}/{} 次，可重试）：{}；{}ms 后重试",
                        attempt,
                        self.config.max_attempts,
                        err,
                        delay_ms
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempt = attempt.saturating_add(1);
                    continue;
                }
            };

            let status = response.status();
            let bytes = response
                .bytes()
                .await
                .map_err(|e| GenerationError::Network(format!("读取响应失败：{}", e)))?;

            if status.is_success() {
                return Ok(bytes.to_vec());
            }

            let text = String::from_utf8_lossy(&bytes);
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                || GenerationError::mentions_quota(&text)
            {
                log::error!("❌ 生成配额已耗尽（HTTP {}）", status.as_u16());
                return Err(GenerationError::Quota(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    preview(&text)
                )));
            }

            if attempt < self.config.max_attempts && is_retryable_http_status(status) {
                let delay_ms = compute_retry_delay_with_jitter(attempt);
                log::warn!(
                    "⚠️ HTTP {}（第 {}/{} 次，可重试）；{}ms 后重试",
                    status.as_u16(),
                    attempt,
                    self.config.max_attempts,
                    delay_ms
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt = attempt.saturating_add(1);
                continue;
            }

            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: preview(&text),
            });
        }
    }

    fn parse_response(bytes: &[u8]) -> Result<GeneratedMedia, GenerationError> {
        let response: GenerateContentResponse = serde_json::from_slice(bytes).map_err(|e| {
            GenerationError::EmptyResponse(format!("响应不是合法 JSON：{}", e))
        })?;

        let mut texts = Vec::new();
        let parts = response
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts);

        for part in parts {
            if let Some(inline) = part.inline_data {
                let data = general_purpose::STANDARD
                    .decode(inline.data.trim())
                    .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))?;

                if inline.mime_type.starts_with("video/") {
                    return Ok(GeneratedMedia::Video(data));
                }

                let image = image::load_from_memory(&data)
                    .map_err(|e| ImageError::Decode(format!("生成图片解码失败：{}", e)))?;
                return Ok(GeneratedMedia::Image(image));
            }
            if let Some(text) = part.text {
                texts.push(text);
            }
        }

        Err(GenerationError::EmptyResponse(if texts.is_empty() {
            "响应中没有 inlineData".to_string()
        } else {
            preview(&texts.join(" "))
        }))
    }
}

impl AssetGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedMedia, GenerationError> {
        log::info!(
            "🎨 请求生成 - 模型: {} 参考图: {} 张",
            self.config.model,
            request.references.len()
        );

        let body = Self::build_body(request)?;
        let bytes = self.post_with_retry(body).await?;
        Self::parse_response(&bytes)
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| ImageError::Encode(format!("参考图编码失败：{}", e)))?;
    Ok(cursor.into_inner())
}

fn preview(text: &str) -> String {
    text.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}

fn compute_retry_delay_with_jitter(attempt: u8) -> u64 {
    let base = RETRY_BASE_DELAY_MS.saturating_mul(1_u64 << (attempt.saturating_sub(1) as u32));
    let jitter_bound = (base / 2).max(1);
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    base.saturating_add(seed % (jitter_bound + 1))
}

fn is_retryable_http_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::REQUEST_TIMEOUT || status.is_server_error()
}

fn is_retryable_network_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

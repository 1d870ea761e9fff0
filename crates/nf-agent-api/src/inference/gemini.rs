//! Gemini client for free-form questions.
//!
//! Calls `POST {base_url}/models/{model}:generateContent` once per question,
//! with the two CSV files attached inline (or a text summary of them).
//! Failures and timeouts are surfaced, never retried.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::{FallbackContext, FallbackError, TextGenerator};

const SYSTEM_PROMPT: &str = "Você responde perguntas sobre notas fiscais eletrônicas \
usando os dados fornecidos.
- Forneça uma resposta clara e direta
- Use os dados fornecidos acima
- Seja específico e inclua números quando possível
- Use emojis para tornar a resposta mais amigável
- Não inclua explicações técnicas ou código
- Responda em português brasileiro";

/// Error bodies longer than this are cut before they reach logs or clients.
const MAX_ERROR_BODY: usize = 512;

/// What the model receives along with the question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// Both CSV files, base64 `inlineData` parts.
    #[default]
    RawFiles,
    /// The plain-text dataset overview only.
    Summary,
}

/// Configuration for the Gemini endpoint.
#[derive(Clone, Deserialize)]
pub struct GeminiConfig {
    /// API key; without one the fallback tier is disabled.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// API base URL, without the `/models/...` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub context_mode: ContextMode,
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_temperature() -> f32 {
    0.3
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            context_mode: ContextMode::default(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("context_mode", &self.context_mode)
            .finish()
    }
}

/// generateContent request body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

/// generateContent response (only fields we need).
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Client for the Gemini generateContent endpoint.
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiGenerator {
    /// Fails with `FallbackError::Disabled` when no API key is configured.
    pub fn new(config: GeminiConfig) -> Result<Self, FallbackError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(FallbackError::Disabled)?
            .to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FallbackError::Request(e.to_string()))?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn user_parts(
        &self,
        question: &str,
        context: &FallbackContext,
    ) -> Result<Vec<Part>, FallbackError> {
        let mut parts = Vec::with_capacity(context.attachments.len() + 1);
        match self.config.context_mode {
            ContextMode::RawFiles => {
                if context.attachments.is_empty() {
                    return Err(FallbackError::NoAttachments);
                }
                parts.extend(context.attachments.iter().map(|attachment| Part::InlineData {
                    inline_data: InlineData {
                        mime_type: attachment.mime_type,
                        data: STANDARD.encode(&attachment.data),
                    },
                }));
                parts.push(Part::Text {
                    text: question.to_string(),
                });
            }
            ContextMode::Summary => parts.push(Part::Text {
                text: format!("{}\n\nPERGUNTA: {question}", context.summary),
            }),
        }
        Ok(parts)
    }

    fn request_error(&self, err: reqwest::Error) -> FallbackError {
        if err.is_timeout() {
            FallbackError::Timeout(self.config.timeout_secs)
        } else {
            FallbackError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(
        &self,
        question: &str,
        context: &FallbackContext,
    ) -> Result<String, FallbackError> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: self.user_parts(question, context)?,
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "text/plain",
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        };

        tracing::debug!(model = %self.config.model, "calling gemini");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(FallbackError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                FallbackError::Timeout(self.config.timeout_secs)
            } else {
                FallbackError::Decode(e.to_string())
            }
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(FallbackError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

//! Google Gemini `generateContent` adapter.

use std::fmt;

use async_trait::async_trait;
use futures::stream;
use serde::{Deserialize, Serialize};

use crate::http_client::ProviderHttp;
use crate::{
    AdapterConfig, AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk,
    InferenceRequest, MessageRole, ModelAdapter, PromptMessage, ResponseFormat,
};

/// Public Generative Language API.
pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Talks to `v1beta/models/{model}:generateContent`, keyed by header.
pub struct GeminiAdapter {
    http: ProviderHttp,
    metadata: AdapterMetadata,
    api_key: String,
    default_temperature: Option<f32>,
}

impl fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("http", &self.http)
            .field("model", &self.metadata.model())
            .finish_non_exhaustive()
    }
}

impl GeminiAdapter {
    /// # Errors
    ///
    /// [`AdapterError::Configuration`] without an API key.
    pub fn new(config: AdapterConfig) -> AdapterResult<Self> {
        let api_key = config.require_api_key("Gemini")?;
        let endpoint = format!(
            "{}v1beta/models/{}:generateContent",
            config.base_url_or(GEMINI_DEFAULT_BASE_URL),
            config.model()
        );
        Ok(Self {
            http: ProviderHttp::new("Gemini", &endpoint, config.timeout())?,
            metadata: AdapterMetadata::new("gemini", config.model()),
            api_key,
            default_temperature: config.default_temperature(),
        })
    }

    fn payload(&self, request: &InferenceRequest) -> GenerateContent {
        let generation_config = GenerationConfig {
            temperature: request.temperature().or(self.default_temperature),
            max_output_tokens: request.max_output_tokens(),
            response_mime_type: (request.response_format() == ResponseFormat::Json)
                .then_some("application/json"),
        };

        GenerateContent {
            system_instruction: request.system_prompt().map(|text| Instruction {
                parts: vec![Part::from(text)],
            }),
            // System messages travel in systemInstruction only.
            contents: request
                .messages()
                .iter()
                .filter(|message| message.role() != MessageRole::System)
                .map(Turn::from)
                .collect(),
            generation_config: (!generation_config.is_empty()).then_some(generation_config),
        }
    }
}

#[async_trait]
impl ModelAdapter for GeminiAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        let reply: GenerateContentReply = self
            .http
            .call(&self.payload(&request), |builder| {
                builder.header(API_KEY_HEADER, self.api_key.as_str())
            })
            .await?;
        let text = reply.into_text()?;
        Ok(Box::pin(stream::once(async move {
            Ok(InferenceChunk::new(text, true))
        })))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Instruction>,
    contents: Vec<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Instruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Turn {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl From<&PromptMessage> for Turn {
    fn from(message: &PromptMessage) -> Self {
        let role = match message.role() {
            MessageRole::Assistant => "model",
            MessageRole::User | MessageRole::System => "user",
        };
        Self {
            role: role.to_owned(),
            parts: vec![Part::from(message.content())],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl From<&str> for Part {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl GenerationConfig {
    const fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.max_output_tokens.is_none()
            && self.response_mime_type.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Turn>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentReply {
    /// Text of the first candidate, all parts joined.
    fn into_text(self) -> AdapterResult<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(AdapterError::response(format!(
                "Gemini blocked the prompt: {reason}"
            )));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::response("Gemini returned no candidates"))?;

        let text: String = candidate
            .content
            .into_iter()
            .flat_map(|turn| turn.parts)
            .map(|part| part.text)
            .collect();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(AdapterError::response(format!(
                "Gemini returned an empty candidate (finish reason: {reason})"
            )));
        }
        Ok(text)
    }
}

//! `OpenAI` chat completions adapter. Any OpenAI-compatible gateway works
//! through [`AdapterConfig::with_base_url`].

use std::fmt;

use async_trait::async_trait;
use futures::stream;
use hyper::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use crate::http_client::ProviderHttp;
use crate::{
    AdapterConfig, AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk,
    InferenceRequest, MessageRole, ModelAdapter, PromptMessage, ResponseFormat,
};

/// Public API root.
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/";

/// Calls `v1/chat/completions` with a bearer token.
pub struct OpenAiAdapter {
    http: ProviderHttp,
    metadata: AdapterMetadata,
    bearer: String,
    default_temperature: Option<f32>,
}

impl fmt::Debug for OpenAiAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiAdapter")
            .field("http", &self.http)
            .field("model", &self.metadata.model())
            .finish_non_exhaustive()
    }
}

impl OpenAiAdapter {
    /// # Errors
    ///
    /// [`AdapterError::Configuration`] without an API key.
    pub fn new(config: AdapterConfig) -> AdapterResult<Self> {
        let api_key = config.require_api_key("OpenAI")?;
        let endpoint = format!(
            "{}v1/chat/completions",
            config.base_url_or(OPENAI_DEFAULT_BASE_URL)
        );
        Ok(Self {
            http: ProviderHttp::new("OpenAI", &endpoint, config.timeout())?,
            metadata: AdapterMetadata::new("openai", config.model()),
            bearer: format!("Bearer {api_key}"),
            default_temperature: config.default_temperature(),
        })
    }

    fn payload<'a>(&'a self, request: &'a InferenceRequest) -> ChatCompletion<'a> {
        let system = request
            .system_prompt()
            .map(|content| ChatMessage {
                role: MessageRole::System.as_str(),
                content,
            });

        ChatCompletion {
            model: self.metadata.model(),
            messages: system
                .into_iter()
                .chain(request.messages().iter().map(ChatMessage::from))
                .collect(),
            temperature: request.temperature().or(self.default_temperature),
            max_tokens: request.max_output_tokens(),
            response_format: (request.response_format() == ResponseFormat::Json)
                .then_some(JsonMode { kind: "json_object" }),
            stream: false,
        }
    }
}

#[async_trait]
impl ModelAdapter for OpenAiAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        let reply: ChatCompletionReply = self
            .http
            .call(&self.payload(&request), |builder| {
                builder.header(AUTHORIZATION, self.bearer.as_str())
            })
            .await?;

        let content = reply
            .choices
            .into_iter()
            .find_map(|choice| choice.message.and_then(|message| message.content))
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AdapterError::response("OpenAI returned no message content"))?;

        Ok(Box::pin(stream::once(async move {
            Ok(InferenceChunk::new(content, true))
        })))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletion<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<JsonMode>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a PromptMessage> for ChatMessage<'a> {
    fn from(message: &'a PromptMessage) -> Self {
        Self {
            role: message.role().as_str(),
            content: message.content(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonMode {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

//! Adapter for a local Ollama daemon (`/api/chat`). No API key.

use std::fmt;

use async_trait::async_trait;
use futures::stream;
use serde::{Deserialize, Serialize};

use crate::http_client::ProviderHttp;
use crate::{
    AdapterConfig, AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk,
    InferenceRequest, MessageRole, ModelAdapter, PromptMessage, ResponseFormat,
};

/// Where `ollama serve` listens by default.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434/";

/// Non-streaming chat against a local model.
pub struct OllamaAdapter {
    http: ProviderHttp,
    metadata: AdapterMetadata,
    default_temperature: Option<f32>,
}

impl fmt::Debug for OllamaAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaAdapter")
            .field("http", &self.http)
            .field("model", &self.metadata.model())
            .finish_non_exhaustive()
    }
}

impl OllamaAdapter {
    /// # Errors
    ///
    /// [`AdapterError::Configuration`] if the endpoint URL does not parse.
    pub fn new(config: AdapterConfig) -> AdapterResult<Self> {
        let endpoint = format!("{}api/chat", config.base_url_or(OLLAMA_DEFAULT_BASE_URL));
        Ok(Self {
            http: ProviderHttp::new("Ollama", &endpoint, config.timeout())?,
            metadata: AdapterMetadata::new("ollama", config.model()),
            default_temperature: config.default_temperature(),
        })
    }

    fn payload<'a>(&'a self, request: &'a InferenceRequest) -> ChatRequest<'a> {
        let system = request.system_prompt().map(|content| Message {
            role: MessageRole::System.as_str(),
            content,
        });

        let options = Options {
            temperature: request.temperature().or(self.default_temperature),
            num_predict: request.max_output_tokens(),
        };

        ChatRequest {
            model: self.metadata.model(),
            stream: false,
            messages: system
                .into_iter()
                .chain(request.messages().iter().map(Message::from))
                .collect(),
            format: (request.response_format() == ResponseFormat::Json).then_some("json"),
            options: (options.temperature.is_some() || options.num_predict.is_some())
                .then_some(options),
        }
    }
}

#[async_trait]
impl ModelAdapter for OllamaAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        let reply: ChatReply = self
            .http
            .call(&self.payload(&request), |builder| builder)
            .await?;

        // Ollama can answer 200 with an `error` field, e.g. for an unknown model.
        if let Some(error) = reply.error {
            return Err(AdapterError::response(format!("Ollama: {error}")));
        }

        let content = reply
            .message
            .map(|message| message.content)
            .or(reply.response)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AdapterError::response("Ollama returned no message content"))?;

        Ok(Box::pin(stream::once(async move {
            Ok(InferenceChunk::new(content, true))
        })))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Options>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a PromptMessage> for Message<'a> {
    fn from(message: &'a PromptMessage) -> Self {
        Self {
            role: message.role().as_str(),
            content: message.content(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    message: Option<ReplyMessage>,
    /// `/api/generate`-style body some proxies return instead.
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

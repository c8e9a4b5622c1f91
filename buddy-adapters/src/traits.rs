//! Provider-neutral request and response types, and the [`ModelAdapter`] seam.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::error::{AdapterError, AdapterResult};

/// Chunks of generated text, in order.
pub type AdapterStream = Pin<Box<dyn Stream<Item = AdapterResult<InferenceChunk>> + Send>>;

/// Which provider and model an adapter talks to. Used for logging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterMetadata {
    provider: &'static str,
    model: String,
}

impl AdapterMetadata {
    /// `provider` is a short lowercase tag such as `"openai"`.
    #[must_use]
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Provider tag.
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Model identifier as sent to the provider.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    /// Instructions to the model.
    System,
    /// The person asking.
    User,
    /// A previous model turn.
    Assistant,
}

impl MessageRole {
    /// Wire name shared by the OpenAI and Ollama chat APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptMessage {
    role: MessageRole,
    content: String,
}

impl PromptMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Who wrote it.
    #[must_use]
    pub const fn role(&self) -> MessageRole {
        self.role
    }

    /// Message text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Output format the caller expects from the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free-form text.
    #[default]
    Text,
    /// A single JSON object. Adapters switch the provider into its native
    /// JSON mode where one exists.
    Json,
}

/// A single generation call.
///
/// The system prompt is kept apart from the messages because providers
/// place it differently: OpenAI and Ollama take it as a leading `system`
/// message, Gemini as `systemInstruction`.
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceRequest {
    system_prompt: Option<String>,
    messages: Vec<PromptMessage>,
    max_output_tokens: Option<u32>,
    temperature: Option<f32>,
    response_format: ResponseFormat,
}

impl InferenceRequest {
    /// Starts a request from its messages.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidRequest`] when `messages` is empty.
    pub fn new(messages: Vec<PromptMessage>) -> AdapterResult<Self> {
        if messages.is_empty() {
            return Err(AdapterError::invalid_request("no messages to send"));
        }

        Ok(Self {
            system_prompt: None,
            messages,
            max_output_tokens: None,
            temperature: None,
            response_format: ResponseFormat::Text,
        })
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Caps the response length.
    #[must_use]
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Overrides the adapter's default temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Asks for text or JSON output.
    #[must_use]
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// System prompt, if any.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Conversation messages.
    #[must_use]
    pub fn messages(&self) -> &[PromptMessage] {
        &self.messages
    }

    /// Output cap, if any.
    #[must_use]
    pub const fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }

    /// Per-request temperature; adapters fall back to their configured default.
    #[must_use]
    pub const fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Requested output format.
    #[must_use]
    pub const fn response_format(&self) -> ResponseFormat {
        self.response_format
    }
}

/// A piece of generated text. `done` marks the last one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferenceChunk {
    /// Text produced since the previous chunk.
    pub delta: String,
    /// Set on the final chunk.
    pub done: bool,
}

impl InferenceChunk {
    /// Creates a chunk.
    #[must_use]
    pub fn new(delta: impl Into<String>, done: bool) -> Self {
        Self {
            delta: delta.into(),
            done,
        }
    }
}

/// Concatenates a stream's deltas up to and including the first `done`
/// chunk.
///
/// # Errors
///
/// Propagates the first chunk error.
pub async fn collect_text(mut stream: AdapterStream) -> AdapterResult<String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        let InferenceChunk { delta, done } = chunk?;
        text.push_str(&delta);
        if done {
            break;
        }
    }
    Ok(text)
}

/// A generation backend.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Provider and model in use.
    fn metadata(&self) -> &AdapterMetadata;

    /// Sends `request` and returns the generated text as a stream.
    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream>;
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    #[test]
    fn empty_conversation_is_refused() {
        let err = InferenceRequest::new(Vec::new()).expect_err("messages required");
        assert!(matches!(err, AdapterError::InvalidRequest { .. }));
    }

    #[test]
    fn builder_keeps_generation_settings() {
        let request =
            InferenceRequest::new(vec![PromptMessage::new(MessageRole::User, "A CRM for bakeries")])
                .unwrap()
                .with_system_prompt("You are a startup advisor.")
                .with_max_output_tokens(1024)
                .with_temperature(0.4)
                .with_response_format(ResponseFormat::Json);

        assert_eq!(request.system_prompt(), Some("You are a startup advisor."));
        assert_eq!(request.max_output_tokens(), Some(1024));
        assert_eq!(request.temperature(), Some(0.4));
        assert_eq!(request.response_format(), ResponseFormat::Json);
    }

    #[test]
    fn roles_use_chat_wire_names() {
        assert_eq!(MessageRole::System.to_string(), "system");
        assert_eq!(MessageRole::Assistant.as_str(), "assistant");
    }

    #[tokio::test]
    async fn collect_text_stops_at_done() {
        let chunks = vec![
            Ok(InferenceChunk::new("{\"a\":", false)),
            Ok(InferenceChunk::new("1}", true)),
            Ok(InferenceChunk::new("ignored", true)),
        ];
        let text = collect_text(Box::pin(stream::iter(chunks))).await.unwrap();
        assert_eq!(text, "{\"a\":1}");
    }

    #[tokio::test]
    async fn collect_text_propagates_errors() {
        let chunks = vec![
            Ok(InferenceChunk::new("partial", false)),
            Err(AdapterError::transport("connection reset")),
        ];
        let err = collect_text(Box::pin(stream::iter(chunks)))
            .await
            .expect_err("stream error");
        assert!(matches!(err, AdapterError::Transport { .. }));
    }
}

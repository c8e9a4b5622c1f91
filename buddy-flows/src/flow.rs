//! Prompt flows: one template, one model call, one schema-checked result.

use std::fmt;
use std::sync::Arc;

use buddy_adapters::{
    AdapterError, InferenceRequest, MessageRole, ModelAdapter, PromptMessage, ResponseFormat,
    collect_text,
};
use buddy_primitives::{SchemaError, StrategyRequest, StrategyResult};
use buddy_prompts::{PromptKind, StrategyPrompt, TemplateError};
use thiserror::Error;
use tracing::{debug, info};

use crate::extract::json_payload;

/// Result alias for flow execution.
pub type FlowResult<T> = Result<T, FlowError>;

/// Everything that can go wrong between a validated request and a result.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The prompt template could not be built or rendered.
    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] TemplateError),

    /// The provider call failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The model output was not a JSON object of the expected shape.
    #[error("model returned malformed output: {reason}")]
    Parse {
        /// Decoder message.
        reason: String,
    },

    /// The model output parsed but left fields empty.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Which flow to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
    /// First-pass strategy generation.
    Generate,
    /// Alternative-perspective regeneration.
    Regenerate,
}

impl FlowKind {
    /// Stable flow name used in logs and spans.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generate => "generateStrategyFlow",
            Self::Regenerate => "regenerateAnalysisFlow",
        }
    }

    const fn prompt_kind(self) -> PromptKind {
        match self {
            Self::Generate => PromptKind::Initial,
            Self::Regenerate => PromptKind::Regenerate,
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sampling knobs forwarded to every inference request.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowOptions {
    /// Sampling temperature; provider default when absent.
    pub temperature: Option<f32>,
    /// Output token budget; provider default when absent.
    pub max_output_tokens: Option<u32>,
}

/// A prompt template bound to a model adapter.
#[derive(Clone)]
pub struct StrategyFlow {
    kind: FlowKind,
    prompt: StrategyPrompt,
    adapter: Arc<dyn ModelAdapter>,
    options: FlowOptions,
}

impl fmt::Debug for StrategyFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metadata = self.adapter.metadata();
        f.debug_struct("StrategyFlow")
            .field("kind", &self.kind)
            .field("provider", &metadata.provider())
            .field("model", &metadata.model())
            .field("options", &self.options)
            .finish()
    }
}

impl StrategyFlow {
    /// Binds the prompt for `kind` to the supplied adapter.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Prompt`] if the built-in template fails to parse.
    pub fn new(
        kind: FlowKind,
        adapter: Arc<dyn ModelAdapter>,
        options: FlowOptions,
    ) -> FlowResult<Self> {
        let prompt = StrategyPrompt::new(kind.prompt_kind())?;
        Ok(Self {
            kind,
            prompt,
            adapter,
            options,
        })
    }

    /// Returns the flow variant.
    #[must_use]
    pub const fn kind(&self) -> FlowKind {
        self.kind
    }

    /// Returns the flow name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Renders the prompt, calls the model once, and returns the checked result.
    ///
    /// # Errors
    ///
    /// Returns a [`FlowError`] for rendering, provider, decoding, or schema
    /// failures. No retries are attempted.
    pub async fn run(&self, request: &StrategyRequest) -> FlowResult<StrategyResult> {
        let rendered = self.prompt.render(request)?;

        let mut inference =
            InferenceRequest::new(vec![PromptMessage::new(MessageRole::User, rendered.user)])?
                .with_system_prompt(rendered.system)
                .with_response_format(ResponseFormat::Json);
        if let Some(temperature) = self.options.temperature {
            inference = inference.with_temperature(temperature);
        }
        if let Some(tokens) = self.options.max_output_tokens {
            inference = inference.with_max_output_tokens(tokens);
        }

        let metadata = self.adapter.metadata();
        debug!(
            flow = self.name(),
            provider = metadata.provider(),
            model = metadata.model(),
            "invoking model"
        );

        let stream = self.adapter.infer(inference).await?;
        let output = collect_text(stream).await?;
        debug!(flow = self.name(), chars = output.len(), "model output collected");

        let result = parse_result(&output)?;
        result.check_schema()?;

        info!(flow = self.name(), "strategy generated");
        Ok(result)
    }
}

fn parse_result(output: &str) -> FlowResult<StrategyResult> {
    serde_json::from_str(json_payload(output)).map_err(|err| FlowError::Parse {
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use buddy_adapters::{AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk};
    use buddy_primitives::RawStrategyForm;
    use futures::stream;

    use super::*;

    const RESULT_JSON: &str = r#"{
        "gtmStrategy": {
            "targetUsers": "Busy professionals",
            "acquisitionChannels": "Instagram, gyms",
            "monetizationModel": "Freemium",
            "positioningStatement": "Your pocket coach"
        },
        "featureRoadmap": {
            "mvpFeatures": "Plan generator",
            "v1Improvements": "Wearable sync",
            "stretchFeatures": "Live coaching"
        },
        "swotAnalysis": {
            "strengths": "Personalisation",
            "weaknesses": "Cold start",
            "opportunities": "Corporate wellness",
            "threats": "Big fitness brands"
        }
    }"#;

    struct RecordingAdapter {
        metadata: AdapterMetadata,
        response: String,
        seen: Mutex<Vec<InferenceRequest>>,
    }

    impl RecordingAdapter {
        fn new(response: &str) -> Arc<Self> {
            Arc::new(Self {
                metadata: AdapterMetadata::new("test", "recording"),
                response: response.to_owned(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelAdapter for RecordingAdapter {
        fn metadata(&self) -> &AdapterMetadata {
            &self.metadata
        }

        async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
            self.seen.lock().unwrap().push(request);
            let chunk = InferenceChunk::new(self.response.clone(), true);
            Ok(Box::pin(stream::once(async move { Ok(chunk) })))
        }
    }

    fn request() -> StrategyRequest {
        StrategyRequest::validate(&RawStrategyForm::new(
            "A mobile app that uses AI to create personalized workout plans.",
            Some("Health".to_owned()),
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn run_sends_one_json_request() {
        let adapter = RecordingAdapter::new(RESULT_JSON);
        let flow = StrategyFlow::new(
            FlowKind::Generate,
            adapter.clone(),
            FlowOptions {
                temperature: Some(0.9),
                max_output_tokens: None,
            },
        )
        .unwrap();

        let result = flow.run(&request()).await.unwrap();
        assert_eq!(result.gtm_strategy.monetization_model, "Freemium");

        let seen = adapter.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let sent = &seen[0];
        assert_eq!(sent.response_format(), ResponseFormat::Json);
        assert_eq!(sent.temperature(), Some(0.9));
        assert!(sent.system_prompt().is_some());
        assert!(sent.messages()[0].content().contains("Market: Health"));
    }

    #[tokio::test]
    async fn fenced_output_is_accepted() {
        let adapter = RecordingAdapter::new(&format!("```json\n{RESULT_JSON}\n```"));
        let flow = StrategyFlow::new(FlowKind::Regenerate, adapter, FlowOptions::default()).unwrap();
        let result = flow.run(&request()).await.unwrap();
        assert_eq!(result.swot_analysis.threats, "Big fitness brands");
    }

    #[tokio::test]
    async fn non_json_output_is_a_parse_error() {
        let adapter = RecordingAdapter::new("I'm sorry, I can't help with that.");
        let flow = StrategyFlow::new(FlowKind::Generate, adapter, FlowOptions::default()).unwrap();
        let err = flow.run(&request()).await.expect_err("parse failure");
        assert!(matches!(err, FlowError::Parse { .. }));
    }

    #[tokio::test]
    async fn missing_section_is_a_parse_error() {
        let adapter = RecordingAdapter::new(r#"{"gtmStrategy":{}}"#);
        let flow = StrategyFlow::new(FlowKind::Generate, adapter, FlowOptions::default()).unwrap();
        let err = flow.run(&request()).await.expect_err("shape mismatch");
        assert!(matches!(err, FlowError::Parse { .. }));
    }

    #[tokio::test]
    async fn blank_field_is_a_schema_error() {
        let blanked = RESULT_JSON.replace("\"Cold start\"", "\"  \"");
        let adapter = RecordingAdapter::new(&blanked);
        let flow = StrategyFlow::new(FlowKind::Generate, adapter, FlowOptions::default()).unwrap();
        let err = flow.run(&request()).await.expect_err("schema failure");
        match err {
            FlowError::Schema(schema) => {
                assert_eq!(schema.empty_fields(), ["swotAnalysis.weaknesses"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn flow_names() {
        assert_eq!(FlowKind::Generate.to_string(), "generateStrategyFlow");
        assert_eq!(FlowKind::Regenerate.name(), "regenerateAnalysisFlow");
    }
}

//! Builds the configured model adapter and the action layer on top of it.

use std::sync::Arc;

use anyhow::{Context, Result};
use brainstorm_buddy::adapters::gemini::GeminiAdapter;
use brainstorm_buddy::adapters::ollama::OllamaAdapter;
use brainstorm_buddy::adapters::openai::OpenAiAdapter;
use brainstorm_buddy::adapters::{AdapterConfig, ModelAdapter};
use brainstorm_buddy::config::{BuddyConfig, ProviderConfig, ProviderKind};
use brainstorm_buddy::flows::{FlowOptions, StrategyActions};
use tracing::info;

pub fn build_adapter(config: &ProviderConfig) -> Result<Arc<dyn ModelAdapter>> {
    let model = config.model();
    let mut settings = AdapterConfig::new(model).with_timeout(config.timeout());
    if let Some(key) = &config.api_key {
        settings = settings.with_api_key(key);
    }
    if let Some(url) = &config.base_url {
        settings = settings.with_base_url(url)?;
    }

    let adapter: Arc<dyn ModelAdapter> = match config.kind {
        ProviderKind::Gemini => Arc::new(
            GeminiAdapter::new(settings).context("set GEMINI_API_KEY or provider.api_key")?,
        ),
        ProviderKind::OpenAi => Arc::new(
            OpenAiAdapter::new(settings).context("set OPENAI_API_KEY or provider.api_key")?,
        ),
        ProviderKind::Ollama => Arc::new(OllamaAdapter::new(settings)?),
    };

    info!(provider = %config.kind, model, "model adapter ready");
    Ok(adapter)
}

pub fn build_actions(config: &BuddyConfig) -> Result<StrategyActions> {
    let adapter = build_adapter(&config.provider)?;
    let options = FlowOptions {
        temperature: config.generation.temperature,
        max_output_tokens: config.generation.max_output_tokens,
    };
    Ok(StrategyActions::new(adapter, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_needs_no_key() {
        let config = ProviderConfig {
            kind: ProviderKind::Ollama,
            ..ProviderConfig::default()
        };
        let adapter = build_adapter(&config).unwrap();
        assert_eq!(adapter.metadata().provider(), "ollama");
        assert_eq!(adapter.metadata().model(), "llama3.1");
    }

    #[test]
    fn hosted_providers_require_a_key() {
        for kind in [ProviderKind::Gemini, ProviderKind::OpenAi] {
            let config = ProviderConfig {
                kind,
                ..ProviderConfig::default()
            };
            let err = build_adapter(&config).err().expect("missing key");
            assert!(format!("{err:#}").contains("API key"), "{err:#}");
        }
    }

    #[test]
    fn model_and_base_url_are_forwarded() {
        let config = ProviderConfig {
            kind: ProviderKind::OpenAi,
            model: Some("gpt-4o".to_owned()),
            base_url: Some("http://localhost:4000".to_owned()),
            api_key: Some("sk-local".to_owned()),
            ..ProviderConfig::default()
        };
        let adapter = build_adapter(&config).unwrap();
        assert_eq!(adapter.metadata().model(), "gpt-4o");
    }
}

//! Connection settings shared by every adapter.

use std::time::Duration;

use crate::http_client::sanitize_base_url;
use crate::{AdapterError, AdapterResult};

/// Default HTTP deadline for one generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Model, credentials and transport knobs for one provider.
///
/// Adapters fill in their public endpoint when no base URL is set.
#[derive(Clone)]
pub struct AdapterConfig {
    model: String,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl std::fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AdapterConfig {
    /// Settings for `model` with the provider's default endpoint.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            default_temperature: None,
        }
    }

    /// Credential for hosted providers. Ignored by Ollama.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Points the adapter at a proxy, gateway or self-hosted server.
    ///
    /// # Errors
    ///
    /// [`AdapterError::Configuration`] unless `base_url` is an absolute
    /// `http://` or `https://` URL.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = Some(sanitize_base_url(base_url.as_ref())?);
        Ok(self)
    }

    /// Deadline for one call, connect to last byte.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Temperature used when a request does not set one.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) const fn default_temperature(&self) -> Option<f32> {
        self.default_temperature
    }

    /// Configured base URL, or `fallback`. Always ends in `/`.
    pub(crate) fn base_url_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.base_url.as_deref().unwrap_or(fallback)
    }

    /// Non-blank API key, or a configuration error naming `provider`.
    pub(crate) fn require_api_key(&self, provider: &str) -> AdapterResult<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| AdapterError::configuration(format!("{provider} needs an API key")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_counts_as_missing() {
        let err = AdapterConfig::new("m")
            .with_api_key("   ")
            .require_api_key("OpenAI")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "provider misconfigured: OpenAI needs an API key"
        );
    }

    #[test]
    fn base_url_falls_back_to_provider_default() {
        let config = AdapterConfig::new("m");
        let fallback = "https://api.example.com/";
        assert_eq!(config.base_url_or(fallback), fallback);

        let config = config.with_base_url("http://localhost:8080").unwrap();
        assert_eq!(config.base_url_or(fallback), "http://localhost:8080/");
    }

    #[test]
    fn debug_hides_the_key() {
        let config = AdapterConfig::new("m").with_api_key("sk-secret");
        assert!(!format!("{config:?}").contains("sk-secret"));
    }
}

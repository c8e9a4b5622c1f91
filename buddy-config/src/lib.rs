//! Configuration for Brainstorm Buddy.
//!
//! Values come from an optional TOML file, then environment variables, then
//! built-in defaults. See [`BuddyConfig::load`].

#![warn(missing_docs, clippy::pedantic)]

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "brainstorm-buddy.toml";

/// Provider selection.
pub const ENV_PROVIDER: &str = "BUDDY_PROVIDER";
/// Model override.
pub const ENV_MODEL: &str = "BUDDY_MODEL";
/// Base URL override.
pub const ENV_BASE_URL: &str = "BUDDY_BASE_URL";
/// Provider HTTP timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "BUDDY_TIMEOUT_SECS";
/// Sampling temperature.
pub const ENV_TEMPERATURE: &str = "BUDDY_TEMPERATURE";
/// Output token budget.
pub const ENV_MAX_OUTPUT_TOKENS: &str = "BUDDY_MAX_OUTPUT_TOKENS";
/// HTTP server bind address.
pub const ENV_BIND: &str = "BUDDY_BIND";

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range or malformed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Config key or environment variable name.
        key: String,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_owned(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Supported text-generation providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini.
    #[default]
    Gemini,
    /// `OpenAI` or any compatible gateway.
    OpenAi,
    /// Local `Ollama` daemon.
    Ollama,
}

impl ProviderKind {
    /// Model used when none is configured.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::OpenAi => "gpt-4o-mini",
            Self::Ollama => "llama3.1",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    #[must_use]
    pub const fn api_key_env(self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
        }
    }

    /// Lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::invalid(
                "provider.kind",
                value,
                "expected one of gemini, openai, ollama",
            )),
        }
    }
}

/// `[provider]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Which provider to call.
    pub kind: ProviderKind,
    /// Model identifier; provider default when absent.
    pub model: Option<String>,
    /// Base URL override; provider default when absent.
    pub base_url: Option<String>,
    /// API key. Usually supplied through the provider's environment variable.
    pub api_key: Option<String>,
    /// HTTP timeout for one generation call.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            model: None,
            base_url: None,
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl ProviderConfig {
    /// Configured model or the provider default.
    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.kind.default_model())
    }

    /// HTTP timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[generation]` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: Option<f32>,
    /// Output token budget.
    pub max_output_tokens: Option<u32>,
}

/// `[server]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the HTTP API listens on.
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

/// `[telemetry]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Default `tracing` filter directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuddyConfig {
    /// Provider selection and transport.
    pub provider: ProviderConfig,
    /// Sampling knobs.
    pub generation: GenerationConfig,
    /// HTTP API.
    pub server: ServerConfig,
    /// Logging.
    pub telemetry: TelemetryConfig,
}

impl BuddyConfig {
    /// Loads configuration from `path` (or [`DEFAULT_CONFIG_FILE`] when it
    /// exists) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or a
    /// value is invalid.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let path = path.or_else(|| default_path.exists().then_some(default_path));
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Loads configuration from an optional file and a custom variable lookup.
    ///
    /// # Errors
    ///
    /// See [`BuddyConfig::load`].
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Overlays environment variables. Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the variable that failed
    /// to parse.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_PROVIDER) {
            self.provider.kind = value.parse()?;
        }
        if let Some(value) = get(ENV_MODEL) {
            self.provider.model = Some(value);
        }
        if let Some(value) = get(ENV_BASE_URL) {
            self.provider.base_url = Some(value);
        }
        if let Some(env_key) = self.provider.kind.api_key_env() {
            if let Some(value) = get(env_key) {
                self.provider.api_key = Some(value);
            }
        }
        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            self.provider.timeout_secs = parse_env(ENV_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = get(ENV_TEMPERATURE) {
            self.generation.temperature = Some(parse_env(ENV_TEMPERATURE, &value)?);
        }
        if let Some(value) = get(ENV_MAX_OUTPUT_TOKENS) {
            self.generation.max_output_tokens = Some(parse_env(ENV_MAX_OUTPUT_TOKENS, &value)?);
        }
        if let Some(value) = get(ENV_BIND) {
            self.server.bind = parse_env(ENV_BIND, &value)?;
        }
        Ok(())
    }

    /// Checks ranges the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending key.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "provider.timeout_secs",
                self.provider.timeout_secs,
                "must be at least 1",
            ));
        }
        if let Some(temperature) = self.generation.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::invalid(
                    "generation.temperature",
                    temperature,
                    "must be between 0.0 and 2.0",
                ));
            }
        }
        if self.generation.max_output_tokens == Some(0) {
            return Err(ConfigError::invalid(
                "generation.max_output_tokens",
                0,
                "must be at least 1",
            ));
        }
        if self.provider.model.as_deref().is_some_and(|model| model.trim().is_empty()) {
            return Err(ConfigError::invalid("provider.model", "", "must not be blank"));
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err: T::Err| ConfigError::invalid(key, value, err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = BuddyConfig::load_with(None, lookup(&[])).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.model(), "gemini-2.0-flash");
        assert_eq!(config.provider.timeout(), Duration::from_secs(60));
        assert_eq!(config.server.bind.to_string(), "127.0.0.1:3000");
        assert_eq!(config.telemetry.filter, "info");
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn file_values_are_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[provider]
kind = "ollama"
base_url = "http://gpu-box:11434"
timeout_secs = 120

[generation]
temperature = 0.8

[telemetry]
filter = "debug"
"#
        )
        .unwrap();

        let config = BuddyConfig::load_with(Some(file.path()), lookup(&[])).unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Ollama);
        assert_eq!(config.provider.model(), "llama3.1");
        assert_eq!(config.provider.base_url.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.provider.timeout_secs, 120);
        assert_eq!(config.generation.temperature, Some(0.8));
        assert_eq!(config.telemetry.filter, "debug");
    }

    #[test]
    fn env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[provider]\nkind = \"gemini\"\nmodel = \"gemini-1.5-pro\"").unwrap();

        let config = BuddyConfig::load_with(
            Some(file.path()),
            lookup(&[
                (ENV_PROVIDER, "OpenAI"),
                (ENV_MODEL, "gpt-4o"),
                ("OPENAI_API_KEY", "sk-env"),
                ("GEMINI_API_KEY", "ignored"),
                (ENV_BIND, "0.0.0.0:8080"),
                (ENV_MAX_OUTPUT_TOKENS, "2048"),
            ]),
        )
        .unwrap();

        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.provider.model(), "gpt-4o");
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.server.bind.port(), 8080);
        assert_eq!(config.generation.max_output_tokens, Some(2048));
    }

    #[test]
    fn invalid_env_names_the_variable() {
        let err = BuddyConfig::load_with(None, lookup(&[(ENV_TIMEOUT_SECS, "soon")]))
            .expect_err("not a number");
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS), "{err}");

        let err = BuddyConfig::load_with(None, lookup(&[(ENV_PROVIDER, "claude")]))
            .expect_err("unknown provider");
        assert!(err.to_string().contains("provider.kind"), "{err}");
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let err = BuddyConfig::load_with(None, lookup(&[(ENV_TEMPERATURE, "3.5")]))
            .expect_err("temperature range");
        assert!(err.to_string().contains("generation.temperature"), "{err}");

        let err = BuddyConfig::load_with(None, lookup(&[(ENV_TIMEOUT_SECS, "0")]))
            .expect_err("zero timeout");
        assert!(err.to_string().contains("provider.timeout_secs"), "{err}");
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[provider]\nflavour = \"spicy\"").unwrap();
        let err = BuddyConfig::from_file(file.path()).expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuddyConfig::from_file(&dir.path().join("absent.toml")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

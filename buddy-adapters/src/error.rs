//! Error type shared by every adapter.

use std::time::Duration;

use thiserror::Error;

/// Result alias for provider calls.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Everything that can go wrong between building a request and reading the
/// provider's answer.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Missing credentials or an unusable endpoint.
    #[error("provider misconfigured: {reason}")]
    Configuration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// The request was refused locally, before any network traffic.
    #[error("request rejected before sending: {reason}")]
    InvalidRequest {
        /// Why the request was refused.
        reason: String,
    },

    /// Connection failure, I/O error, or the deadline elapsed.
    #[error("could not reach provider: {reason}")]
    Transport {
        /// Underlying failure.
        reason: String,
    },

    /// HTTP 429.
    #[error("provider is rate limiting requests (retry after {retry_after:?})")]
    RateLimited {
        /// Parsed `Retry-After` header, when the provider sent one.
        retry_after: Option<Duration>,
    },

    /// Non-success status, a body that does not decode, or no usable text.
    #[error("unexpected provider response: {reason}")]
    Response {
        /// Status and body excerpt, or a decoding failure.
        reason: String,
    },
}

impl AdapterError {
    /// Builds [`AdapterError::InvalidRequest`].
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Builds [`AdapterError::Configuration`].
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Builds [`AdapterError::Transport`].
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Builds [`AdapterError::Response`].
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_includes_delay() {
        let err = AdapterError::RateLimited {
            retry_after: Some(Duration::from_secs(3)),
        };
        assert!(err.to_string().contains("3s"), "{err}");
    }
}

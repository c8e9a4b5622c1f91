//! The `{data, error}` envelope returned by the action layer.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::strategy::StrategyResult;

/// Uniform result wrapper: exactly one of `data` and `error` is set.
///
/// Fields are private so the invariant can only be established through
/// [`ActionEnvelope::success`] and [`ActionEnvelope::failure`]; deserialization
/// rejects payloads that violate it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "WireEnvelope")]
pub struct ActionEnvelope {
    data: Option<StrategyResult>,
    error: Option<String>,
}

impl ActionEnvelope {
    /// Wraps a successful result.
    #[must_use]
    pub fn success(result: StrategyResult) -> Self {
        Self {
            data: Some(result),
            error: None,
        }
    }

    /// Wraps a user-facing error message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    /// Returns the result, if successful.
    #[must_use]
    pub fn data(&self) -> Option<&StrategyResult> {
        self.data.as_ref()
    }

    /// Returns the error message, if failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` when the envelope carries a result.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    /// Converts the envelope into a standard `Result`.
    ///
    /// # Errors
    ///
    /// Returns the error message when the envelope is a failure.
    pub fn into_result(self) -> Result<StrategyResult, String> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, error) => Err(error.unwrap_or_default()),
        }
    }
}

#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    data: Option<StrategyResult>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<WireEnvelope> for ActionEnvelope {
    type Error = Error;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        match (wire.data, wire.error) {
            (Some(data), None) => Ok(Self::success(data)),
            (None, Some(error)) => Ok(Self::failure(error)),
            (Some(_), Some(_)) => Err(Error::InvalidEnvelope {
                reason: "both data and error are set".into(),
            }),
            (None, None) => Err(Error::InvalidEnvelope {
                reason: "neither data nor error is set".into(),
            }),
        }
    }
}

//! Strategy requests and the input validator.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum idea length, in characters.
pub const MIN_IDEA_CHARS: usize = 10;
/// Maximum idea length, in characters.
pub const MAX_IDEA_CHARS: usize = 500;

const IDEA_REQUIRED: &str = "Startup idea is required.";
const IDEA_TOO_SHORT: &str = "Please describe your idea in at least 10 characters.";
const IDEA_TOO_LONG: &str = "Idea is too long, please keep it under 500 characters.";

/// Unvalidated form submission as received from a presentation surface.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawStrategyForm {
    /// One-line startup idea; `None` when the field was not submitted at all.
    #[serde(default)]
    pub startup_idea: Option<String>,
    /// Optional market, free text.
    #[serde(default)]
    pub market: Option<String>,
}

impl RawStrategyForm {
    /// Creates a form with the supplied idea and optional market.
    #[must_use]
    pub fn new(startup_idea: impl Into<String>, market: Option<String>) -> Self {
        Self {
            startup_idea: Some(startup_idea.into()),
            market,
        }
    }
}

/// A validated strategy request.
///
/// Only constructible through [`StrategyRequest::validate`] (or deserialization
/// followed by validation), so the idea length bound always holds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "RawStrategyForm")]
pub struct StrategyRequest {
    startup_idea: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    market: Option<String>,
}

impl StrategyRequest {
    /// Validates a raw form, collecting every violated rule.
    ///
    /// Blank markets are normalised to `None`; the market is otherwise free
    /// text and never checked against the suggestion list.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing all violations in rule order.
    pub fn validate(form: &RawStrategyForm) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();

        match form.startup_idea.as_deref() {
            None => violations.push(IDEA_REQUIRED.to_owned()),
            Some(idea) => {
                let len = idea.chars().count();
                if len < MIN_IDEA_CHARS {
                    violations.push(IDEA_TOO_SHORT.to_owned());
                }
                if len > MAX_IDEA_CHARS {
                    violations.push(IDEA_TOO_LONG.to_owned());
                }
            }
        }

        if !violations.is_empty() {
            return Err(ValidationError::new(violations));
        }

        let market = form
            .market
            .as_deref()
            .map(str::trim)
            .filter(|market| !market.is_empty())
            .map(str::to_owned);

        Ok(Self {
            startup_idea: form.startup_idea.clone().unwrap_or_default(),
            market,
        })
    }

    /// Returns the startup idea.
    #[must_use]
    pub fn startup_idea(&self) -> &str {
        &self.startup_idea
    }

    /// Returns the market, if one was supplied.
    #[must_use]
    pub fn market(&self) -> Option<&str> {
        self.market.as_deref()
    }

    /// Returns the market or `General` when absent.
    #[must_use]
    pub fn market_or_general(&self) -> &str {
        self.market().unwrap_or("General")
    }
}

impl TryFrom<RawStrategyForm> for StrategyRequest {
    type Error = ValidationError;

    fn try_from(form: RawStrategyForm) -> Result<Self, Self::Error> {
        Self::validate(&form)
    }
}

impl From<&StrategyRequest> for RawStrategyForm {
    fn from(request: &StrategyRequest) -> Self {
        Self {
            startup_idea: Some(request.startup_idea.clone()),
            market: request.market.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(idea: &str) -> RawStrategyForm {
        RawStrategyForm::new(idea, None)
    }

    #[test]
    fn accepts_bounds_inclusive() {
        assert!(StrategyRequest::validate(&form(&"a".repeat(MIN_IDEA_CHARS))).is_ok());
        assert!(StrategyRequest::validate(&form(&"a".repeat(MAX_IDEA_CHARS))).is_ok());
    }

    #[test]
    fn rejects_short_idea() {
        let err = StrategyRequest::validate(&form("too short")).expect_err("9 chars");
        assert_eq!(err.messages(), &[IDEA_TOO_SHORT.to_owned()]);
    }

    #[test]
    fn rejects_long_idea() {
        let err =
            StrategyRequest::validate(&form(&"x".repeat(MAX_IDEA_CHARS + 1))).expect_err("501");
        assert_eq!(err.to_string(), IDEA_TOO_LONG);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Ten multi-byte characters are a valid idea.
        let idea = "é".repeat(MIN_IDEA_CHARS);
        assert!(idea.len() > MIN_IDEA_CHARS);
        assert!(StrategyRequest::validate(&form(&idea)).is_ok());

        let idea = "日".repeat(MAX_IDEA_CHARS);
        assert!(StrategyRequest::validate(&form(&idea)).is_ok());
    }

    #[test]
    fn missing_idea_is_reported() {
        let err = StrategyRequest::validate(&RawStrategyForm::default()).expect_err("missing");
        assert_eq!(err.to_string(), IDEA_REQUIRED);
    }

    #[test]
    fn blank_market_is_absent() {
        let request = StrategyRequest::validate(&RawStrategyForm::new(
            "A marketplace for used lab equipment",
            Some("   ".into()),
        ))
        .unwrap();
        assert_eq!(request.market(), None);
        assert_eq!(request.market_or_general(), "General");
    }

    #[test]
    fn market_is_free_text() {
        let request = StrategyRequest::validate(&RawStrategyForm::new(
            "A marketplace for used lab equipment",
            Some("Biotech labs".into()),
        ))
        .unwrap();
        assert_eq!(request.market(), Some("Biotech labs"));
    }

    #[test]
    fn deserializes_through_validation() {
        let ok: StrategyRequest =
            serde_json::from_str(r#"{"startupIdea":"AI workout planner app","market":"Health"}"#)
                .unwrap();
        assert_eq!(ok.startup_idea(), "AI workout planner app");

        let err = serde_json::from_str::<StrategyRequest>(r#"{"startupIdea":"short"}"#)
            .expect_err("too short");
        assert!(err.to_string().contains("at least 10 characters"));
    }

    #[test]
    fn serializes_camel_case_without_absent_market() {
        let request = StrategyRequest::validate(&form("An idea long enough")).unwrap();
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"startupIdea":"An idea long enough"}"#);
    }
}

//! Shared error definitions for strategy primitives.

use thiserror::Error;

/// Errors raised while decoding primitives from the wire.
#[derive(Debug, Error)]
pub enum Error {
    /// An envelope payload carried both or neither of `data` and `error`.
    #[error("invalid action envelope: {reason}")]
    InvalidEnvelope {
        /// Human-readable reason for rejection.
        reason: String,
    },
}

/// One or more input-constraint violations, in rule order.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{}", .messages.join(", "))]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    /// Creates an error from the supplied violation messages.
    #[must_use]
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Returns every violated rule message.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Generated output that parsed but left required fields empty.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("model output is missing content for: {}", .empty_fields.join(", "))]
pub struct SchemaError {
    empty_fields: Vec<String>,
}

impl SchemaError {
    /// Creates an error listing the dotted paths of empty fields.
    #[must_use]
    pub fn new(empty_fields: Vec<String>) -> Self {
        Self { empty_fields }
    }

    /// Returns the dotted paths (`section.field`) of every empty field.
    #[must_use]
    pub fn empty_fields(&self) -> &[String] {
        &self.empty_fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_comma_joined() {
        let err = ValidationError::new(vec!["first".into(), "second".into()]);
        assert_eq!(err.to_string(), "first, second");
    }

    #[test]
    fn validation_error_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ValidationError::new(vec!["only".into()]));
        assert_eq!(err.to_string(), "only");
    }

    #[test]
    fn schema_error_lists_fields() {
        let err = SchemaError::new(vec![
            "swotAnalysis.threats".into(),
            "gtmStrategy.targetUsers".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "model output is missing content for: swotAnalysis.threats, gtmStrategy.targetUsers"
        );
    }
}

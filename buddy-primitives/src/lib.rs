//! Core shared types for Brainstorm Buddy.
//!
//! The input side ([`StrategyRequest`], [`RawStrategyForm`]) carries the
//! user's startup idea through validation; the output side
//! ([`StrategyResult`] and its three sections) is the fixed schema the
//! generation provider must satisfy; [`ActionEnvelope`] is the only contract
//! between the action layer and any presentation surface.

#![warn(missing_docs, clippy::pedantic)]

mod envelope;
mod error;
mod request;
mod strategy;

/// Uniform `{data, error}` result wrapper.
pub use envelope::ActionEnvelope;
/// Error types shared across the workspace.
pub use error::{Error, SchemaError, ValidationError};
/// Validated request and its unvalidated form counterpart.
pub use request::{MAX_IDEA_CHARS, MIN_IDEA_CHARS, RawStrategyForm, StrategyRequest};
/// Generated strategy sections.
pub use strategy::{FeatureRoadmap, GtmStrategy, Section, SectionKind, StrategyResult, SwotAnalysis};

//! Brainstorm Buddy: turn a one-line startup idea into a go-to-market
//! strategy, a feature roadmap, and a SWOT analysis.
//!
//! This crate bundles the workspace crates behind feature flags so callers
//! can pull in only the layers they need.

#![warn(missing_docs, clippy::pedantic)]

/// Schema, validation, and the action envelope.
pub use buddy_primitives as primitives;

/// Prompt templates (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use buddy_prompts as prompts;

/// Text-generation provider adapters (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use buddy_adapters as adapters;

/// Flows and the action layer (enabled by `flows` feature).
#[cfg(feature = "flows")]
pub use buddy_flows as flows;

/// Presentation state machine and export (enabled by `session` feature).
#[cfg(feature = "session")]
pub use buddy_session as session;

/// Configuration loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use buddy_config as config;

/// Logging setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use buddy_telemetry as telemetry;

//! Prompt orchestration for strategy generation.
//!
//! [`template`] holds the small template engine; [`strategy`] defines the
//! initial and regenerate prompts built on top of it.

#![warn(missing_docs, clippy::pedantic)]

pub mod strategy;
pub mod template;

pub use strategy::{OUTPUT_FORMAT, PromptKind, RenderedPrompt, StrategyPrompt};
pub use template::{PromptTemplate, TemplateError, TemplateResult};

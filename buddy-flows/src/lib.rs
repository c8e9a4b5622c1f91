//! Strategy generation flows and the action layer around them.
//!
//! A [`StrategyFlow`] pairs one prompt template with a [`buddy_adapters::ModelAdapter`]
//! and turns a validated request into a schema-checked result. [`StrategyActions`]
//! wraps both flows so callers only ever see an [`buddy_primitives::ActionEnvelope`].

#![warn(missing_docs, clippy::pedantic)]

pub mod action;
pub mod flow;

mod extract;

pub use action::{FAILURE_PREFIX, StrategyActions, UNKNOWN_ERROR};
pub use flow::{FlowError, FlowKind, FlowOptions, FlowResult, StrategyFlow};

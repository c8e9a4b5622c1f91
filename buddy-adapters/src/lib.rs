//! Text-generation provider adapters.
//!
//! One module per provider, all configured through [`AdapterConfig`] and used
//! through [`ModelAdapter`]. Requests built with [`ResponseFormat::Json`] put
//! the provider into its native JSON mode.

#![warn(missing_docs, clippy::pedantic)]

pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod traits;

mod config;
mod error;
mod http_client;

pub use config::{AdapterConfig, DEFAULT_TIMEOUT};
pub use error::{AdapterError, AdapterResult};
pub use traits::{
    AdapterMetadata, AdapterStream, InferenceChunk, InferenceRequest, MessageRole, ModelAdapter,
    PromptMessage, ResponseFormat, collect_text,
};

//! Presentation layer shared by every front end.
//!
//! [`StrategySession`] is the state machine behind the form: it gates
//! submissions, holds the latest result or error, and produces the text for
//! copy and export.

#![warn(missing_docs, clippy::pedantic)]

pub mod clipboard;
pub mod export;
pub mod markets;
pub mod session;

pub use clipboard::{ClipboardError, ClipboardWriter, MemoryClipboard};
pub use export::{
    EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME, format_section, render_full, section_heading,
    title_case,
};
pub use markets::{MARKET_SUGGESTIONS, is_suggested};
pub use session::{
    Intent, SessionError, SessionResult, SessionState, StrategySession, Submission,
};

//! Presentation state machine for a single strategy session.

use buddy_flows::{FlowKind, StrategyActions};
use buddy_primitives::{
    ActionEnvelope, RawStrategyForm, SectionKind, StrategyRequest, StrategyResult,
    ValidationError,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::clipboard::{ClipboardError, ClipboardWriter};
use crate::export::{format_section, render_full};

/// States a session moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing submitted yet.
    Idle,
    /// A generation is in flight.
    Pending,
    /// The last generation produced a result.
    Success,
    /// The last generation failed; the error is held.
    Failure,
}

impl SessionState {
    /// Returns `true` while a generation is in flight.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Generate a first strategy.
    Submit,
    /// Generate an alternative strategy for the same kind of input.
    Regenerate,
}

impl Intent {
    /// Flow backing the intent.
    #[must_use]
    pub const fn flow(self) -> FlowKind {
        match self {
            Self::Submit => FlowKind::Generate,
            Self::Regenerate => FlowKind::Regenerate,
        }
    }
}

/// Accepted submission handed to the action layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Which action to run.
    pub intent: Intent,
    /// The validated request.
    pub request: StrategyRequest,
}

/// Errors emitted by the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A generation is already in flight; the new one is ignored.
    #[error("a strategy is already being generated")]
    AlreadyPending,

    /// The form failed local validation; no action was started.
    #[error(transparent)]
    InvalidForm(#[from] ValidationError),

    /// The intent is not allowed from the current state.
    #[error("cannot {intent:?} from {from:?}")]
    InvalidTransition {
        /// State prior to the attempt.
        from: SessionState,
        /// Intent that was refused.
        intent: Intent,
    },

    /// `complete` was called without a pending generation.
    #[error("no strategy generation is pending")]
    NotPending,

    /// Copy or export was requested without a result.
    #[error("no strategy to export")]
    NoResult,

    /// The clipboard rejected the write.
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Result alias used by session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Holds the current state, the last result or error, and the last submitted
/// request.
#[derive(Debug, Clone)]
pub struct StrategySession {
    state: SessionState,
    request: Option<StrategyRequest>,
    result: Option<StrategyResult>,
    error: Option<String>,
}

impl Default for StrategySession {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategySession {
    /// Creates an idle session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SessionState::Idle,
            request: None,
            result: None,
            error: None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the held result.
    #[must_use]
    pub const fn result(&self) -> Option<&StrategyResult> {
        self.result.as_ref()
    }

    /// Returns the held error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the last submitted request.
    #[must_use]
    pub const fn request(&self) -> Option<&StrategyRequest> {
        self.request.as_ref()
    }

    /// Starts a generation.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyPending`] while a generation is in flight,
    /// [`SessionError::InvalidForm`] if the form fails validation, and
    /// [`SessionError::InvalidTransition`] for a regenerate without a result.
    /// The session is unchanged on error.
    pub fn begin(&mut self, intent: Intent, form: &RawStrategyForm) -> SessionResult<Submission> {
        if self.state.is_pending() {
            return Err(SessionError::AlreadyPending);
        }

        let request = StrategyRequest::validate(form)?;

        let allowed = matches!(
            (self.state, intent),
            (
                SessionState::Idle | SessionState::Success | SessionState::Failure,
                Intent::Submit
            ) | (SessionState::Success, Intent::Regenerate)
        );
        if !allowed {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                intent,
            });
        }

        debug!(?intent, "strategy submission accepted");
        self.transition(SessionState::Pending);
        self.result = None;
        self.error = None;
        self.request = Some(request.clone());

        Ok(Submission { intent, request })
    }

    /// Applies the action's envelope. A result replaces whatever was held.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotPending`] unless a generation is in flight.
    pub fn complete(&mut self, envelope: ActionEnvelope) -> SessionResult<SessionState> {
        if !self.state.is_pending() {
            return Err(SessionError::NotPending);
        }

        match envelope.into_result() {
            Ok(result) => {
                self.result = Some(result);
                self.transition(SessionState::Success);
            }
            Err(message) => {
                warn!(error = %message, "strategy generation failed");
                self.error = Some(message);
                self.transition(SessionState::Failure);
            }
        }

        Ok(self.state)
    }

    /// Runs `begin`, the matching action, and `complete`.
    ///
    /// # Errors
    ///
    /// Propagates the `begin` errors. Generation failures are not errors;
    /// they leave the session in [`SessionState::Failure`].
    pub async fn run(
        &mut self,
        actions: &StrategyActions,
        intent: Intent,
        form: &RawStrategyForm,
    ) -> SessionResult<SessionState> {
        let submission = self.begin(intent, form)?;
        let form = RawStrategyForm::from(&submission.request);
        let envelope = actions.perform(intent.flow(), &form).await;
        self.complete(envelope)
    }

    /// Full export document for the held result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoResult`] when nothing has been generated.
    pub fn export_text(&self) -> SessionResult<String> {
        match (&self.request, &self.result) {
            (Some(request), Some(result)) => Ok(render_full(request, result)),
            _ => Err(SessionError::NoResult),
        }
    }

    /// Copies the full document and returns the notification to show.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoResult`] or a clipboard error.
    pub fn copy_all(&self, clipboard: &mut dyn ClipboardWriter) -> SessionResult<String> {
        let text = self.export_text()?;
        clipboard.write_text(&text)?;
        Ok("Full strategy has been copied.".to_owned())
    }

    /// Copies one section's blocks and returns the notification to show.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoResult`] or a clipboard error.
    pub fn copy_section(
        &self,
        kind: SectionKind,
        clipboard: &mut dyn ClipboardWriter,
    ) -> SessionResult<String> {
        let result = self.result.as_ref().ok_or(SessionError::NoResult)?;
        clipboard.write_text(&format_section(result.section(kind)))?;
        Ok(format!("{} has been copied.", kind.title()))
    }

    fn transition(&mut self, next: SessionState) {
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "session transition");
            self.state = next;
        }
    }
}

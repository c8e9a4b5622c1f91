//! Action layer: validates a raw form, runs a flow, and always answers with
//! an [`ActionEnvelope`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use buddy_adapters::ModelAdapter;
use buddy_primitives::{ActionEnvelope, RawStrategyForm, StrategyRequest};
use futures::FutureExt;
use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use crate::flow::{FlowKind, FlowOptions, FlowResult, StrategyFlow};

/// Prefix attached to every generation failure surfaced to the user.
pub const FAILURE_PREFIX: &str = "Failed to generate strategy. ";

/// Message used when the flow panics or fails without a usable message.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

/// The two user-facing actions, sharing one adapter.
#[derive(Clone, Debug)]
pub struct StrategyActions {
    generate: StrategyFlow,
    regenerate: StrategyFlow,
}

impl StrategyActions {
    /// Builds both flows on top of the supplied adapter.
    ///
    /// # Errors
    ///
    /// Returns a flow error if a built-in prompt fails to parse.
    pub fn new(adapter: Arc<dyn ModelAdapter>, options: FlowOptions) -> FlowResult<Self> {
        Ok(Self {
            generate: StrategyFlow::new(FlowKind::Generate, Arc::clone(&adapter), options)?,
            regenerate: StrategyFlow::new(FlowKind::Regenerate, adapter, options)?,
        })
    }

    /// Returns the flow for `kind`.
    #[must_use]
    pub const fn flow(&self, kind: FlowKind) -> &StrategyFlow {
        match kind {
            FlowKind::Generate => &self.generate,
            FlowKind::Regenerate => &self.regenerate,
        }
    }

    /// Generates a first strategy for the submitted form.
    pub async fn get_strategy(&self, form: &RawStrategyForm) -> ActionEnvelope {
        self.perform(FlowKind::Generate, form).await
    }

    /// Generates an alternative strategy for the submitted form.
    pub async fn regenerate_strategy(&self, form: &RawStrategyForm) -> ActionEnvelope {
        self.perform(FlowKind::Regenerate, form).await
    }

    /// Validates `form` and runs the selected flow. Never fails and never
    /// unwinds; every outcome is folded into the envelope.
    pub async fn perform(&self, kind: FlowKind, form: &RawStrategyForm) -> ActionEnvelope {
        let span = info_span!("strategy_action", request_id = %Uuid::new_v4(), flow = kind.name());
        self.perform_inner(kind, form).instrument(span).await
    }

    async fn perform_inner(&self, kind: FlowKind, form: &RawStrategyForm) -> ActionEnvelope {
        let request = match StrategyRequest::validate(form) {
            Ok(request) => request,
            Err(err) => {
                debug!(error = %err, "form rejected before generation");
                return ActionEnvelope::failure(err.to_string());
            }
        };

        let flow = self.flow(kind);
        match AssertUnwindSafe(flow.run(&request)).catch_unwind().await {
            Ok(Ok(result)) => ActionEnvelope::success(result),
            Ok(Err(err)) => {
                error!(error = %err, "strategy generation failed");
                ActionEnvelope::failure(failure_message(&err.to_string()))
            }
            Err(_) => {
                warn!("strategy generation panicked");
                ActionEnvelope::failure(failure_message(""))
            }
        }
    }
}

fn failure_message(detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        format!("{FAILURE_PREFIX}{UNKNOWN_ERROR}")
    } else {
        format!("{FAILURE_PREFIX}{detail}")
    }
}

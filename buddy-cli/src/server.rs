//! HTTP JSON API over the action layer.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{FromRequest, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router, async_trait};
use brainstorm_buddy::flows::StrategyActions;
use brainstorm_buddy::primitives::{
    ActionEnvelope, RawStrategyForm, StrategyRequest, StrategyResult,
};
use brainstorm_buddy::session::{
    EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME, MARKET_SUGGESTIONS, render_full,
};
use serde::Deserialize;
use tracing::{info, warn};

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub actions: Arc<StrategyActions>,
}

/// Body of `POST /api/export`.
#[derive(Debug, Deserialize)]
pub struct ExportBody {
    pub request: StrategyRequest,
    pub result: StrategyResult,
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/markets", get(markets_handler))
        .route("/api/strategy", post(strategy_handler))
        .route("/api/strategy/regenerate", post(regenerate_handler))
        .route("/api/export", post(export_handler))
        .with_state(state)
}

pub async fn serve(bind: SocketAddr, actions: Arc<StrategyActions>) -> Result<()> {
    let app = router(HttpState { actions });

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {bind}"))?;

    info!(%bind, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

pub async fn markets_handler() -> Json<Vec<&'static str>> {
    Json(MARKET_SUGGESTIONS.to_vec())
}

/// Strategy form read from a JSON or URL-encoded body.
///
/// A body that cannot be read is answered with a failure envelope and 200,
/// like any other action failure.
pub struct StrategyForm(pub RawStrategyForm);

#[async_trait]
impl<S> FromRequest<S> for StrategyForm
where
    S: Send + Sync,
{
    type Rejection = Json<ActionEnvelope>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let url_encoded = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        let form = if url_encoded {
            Form::<RawStrategyForm>::from_request(req, state)
                .await
                .map(|Form(form)| form)
                .map_err(|rejection| rejection.body_text())
        } else {
            Json::<RawStrategyForm>::from_request(req, state)
                .await
                .map(|Json(form)| form)
                .map_err(|rejection| rejection.body_text())
        };

        form.map(Self).map_err(|reason| {
            warn!(%reason, "unreadable strategy form");
            Json(ActionEnvelope::failure(reason))
        })
    }
}

/// Always 200: the envelope carries any error.
pub async fn strategy_handler(
    State(state): State<HttpState>,
    StrategyForm(form): StrategyForm,
) -> Json<ActionEnvelope> {
    Json(state.actions.get_strategy(&form).await)
}

pub async fn regenerate_handler(
    State(state): State<HttpState>,
    StrategyForm(form): StrategyForm,
) -> Json<ActionEnvelope> {
    Json(state.actions.regenerate_strategy(&form).await)
}

pub async fn export_handler(Json(body): Json<ExportBody>) -> Response {
    if let Err(err) = body.result.check_schema() {
        return (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response();
    }

    let document = render_full(&body.request, &body.result);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format!("{EXPORT_CONTENT_TYPE}; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        document,
    )
        .into_response()
}

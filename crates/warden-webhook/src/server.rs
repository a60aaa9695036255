// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook routes, middleware, and shared state.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use teloxide::types::Update;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use warden_config::model::WebhookConfig;
use warden_core::WardenError;
use warden_telegram::Pipeline;

/// Header the platform echoes the configured shared secret in.
const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    pub pipeline: Pipeline,
    /// Shared secret; `None` disables the header check.
    pub secret: Option<String>,
}

/// Build the webhook router: POST on the configured path, GET /health.
pub fn build_router(path: &str, state: WebhookState) -> Router {
    Router::new()
        .route(path, post(handle_update))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve the webhook until the process is stopped.
pub async fn start_server(config: &WebhookConfig, state: WebhookState) -> Result<(), WardenError> {
    let app = build_router(&config.path, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WardenError::Webhook {
            message: format!("failed to bind webhook to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WardenError::Webhook {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install ctrl-c handler");
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn handle_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let is_json = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        warn!("rejected webhook request with non-JSON content type");
        return (StatusCode::FORBIDDEN, "");
    }

    if let Some(expected) = &state.secret {
        let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            warn!("rejected webhook request with bad secret token");
            return (StatusCode::FORBIDDEN, "");
        }
    }

    let update: Update = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(e) => {
            error!(error = %e, "failed to parse update envelope");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error");
        }
    };

    if let Err(e) = state.pipeline.handle_update(&update).await {
        error!(error = %e, "update processing failed");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error");
    }

    (StatusCode::OK, "")
}

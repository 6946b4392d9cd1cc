//! HTTP endpoint receiving Slack Events API deliveries.
//!
//! `POST /slack/events` always answers `200` with `{"ok": true}` (or the
//! echoed challenge) regardless of what happened internally, so Slack
//! never enters its redelivery loop. `GET /health` answers `ok`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::GlobalConfig;
use crate::models::event::EventEnvelope;
use crate::slack::router::{self, Acknowledgement};
use crate::state::AppState;
use crate::{AppError, Result};

/// Path Slack is configured to deliver events to.
pub const EVENTS_PATH: &str = "/slack/events";

async fn health() -> &'static str {
    "ok"
}

async fn slack_events(State(state): State<Arc<AppState>>, body: Bytes) -> Json<Value> {
    debug!(payload = %String::from_utf8_lossy(&body), "incoming slack event");

    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(%err, "unparseable event payload acknowledged");
            return Json(json!({ "ok": true }));
        }
    };

    let event_id = envelope.event_id.clone().unwrap_or_default();
    let route = router::classify(envelope, state.config.slack.bot_user_id.as_deref());
    let span = info_span!("slack_event", route = route.name(), event_id = %event_id);

    match router::dispatch(route, &state).instrument(span).await {
        Acknowledgement::Challenge(challenge) => Json(json!({ "challenge": challenge })),
        Acknowledgement::Ok => Json(json!({ "ok": true })),
    }
}

/// Build the axum router serving the webhook and health check.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(EVENTS_PATH, post(slack_events))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind the listener described by `bind_address` and `http_port`.
///
/// # Errors
///
/// Returns `AppError::Config` if the address is invalid or cannot be bound.
pub async fn bind(config: &GlobalConfig) -> Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.http_port)
        .parse()
        .map_err(|err| AppError::Config(format!("invalid bind address: {err}")))?;
    TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind {addr}: {err}")))
}

/// Serve the webhook on `listener` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the server fails while running.
pub async fn serve(state: Arc<AppState>, listener: TcpListener, ct: CancellationToken) -> Result<()> {
    let local = listener.local_addr()?;
    info!(%local, "serving slack webhook");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Io(format!("webhook server error: {err}")))?;

    info!("slack webhook shut down");
    Ok(())
}

//! Google Calendar sync endpoints
//!
//! The notifications route is the webhook the provider pushes to. It always
//! answers 200: the provider treats non-2xx responses as delivery failures
//! and retries with backoff, which would only replay work the sync token
//! already covers.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use calbridge_core::{NotificationOutcome, SyncOutcome};
use calbridge_domain::constants::{
    HEADER_CHANNEL_EXPIRATION, HEADER_CHANNEL_ID, HEADER_RESOURCE_ID, HEADER_RESOURCE_STATE,
    PRIMARY_CALENDAR_ID,
};
use calbridge_domain::{CalbridgeError, NotificationParams, ResourceState};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::AppContext;

/// Session header identifying the acting user on user-initiated routes.
const HEADER_SESSION_USER: &str = "x-session-user";

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

// All four headers are required; a missing expiration would otherwise read
// as "already expired" downstream and force a renewal on a healthy channel.
fn parse_notification(headers: &HeaderMap) -> Option<NotificationParams> {
    Some(NotificationParams {
        channel_id: header_value(headers, HEADER_CHANNEL_ID)?,
        resource_id: header_value(headers, HEADER_RESOURCE_ID)?,
        resource_state: ResourceState::parse(&header_value(headers, HEADER_RESOURCE_STATE)?),
        expiration: header_value(headers, HEADER_CHANNEL_EXPIRATION)?,
    })
}

fn outcome_label(outcome: &NotificationOutcome) -> &'static str {
    match outcome {
        NotificationOutcome::Handshake { .. } => "handshake",
        NotificationOutcome::Synced { sync: SyncOutcome::NoChanges, .. } => "no_updates",
        NotificationOutcome::Synced { .. } => "synced",
        NotificationOutcome::Ignored { .. } => "ignored",
    }
}

/// POST /api/sync/gcal/notifications
pub async fn notifications(State(ctx): State<AppContext>, headers: HeaderMap) -> Response {
    let Some(params) = parse_notification(&headers) else {
        warn!("notification missing x-goog headers, acknowledging without action");
        return Json(json!({ "status": "ignored", "reason": "missing notification headers" }))
            .into_response();
    };

    match ctx.sync.handle_notification(params).await {
        Ok(outcome) => Json(json!({
            "status": outcome_label(&outcome),
            "outcome": outcome,
        }))
        .into_response(),
        // the webhook still acknowledges; the error travels in the body
        Err(e) => {
            warn!(error = %e, "notification handling failed");
            Json(json!({
                "status": "error",
                "code": e.status_code(),
                "retryable": e.retryable(),
                "error": e,
            }))
            .into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartWatchRequest {
    pub calendar_id: Option<String>,
    pub channel_id: Option<String>,
}

/// POST /api/sync/gcal/watch/start
pub async fn start_watch(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(body): Json<StartWatchRequest>,
) -> Response {
    let Some(user) = header_value(&headers, HEADER_SESSION_USER) else {
        return error_response(&CalbridgeError::Auth("no session user".to_string()));
    };

    let calendar_id =
        body.calendar_id.unwrap_or_else(|| PRIMARY_CALENDAR_ID.to_string());
    let channel_id = body.channel_id.unwrap_or_else(|| format!("pri-{}", Uuid::new_v4()));

    match ctx.sync.begin_channel_watch(&user, &calendar_id, &channel_id).await {
        Ok(ack) => {
            info!(user, channel_id = %ack.channel_id, "watch started");
            Json(json!({ "status": "watching", "channel": ack })).into_response()
        }
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopWatchRequest {
    pub channel_id: String,
    pub resource_id: String,
}

/// POST /api/sync/gcal/watch/stop
pub async fn stop_watch(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(body): Json<StopWatchRequest>,
) -> Response {
    let Some(user) = header_value(&headers, HEADER_SESSION_USER) else {
        return error_response(&CalbridgeError::Auth("no session user".to_string()));
    };

    match ctx.sync.stop_watching_channel(&user, &body.channel_id, &body.resource_id).await {
        Ok(ack) => {
            info!(user, channel_id = %ack.channel_id, "watch stopped");
            Json(json!({ "status": "stopped", "channel": ack })).into_response()
        }
        Err(e) => error_response(&e),
    }
}

fn error_response(e: &CalbridgeError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "status": "error",
            "code": e.status_code(),
            "retryable": e.retryable(),
            "error": e,
        })),
    )
        .into_response()
}

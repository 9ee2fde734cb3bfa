//! HTTP router

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

pub mod sync;

/// Build the Axum router with all routes.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sync/gcal/notifications", post(sync::notifications))
        .route("/api/sync/gcal/watch/start", post(sync::start_watch))
        .route("/api/sync/gcal/watch/stop", post(sync::stop_watch))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// GET /health
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

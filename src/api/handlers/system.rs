//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    subscriptions: usize,
    topics: usize,
}

/// `GET /health` — Service health status and registry size.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.relay.registry();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            subscriptions: registry.len(),
            topics: registry.topic_count(),
        }),
    )
}

/// System routes. `POST /health` is still a publish, like every other path.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/health",
        get(health_handler).post(super::publish::publish_handler),
    )
}

//! HTTP layer: route handlers and router composition.
//!
//! `POST` on any path is treated as a publish call, matching how SNS
//! clients address a single regional endpoint. `GET /health` reports
//! liveness.
//!
//! There is no router-wide timeout: the publish handler bounds its body
//! read and the relay bounds its fan-out, so a slow subscriber never turns
//! an accepted publish into an error reply.

pub mod handlers;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the router with all endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::system::routes())
        .merge(handlers::publish::routes())
}

/// Builds the complete application: routes and request tracing.
pub fn build_app(state: AppState) -> Router {
    build_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

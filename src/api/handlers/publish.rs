//! SNS `Publish` endpoint.

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use crate::app_state::AppState;
use crate::error::{RelayError, XML_CONTENT_TYPE};

/// Largest publish body accepted, matching axum's default body limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// `POST /{*path}` — Publish a message to a topic.
///
/// Always answers `200` for a valid publish, whatever happened downstream.
///
/// # Errors
///
/// Returns [`RelayError::BodyRead`] if the body cannot be read within the
/// request timeout. Protocol errors are rendered by the relay itself.
pub async fn publish_handler(
    State(state): State<AppState>,
    body: Body,
) -> Result<impl IntoResponse, RelayError> {
    let body = tokio::time::timeout(
        state.request_timeout,
        axum::body::to_bytes(body, MAX_BODY_BYTES),
    )
    .await
    .map_err(|_| RelayError::BodyRead("timed out reading request body".to_string()))?
    .map_err(|err| RelayError::BodyRead(err.to_string()))?;
    let (status, xml) = state.relay.handle_publish(&body).await;
    Ok((status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml))
}

/// Publish routes: the root and every other path.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(publish_handler))
        .route("/{*path}", post(publish_handler))
}

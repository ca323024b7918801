//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::service::PublishRelay;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Publish relay wrapping the immutable subscription registry.
    pub relay: Arc<PublishRelay>,
    /// Upper bound on reading one inbound request body.
    pub request_timeout: Duration,
}

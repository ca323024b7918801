//! In-process mock queue endpoint for delivery tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One `SendMessage` call as seen by the mock.
#[derive(Debug, Clone)]
pub(crate) struct CapturedSend {
    /// `QueueName` query parameter.
    pub queue_name: Option<String>,
    /// Decoded form fields.
    pub form: HashMap<String, String>,
}

impl CapturedSend {
    pub(crate) fn field(&self, key: &str) -> Option<&str> {
        self.form.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct MockState {
    calls: Arc<Mutex<Vec<CapturedSend>>>,
    status: StatusCode,
    delay: Duration,
}

/// Queue endpoint listening on an ephemeral loopback port.
#[derive(Debug)]
pub(crate) struct MockQueue {
    pub endpoint: String,
    calls: Arc<Mutex<Vec<CapturedSend>>>,
}

impl MockQueue {
    /// Starts a mock answering every call with `status`.
    pub(crate) async fn start(status: StatusCode) -> Self {
        Self::start_with_delay(status, Duration::ZERO).await
    }

    /// Starts a mock that records each call, then waits `delay` before
    /// answering with `status`.
    #[allow(clippy::panic)]
    pub(crate) async fn start_with_delay(status: StatusCode, delay: Duration) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            calls: Arc::clone(&calls),
            status,
            delay,
        };
        let app = Router::new().fallback(record).with_state(state);

        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind mock queue");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("mock queue address");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            endpoint: format!("http://{addr}"),
            calls,
        }
    }

    /// Waits until at least `count` calls arrived or `limit` elapsed, and
    /// returns the calls received by then.
    pub(crate) async fn wait_for_calls(&self, count: usize, limit: Duration) -> Vec<CapturedSend> {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            let calls = self.calls().await;
            if calls.len() >= count || tokio::time::Instant::now() >= deadline {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Returns every call received so far.
    pub(crate) async fn calls(&self) -> Vec<CapturedSend> {
        self.calls.lock().await.clone()
    }
}

async fn record(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> StatusCode {
    state.calls.lock().await.push(CapturedSend {
        queue_name: query.get("QueueName").cloned(),
        form,
    });
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    state.status
}

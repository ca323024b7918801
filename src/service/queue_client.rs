//! SQS query-protocol client used for downstream delivery.

use std::time::Duration;

use reqwest::Url;

use crate::error::DeliveryError;

/// Queue API version sent with every `SendMessage` call.
pub const SQS_API_VERSION: &str = "2012-11-05";

/// Longest downstream error body kept in a [`DeliveryError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Thin wrapper over a pooled [`reqwest::Client`] with a per-call timeout.
#[derive(Debug, Clone)]
pub struct QueueClient {
    http: reqwest::Client,
}

impl QueueClient {
    /// Creates a client whose calls are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns a [`reqwest::Error`] if the HTTP client cannot be built
    /// (e.g. no TLS backend is available).
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Sends `body` to `queue_name` at `endpoint`.
    ///
    /// Issues `POST <endpoint>?QueueName=<queue_name>` with the form fields
    /// `Action=SendMessage`, `Version`, `QueueUrl` and `MessageBody`.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the endpoint is not a URL, the call
    /// fails or times out, or the endpoint answers with a non-2xx status.
    pub async fn send_message(
        &self,
        queue_name: &str,
        endpoint: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let url = queue_url(endpoint, queue_name)?;
        let form = [
            ("Action", "SendMessage"),
            ("Version", SQS_API_VERSION),
            ("QueueUrl", queue_name),
            ("MessageBody", body),
        ];

        let response = self.http.post(url).form(form.as_slice()).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let mut text = response.text().await.unwrap_or_default();
        if text.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|&i| text.is_char_boundary(i))
                .unwrap_or(0);
            text.truncate(cut);
        }
        Err(DeliveryError::Status { status, body: text })
    }
}

/// Builds `<endpoint>?QueueName=<queue_name>`, keeping any existing query.
///
/// # Errors
///
/// Returns [`DeliveryError::InvalidEndpoint`] if `endpoint` does not parse.
pub fn queue_url(endpoint: &str, queue_name: &str) -> Result<Url, DeliveryError> {
    let mut url = Url::parse(endpoint).map_err(|e| DeliveryError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut().append_pair("QueueName", queue_name);
    Ok(url)
}

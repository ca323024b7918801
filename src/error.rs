//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the per-request error type. Each variant maps to an
//! HTTP status code and an SNS-style XML `ErrorResponse` document, so
//! clients built against the real service can surface the failure.
//! [`ConfigError`] is fatal at startup and [`DeliveryError`] never leaves
//! the relay: it is logged per subscriber and dropped.

use std::path::PathBuf;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::ProtocolId;

/// Content type used for every XML body the relay returns.
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// SNS-style XML error document.
///
/// ```xml
/// <ErrorResponse>
///   <Error>
///     <Type>Sender</Type>
///     <Code>InvalidAction</Code>
///     <Message>unsupported action: CreateTopic</Message>
///   </Error>
///   <RequestId>6a1f...</RequestId>
/// </ErrorResponse>
/// ```
#[derive(Debug, Serialize)]
#[serde(rename = "ErrorResponse")]
pub struct ErrorResponse {
    /// Structured error payload.
    #[serde(rename = "Error")]
    pub error: ErrorBody,
    /// Identifier of the failed request.
    #[serde(rename = "RequestId")]
    pub request_id: String,
}

/// Inner error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// `Sender` for client faults, `Receiver` for server faults.
    #[serde(rename = "Type")]
    pub fault: &'static str,
    /// Protocol error code (e.g. `InvalidAction`).
    #[serde(rename = "Code")]
    pub code: &'static str,
    /// Human-readable error message.
    #[serde(rename = "Message")]
    pub message: String,
}

/// Per-request errors surfaced to the publishing client.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The body could not be decoded or a required field is missing.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The `Action` field named something other than `Publish`.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// The request body could not be read from the connection.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the protocol error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "MalformedQueryString",
            Self::UnsupportedAction(_) => "InvalidAction",
            Self::BodyRead(_) | Self::Internal(_) => "InternalFailure",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) | Self::UnsupportedAction(_) => StatusCode::BAD_REQUEST,
            Self::BodyRead(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the XML error document for this error.
    ///
    /// Falls back to the plain error message if serialization fails.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let fault = if self.status_code().is_client_error() {
            "Sender"
        } else {
            "Receiver"
        };
        let body = ErrorResponse {
            error: ErrorBody {
                fault,
                code: self.error_code(),
                message: self.to_string(),
            },
            request_id: ProtocolId::generate().to_string(),
        };
        quick_xml::se::to_string(&body).unwrap_or_else(|_| self.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
            self.to_xml(),
        )
            .into_response()
    }
}

/// Startup errors. The process must not serve requests after one of these.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The subscription document could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The subscription document is not valid JSON for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A subscription record is structurally valid but unusable.
    #[error("invalid subscription #{index}: {reason}")]
    InvalidSubscription {
        /// Zero-based position in the `Subscriptions` list.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// The listen address or port could not be resolved.
    #[error("invalid listen address: {0}")]
    InvalidListenAddr(String),
}

/// Failure delivering one message to one subscriber.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The subscription endpoint is not a valid URL.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// Configured endpoint.
        endpoint: String,
        /// Parser error.
        reason: String,
    },

    /// The downstream call exceeded the delivery timeout.
    #[error("delivery timed out")]
    Timeout,

    /// Connection or protocol failure talking to the endpoint.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned {status}: {body}")]
    Status {
        /// Downstream HTTP status.
        status: StatusCode,
        /// Downstream response body, possibly truncated.
        body: String,
    },

    /// The outbound message body could not be encoded.
    #[error("failed to encode message body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}

//! Relay configuration.
//!
//! Process settings come from command-line flags and environment
//! variables (optionally a `.env` file via `dotenvy`). The subscription
//! list and the default listen port come from a JSON document:
//!
//! ```json
//! {
//!   "Port": "9911",
//!   "Subscriptions": [
//!     { "Type": "sqs", "Topic": "arn:aws:sns:us-east-1:000000000000:orders",
//!       "QueueName": "orders", "Endpoint": "http://localhost:9324", "Raw": false }
//!   ]
//! }
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::{Subscription, SubscriptionTarget};
use crate::error::ConfigError;

/// Port used when neither the document nor `LISTEN_PORT` provide one.
pub const DEFAULT_PORT: u16 = 9911;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Path to the subscription document.
    #[arg(short, long, env = "RELAY_CONFIG", default_value = "./config.json")]
    pub config: PathBuf,
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::load`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Subscriptions in document order.
    pub subscriptions: Vec<Subscription>,

    /// Upper bound for one downstream delivery call.
    pub delivery_timeout: Duration,

    /// Upper bound for reading one inbound body, and for how long a publish
    /// waits on its fan-out before replying.
    pub request_timeout: Duration,

    /// Deliver to all matching subscriptions concurrently.
    pub fanout_parallel: bool,
}

impl RelayConfig {
    /// Loads configuration from arguments, environment and the subscription
    /// document.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document is unreadable or invalid,
    /// or the listen address cannot be formed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let args = Args::parse();
        let document = SubscriptionDocument::from_path(&args.config)?;
        Self::from_document(document)
    }

    /// Combines a parsed document with environment settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidListenAddr`] if `LISTEN_HOST` is not an
    /// IP address or `LISTEN_PORT` is set but not a port number.
    pub fn from_document(document: SubscriptionDocument) -> Result<Self, ConfigError> {
        let host: IpAddr = std::env::var("LISTEN_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidListenAddr(format!("LISTEN_HOST: {e}")))?;

        let port = match std::env::var("LISTEN_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidListenAddr(format!("LISTEN_PORT: {e}")))?,
            Err(_) => document.port.unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            subscriptions: document.subscriptions,
            delivery_timeout: Duration::from_secs(parse_env("DELIVERY_TIMEOUT_SECS", 10)),
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 30)),
            fanout_parallel: parse_env_bool("FANOUT_PARALLEL", false),
        })
    }
}

/// Parsed and validated subscription document.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionDocument {
    /// Listen port, given as a number or a numeric string.
    #[serde(rename = "Port", default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,

    /// Configured subscriptions.
    #[serde(rename = "Subscriptions", default)]
    pub subscriptions: Vec<Subscription>,
}

impl SubscriptionDocument {
    /// Reads and validates the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise
    /// see [`SubscriptionDocument::from_json`].
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON or an unknown
    /// subscription `Type`, and [`ConfigError::InvalidSubscription`] if a
    /// record has an empty topic or queue name or a non-http(s) endpoint.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let document: Self = serde_json::from_str(raw)?;
        for (index, subscription) in document.subscriptions.iter().enumerate() {
            validate_subscription(subscription)
                .map_err(|reason| ConfigError::InvalidSubscription { index, reason })?;
        }
        Ok(document)
    }
}

fn validate_subscription(subscription: &Subscription) -> Result<(), String> {
    if subscription.topic.is_empty() {
        return Err("Topic must not be empty".to_string());
    }
    match &subscription.target {
        SubscriptionTarget::Queue {
            queue_name,
            endpoint,
        } => {
            if queue_name.is_empty() {
                return Err("QueueName must not be empty".to_string());
            }
            let url = Url::parse(endpoint).map_err(|e| format!("Endpoint {endpoint:?}: {e}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(format!("Endpoint {endpoint:?}: scheme must be http or https"));
            }
        }
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortValue::Number(port)) => Ok(Some(port)),
        Some(PortValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(PortValue::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port {text:?}"))),
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
        _ => default,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "Port": "9911",
        "Subscriptions": [
            {"Type": "sqs", "Topic": "arn:t1", "QueueName": "q1", "Endpoint": "http://localhost:9000"},
            {"Type": "sqs", "Topic": "arn:t1", "QueueName": "q2", "Endpoint": "http://localhost:9000", "Raw": true}
        ]
    }"#;

    #[test]
    fn parses_document_in_order() {
        let Ok(doc) = SubscriptionDocument::from_json(VALID) else {
            panic!("valid document");
        };
        assert_eq!(doc.port, Some(9911));
        let names: Vec<&str> = doc.subscriptions.iter().map(Subscription::target_name).collect();
        assert_eq!(names, ["q1", "q2"]);
        assert!(doc.subscriptions.iter().any(|s| s.raw_delivery));
    }

    #[test]
    fn numeric_port_is_accepted() {
        let Ok(doc) = SubscriptionDocument::from_json(r#"{"Port": 4100, "Subscriptions": []}"#)
        else {
            panic!("valid document");
        };
        assert_eq!(doc.port, Some(4100));
    }

    #[test]
    fn missing_port_is_none() {
        let Ok(doc) = SubscriptionDocument::from_json(r#"{"Subscriptions": []}"#) else {
            panic!("valid document");
        };
        assert_eq!(doc.port, None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let result = SubscriptionDocument::from_json(r#"{"Subscriptions": [}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn bad_port_is_an_error() {
        let result = SubscriptionDocument::from_json(r#"{"Port": "http", "Subscriptions": []}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn relative_endpoint_is_rejected() {
        let raw = r#"{"Subscriptions": [
            {"Type": "sqs", "Topic": "arn:t1", "QueueName": "q1", "Endpoint": "http://ok"},
            {"Type": "sqs", "Topic": "arn:t1", "QueueName": "q2", "Endpoint": "localhost:9000/x"}
        ]}"#;
        let result = SubscriptionDocument::from_json(raw);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSubscription { index: 1, .. })
        ));
    }

    #[test]
    fn empty_topic_is_rejected() {
        let raw = r#"{"Subscriptions": [
            {"Type": "sqs", "Topic": "", "QueueName": "q1", "Endpoint": "http://ok"}
        ]}"#;
        let result = SubscriptionDocument::from_json(raw);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSubscription { index: 0, .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = SubscriptionDocument::from_path(Path::new("/nonexistent/relay/config.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}

//! Notification envelope for non-raw deliveries.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::{ProtocolId, Subscription};

/// JSON wrapper that SNS places around a message delivered to a queue.
#[derive(Debug, Serialize)]
pub struct NotificationEnvelope<'a> {
    /// Always `"Notification"`.
    #[serde(rename = "Type")]
    pub kind: &'static str,
    /// Identifier shared by every delivery of one publish.
    #[serde(rename = "MessageId")]
    pub message_id: ProtocolId,
    /// Topic of the subscription the message is delivered through.
    #[serde(rename = "TopicArn")]
    pub topic_arn: &'a str,
    /// Optional subject supplied by the publisher.
    #[serde(rename = "Subject", skip_serializing_if = "Option::is_none")]
    pub subject: Option<&'a str>,
    /// Original payload, unmodified.
    #[serde(rename = "Message")]
    pub message: &'a str,
    /// RFC 3339 UTC timestamp, whole seconds.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

impl<'a> NotificationEnvelope<'a> {
    /// Builds the envelope for `subscription`.
    #[must_use]
    pub fn new(
        subscription: &'a Subscription,
        message_id: ProtocolId,
        message: &'a str,
        subject: Option<&'a str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: "Notification",
            message_id,
            topic_arn: &subscription.topic,
            subject,
            message,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Builds the outbound body for one subscription.
///
/// Raw subscriptions receive `message` untouched; all others receive the
/// compact JSON envelope.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the envelope cannot be encoded.
pub fn build_message_body(
    subscription: &Subscription,
    message_id: ProtocolId,
    message: &str,
    subject: Option<&str>,
    now: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    if subscription.raw_delivery {
        return Ok(message.to_string());
    }
    serde_json::to_string(&NotificationEnvelope::new(
        subscription,
        message_id,
        message,
        subject,
        now,
    ))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn fixed_now() -> DateTime<Utc> {
        let Some(now) = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 15).single() else {
            panic!("valid timestamp");
        };
        now
    }

    #[test]
    fn envelope_wraps_payload() {
        let sub = Subscription::queue("arn:t1", "q1", "http://localhost:9000", false);
        let id = ProtocolId::generate();
        let payload = r#"{"order":42,"note":"quotes \" and \\ survive"}"#;

        let Ok(body) = build_message_body(&sub, id, payload, None, fixed_now()) else {
            panic!("encodable envelope");
        };
        let Ok(value) = serde_json::from_str::<Value>(&body) else {
            panic!("envelope is JSON");
        };
        assert_eq!(value["Type"], "Notification");
        assert_eq!(value["TopicArn"], "arn:t1");
        assert_eq!(value["Message"], payload);
        assert_eq!(value["MessageId"], id.to_string());
        assert_eq!(value["Timestamp"], "2024-05-17T08:30:15Z");
        assert!(value.get("Subject").is_none());
    }

    #[test]
    fn subject_is_included_when_present() {
        let sub = Subscription::queue("arn:t1", "q1", "http://localhost:9000", false);
        let Ok(body) = build_message_body(
            &sub,
            ProtocolId::generate(),
            "hello",
            Some("greeting"),
            fixed_now(),
        ) else {
            panic!("encodable envelope");
        };
        assert!(body.contains(r#""Subject":"greeting""#));
    }

    #[test]
    fn raw_delivery_is_identity() {
        let sub = Subscription::queue("arn:t1", "q1", "http://localhost:9000", true);
        let payload = "  not json {\n";
        let Ok(body) = build_message_body(
            &sub,
            ProtocolId::generate(),
            payload,
            Some("ignored"),
            fixed_now(),
        ) else {
            panic!("raw body");
        };
        assert_eq!(body, payload);
    }

    #[test]
    fn envelope_is_compact() {
        let sub = Subscription::queue("arn:t1", "q1", "http://localhost:9000", false);
        let Ok(body) = build_message_body(&sub, ProtocolId::generate(), "hello", None, fixed_now())
        else {
            panic!("encodable envelope");
        };
        assert!(body.contains(r#""Message":"hello""#));
        assert!(body.contains(r#""TopicArn":"arn:t1""#));
        assert!(!body.contains('\n'));
    }
}

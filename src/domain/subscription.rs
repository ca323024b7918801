//! Static subscription records.
//!
//! A [`Subscription`] binds a topic to one downstream target. The target
//! is a closed, tagged enum so new delivery kinds stay exhaustively
//! matchable wherever subscriptions are consumed.

use serde::Deserialize;

/// One configured binding from a topic to a downstream delivery target.
///
/// Deserialized from the `Subscriptions` list of the config document:
///
/// ```json
/// { "Type": "sqs", "Topic": "arn:t1", "QueueName": "q1",
///   "Endpoint": "http://localhost:9324", "Raw": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subscription {
    /// Topic identifier matched exactly against `TopicArn`.
    #[serde(rename = "Topic")]
    pub topic: String,

    /// Deliver the payload verbatim instead of wrapping it in an envelope.
    #[serde(rename = "Raw", alias = "RawMessageDelivery", default)]
    pub raw_delivery: bool,

    /// Where and how the message is delivered.
    #[serde(flatten)]
    pub target: SubscriptionTarget,
}

/// Downstream delivery target, discriminated by the `Type` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "Type")]
pub enum SubscriptionTarget {
    /// SQS-compatible queue reached over the query protocol.
    #[serde(rename = "sqs", alias = "queue")]
    Queue {
        /// Queue name, sent as both `QueueName` and `QueueUrl`.
        #[serde(rename = "QueueName")]
        queue_name: String,
        /// Base URL of the queue service.
        #[serde(rename = "Endpoint")]
        endpoint: String,
    },
}

impl Subscription {
    /// Creates a queue-backed subscription.
    #[must_use]
    pub fn queue(
        topic: impl Into<String>,
        queue_name: impl Into<String>,
        endpoint: impl Into<String>,
        raw_delivery: bool,
    ) -> Self {
        Self {
            topic: topic.into(),
            raw_delivery,
            target: SubscriptionTarget::Queue {
                queue_name: queue_name.into(),
                endpoint: endpoint.into(),
            },
        }
    }

    /// Short label for log lines (the queue name for queue targets).
    #[must_use]
    pub fn target_name(&self) -> &str {
        match &self.target {
            SubscriptionTarget::Queue { queue_name, .. } => queue_name,
        }
    }
}

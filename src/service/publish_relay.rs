//! Publish relay: matches a publish to its subscriptions and fans it out.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use super::QueueClient;
use crate::domain::{
    ProtocolId, PublishRequest, PublishResponse, Subscription, SubscriptionRegistry,
    SubscriptionTarget, build_message_body,
};
use crate::error::{DeliveryError, RelayError};

/// How deliveries for one publish are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanoutMode {
    /// One subscriber after another, in registry order.
    #[default]
    Sequential,
    /// All subscribers at once.
    Parallel,
}

/// Result of delivering to one subscriber.
#[derive(Debug)]
pub struct DeliveryReport {
    /// Topic of the subscription.
    pub topic: String,
    /// Target label (queue name).
    pub target: String,
    /// Outcome of the attempt.
    pub result: Result<(), DeliveryError>,
}

/// Everything a handled publish produced.
#[derive(Debug)]
pub struct PublishOutcome {
    /// Reply returned to the caller.
    pub response: PublishResponse,
    /// One report per matching subscription, in registry order. Empty when
    /// the fan-out was detached.
    pub deliveries: Vec<DeliveryReport>,
    /// The fan-out outlived the budget and keeps running in the background.
    pub detached: bool,
}

impl PublishOutcome {
    /// Number of subscribers that accepted the message.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.deliveries.iter().filter(|d| d.result.is_ok()).count()
    }
}

/// Stateless publish handler built once around an immutable registry.
///
/// Delivery failures are isolated per subscriber: they are logged, recorded
/// in the [`PublishOutcome`], and never change the caller's reply. With a
/// fan-out budget set, the reply is sent once the budget runs out and the
/// remaining deliveries finish in a detached task.
#[derive(Debug, Clone)]
pub struct PublishRelay {
    registry: Arc<SubscriptionRegistry>,
    client: QueueClient,
    fanout: FanoutMode,
    fanout_budget: Option<Duration>,
}

impl PublishRelay {
    /// Creates a new `PublishRelay` that waits for every delivery.
    #[must_use]
    pub fn new(registry: Arc<SubscriptionRegistry>, client: QueueClient, fanout: FanoutMode) -> Self {
        Self {
            registry,
            client,
            fanout,
            fanout_budget: None,
        }
    }

    /// Caps how long a publish waits for its deliveries before replying.
    #[must_use]
    pub fn with_fanout_budget(mut self, budget: Duration) -> Self {
        self.fanout_budget = Some(budget);
        self
    }

    /// Returns a reference to the inner [`SubscriptionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Handles one raw publish body and returns `(status, body)`.
    ///
    /// Success yields `200` with the `PublishResponse` XML; protocol errors
    /// yield their status with an XML error document.
    pub async fn handle_publish(&self, body: &[u8]) -> (StatusCode, String) {
        let rendered = match self.publish(body).await {
            Ok(outcome) => outcome.response.to_xml().map_err(RelayError::Internal),
            Err(err) => Err(err),
        };
        match rendered {
            Ok(xml) => (StatusCode::OK, xml),
            Err(err) => (err.status_code(), err.to_xml()),
        }
    }

    /// Decodes a publish body, delivers it to every matching subscription
    /// and builds the reply.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MalformedRequest`] or
    /// [`RelayError::UnsupportedAction`] if the body is not a valid publish.
    /// Delivery failures are reported in the outcome, not as errors.
    pub async fn publish(&self, body: &[u8]) -> Result<PublishOutcome, RelayError> {
        let request = PublishRequest::parse(body)?;
        let message_id = ProtocolId::generate();
        let response = PublishResponse::new(message_id, ProtocolId::generate());

        let Some(budget) = self.fanout_budget else {
            let deliveries = self.fan_out(&request, message_id).await;
            return Ok(PublishOutcome {
                response,
                deliveries,
                detached: false,
            });
        };

        let relay = self.clone();
        let mut task = tokio::spawn(async move { relay.fan_out(&request, message_id).await });
        let (deliveries, detached) = match tokio::time::timeout(budget, &mut task).await {
            Ok(Ok(deliveries)) => (deliveries, false),
            Ok(Err(err)) => {
                tracing::error!(%message_id, error = %err, "fan-out task failed");
                (Vec::new(), false)
            }
            Err(_) => {
                tracing::warn!(
                    %message_id,
                    budget_ms = budget.as_millis(),
                    "fan-out exceeded budget, replying and continuing in background"
                );
                (Vec::new(), true)
            }
        };
        Ok(PublishOutcome {
            response,
            deliveries,
            detached,
        })
    }

    async fn fan_out(&self, request: &PublishRequest, message_id: ProtocolId) -> Vec<DeliveryReport> {
        let now = Utc::now();
        let matches = self.registry.find_by_topic(&request.topic_arn);
        let deliveries = match self.fanout {
            FanoutMode::Sequential => {
                let mut reports = Vec::new();
                for subscription in matches {
                    reports.push(self.deliver(subscription, request, message_id, now).await);
                }
                reports
            }
            FanoutMode::Parallel => {
                join_all(matches.map(|s| self.deliver(s, request, message_id, now))).await
            }
        };

        tracing::info!(
            topic = %request.topic_arn,
            %message_id,
            subscribers = deliveries.len(),
            delivered = deliveries.iter().filter(|d| d.result.is_ok()).count(),
            "message published"
        );
        deliveries
    }

    async fn deliver(
        &self,
        subscription: &Subscription,
        request: &PublishRequest,
        message_id: ProtocolId,
        now: DateTime<Utc>,
    ) -> DeliveryReport {
        let result = self
            .try_deliver(subscription, request, message_id, now)
            .await;
        if let Err(err) = &result {
            tracing::warn!(
                topic = %subscription.topic,
                target = subscription.target_name(),
                %message_id,
                error = %err,
                "delivery failed"
            );
        }
        DeliveryReport {
            topic: subscription.topic.clone(),
            target: subscription.target_name().to_string(),
            result,
        }
    }

    async fn try_deliver(
        &self,
        subscription: &Subscription,
        request: &PublishRequest,
        message_id: ProtocolId,
        now: DateTime<Utc>,
    ) -> Result<(), DeliveryError> {
        let body = build_message_body(
            subscription,
            message_id,
            &request.message,
            request.subject.as_deref(),
            now,
        )?;
        match &subscription.target {
            SubscriptionTarget::Queue {
                queue_name,
                endpoint,
            } => {
                tracing::debug!(queue = %queue_name, %endpoint, body = %body, "dispatching");
                self.client.send_message(queue_name, endpoint, &body).await
            }
        }
    }
}

//! Service layer: publish orchestration and downstream delivery.
//!
//! [`PublishRelay`] matches a publish against the
//! [`crate::domain::SubscriptionRegistry`] and hands each message to the
//! [`QueueClient`].

pub mod publish_relay;
pub mod queue_client;

pub use publish_relay::{DeliveryReport, FanoutMode, PublishOutcome, PublishRelay};
pub use queue_client::QueueClient;

//! Domain layer: subscriptions, the registry, and the publish protocol.
//!
//! Everything here is pure data and pure functions. Network delivery
//! lives in [`crate::service`].

pub mod envelope;
pub mod protocol_id;
pub mod publish_request;
pub mod publish_response;
pub mod subscription;
pub mod subscription_registry;

pub use envelope::{NotificationEnvelope, build_message_body};
pub use protocol_id::ProtocolId;
pub use publish_request::PublishRequest;
pub use publish_response::PublishResponse;
pub use subscription::{Subscription, SubscriptionTarget};
pub use subscription_registry::SubscriptionRegistry;

//! # sns-relay
//!
//! SNS-compatible publish endpoint that relays notifications to
//! SQS-compatible queues.
//!
//! Clients that speak the SNS query protocol can be pointed at this
//! service during development; every `Publish` is fanned out to the
//! queues subscribed to its topic, wrapped in the SNS notification
//! envelope unless the subscription asks for raw delivery.
//!
//! ## Architecture
//!
//! ```text
//! SNS client (form-encoded POST)
//!     │
//!     ├── Publish handler (api/)
//!     │
//!     ├── PublishRelay (service/)
//!     │     ├── SubscriptionRegistry (domain/, immutable)
//!     │     └── envelope + reply XML (domain/)
//!     │
//!     └── QueueClient ──► SendMessage on each queue endpoint
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;

#[cfg(test)]
mod test_support;

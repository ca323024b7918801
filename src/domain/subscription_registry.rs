//! Immutable subscription lookup.
//!
//! [`SubscriptionRegistry`] is built once at startup and only read
//! afterwards, so it is shared across request tasks behind an `Arc`
//! without any lock.

use std::collections::HashSet;

use super::Subscription;

/// Ordered, read-only list of subscriptions.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionRegistry {
    /// Creates a registry preserving the given order.
    #[must_use]
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self { subscriptions }
    }

    /// Returns every subscription on `topic`, in configuration order.
    pub fn find_by_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a Subscription> {
        self.subscriptions.iter().filter(move |s| s.topic == topic)
    }

    /// Returns all subscriptions in configuration order.
    #[must_use]
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Returns the number of subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` if no subscriptions are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Returns the number of distinct topics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.subscriptions
            .iter()
            .map(|s| s.topic.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_registry() -> SubscriptionRegistry {
        SubscriptionRegistry::new(vec![
            Subscription::queue("arn:t1", "q1", "http://localhost:9000", false),
            Subscription::queue("arn:t2", "q2", "http://localhost:9000", false),
            Subscription::queue("arn:t1", "q3", "http://localhost:9001", true),
        ])
    }

    #[test]
    fn find_returns_all_matches_in_order() {
        let registry = make_registry();
        let names: Vec<&str> = registry
            .find_by_topic("arn:t1")
            .map(Subscription::target_name)
            .collect();
        assert_eq!(names, ["q1", "q3"]);
    }

    #[test]
    fn find_matches_exactly() {
        let registry = make_registry();
        assert_eq!(registry.find_by_topic("arn:t").count(), 0);
        assert_eq!(registry.find_by_topic("ARN:T1").count(), 0);
        assert_eq!(registry.find_by_topic("arn:t2").count(), 1);
    }

    #[test]
    fn unknown_topic_has_no_subscribers() {
        let registry = make_registry();
        assert!(registry.find_by_topic("arn:nope").next().is_none());
    }

    #[test]
    fn len_and_topic_count() {
        let registry = make_registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.topic_count(), 2);
        assert!(!registry.is_empty());

        let empty = SubscriptionRegistry::default();
        assert!(empty.is_empty());
        assert_eq!(empty.topic_count(), 0);
    }
}

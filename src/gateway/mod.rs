//! Remote operation gateway: one create-subscription call, classified.
//!
//! The remote side offers no structured error taxonomy we can rely on, only
//! free-text messages. [`classify_failure`] is the single place that turns
//! such a message into an [`Outcome`].

pub mod youtube;

pub use youtube::YouTubeClient;

use crate::error::Result;
use crate::model::{ChannelId, Outcome};
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use std::future::Future;
use std::time::Instant;

/// Marker the API puts in errors once the daily quota is spent.
pub const QUOTA_EXCEEDED_MARKER: &str = "quotaExceeded";
/// Marker the API puts in errors when the subscription already exists.
pub const DUPLICATE_MARKER: &str = "subscriptionDuplicate";

/// Raw transport for creating a subscription.
///
/// Implementations report failure as an error whose `Display` text carries
/// whatever the remote side said.
pub trait SubscriptionApi {
    fn insert_subscription(&self, channel: &ChannelId) -> impl Future<Output = Result<()>> + Send;
}

impl<A: SubscriptionApi + ?Sized> SubscriptionApi for &A {
    fn insert_subscription(&self, channel: &ChannelId) -> impl Future<Output = Result<()>> + Send {
        (**self).insert_subscription(channel)
    }
}

/// Classify a remote failure message.
///
/// Checks run in a fixed order (quota, then duplicate, then anything else)
/// because a message may mention more than one marker.
pub fn classify_failure(message: &str) -> Outcome {
    if message.contains(QUOTA_EXCEEDED_MARKER) {
        Outcome::QuotaExceeded {
            message: message.to_string(),
        }
    } else if message.contains(DUPLICATE_MARKER) {
        Outcome::AlreadySubscribed
    } else {
        Outcome::OtherFailure {
            message: message.to_string(),
        }
    }
}

/// Wraps a [`SubscriptionApi`] and yields classified outcomes.
pub struct Gateway<A> {
    api: A,
}

impl<A: SubscriptionApi> Gateway<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Attempt to subscribe to `channel` once.
    pub async fn subscribe(&self, channel: &ChannelId) -> Outcome {
        let start = Instant::now();
        let outcome = match self.api.insert_subscription(channel).await {
            Ok(()) => Outcome::Success,
            Err(e) => classify_failure(&e.to_string()),
        };
        metrics::gateway_duration_ms().record(
            start.elapsed().as_secs_f64() * 1000.0,
            &[KeyValue::new("outcome", outcome.label())],
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_wins_over_duplicate() {
        let msg = "403 Forbidden: quotaExceeded (also subscriptionDuplicate)";
        assert!(matches!(
            classify_failure(msg),
            Outcome::QuotaExceeded { .. }
        ));
    }

    #[test]
    fn duplicate_is_normalized() {
        let msg = r#"{"error":{"errors":[{"reason":"subscriptionDuplicate"}]}}"#;
        assert_eq!(classify_failure(msg), Outcome::AlreadySubscribed);
    }

    #[test]
    fn unknown_message_is_other_failure() {
        assert_eq!(
            classify_failure("connection reset by peer"),
            Outcome::OtherFailure {
                message: "connection reset by peer".to_string()
            }
        );
    }

    #[test]
    fn markers_are_case_sensitive() {
        assert!(matches!(
            classify_failure("QUOTAEXCEEDED"),
            Outcome::OtherFailure { .. }
        ));
    }
}

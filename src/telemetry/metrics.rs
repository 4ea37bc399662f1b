//! Metric instrument factories for resubscribe.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an OTLP endpoint these are no-ops.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("resubscribe")
}

/// Counter: classified subscription attempts.
/// Labels: `outcome` ("success" | "already_subscribed" | "quota_exceeded" | "other_failure").
pub fn subscription_outcomes() -> Counter<u64> {
    meter()
        .u64_counter("resubscribe.subscription.outcomes")
        .with_description("Classified subscription attempts")
        .build()
}

/// Counter: items skipped because an earlier run already resolved them.
pub fn items_skipped() -> Counter<u64> {
    meter()
        .u64_counter("resubscribe.items.skipped")
        .with_description("Work items skipped as already resolved")
        .build()
}

/// Histogram: gateway call duration in milliseconds.
/// Labels: `outcome`.
pub fn gateway_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("resubscribe.gateway.duration_ms")
        .with_description("Subscription call duration in milliseconds")
        .with_unit("ms")
        .build()
}

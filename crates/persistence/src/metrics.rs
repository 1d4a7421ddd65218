//! Store metrics collection.
//!
//! Provides functions for recording store-related metrics.

use metrics::{counter, gauge, histogram};
use std::time::Instant;

use crate::db::CollectionSizes;

/// Record how long a repository operation took.
pub fn record_operation_duration(operation: &str, duration_secs: f64) {
    histogram!(
        "store_operation_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Count a snapshot write that storage rejected.
pub fn record_persist_failure(key: &str) {
    counter!("store_persist_failures_total", "record" => key.to_string()).increment(1);
}

/// Record collection sizes.
///
/// Call this function periodically to track store growth.
pub fn record_collection_sizes(sizes: &CollectionSizes) {
    gauge!("store_collection_size", "collection" => "users").set(sizes.users as f64);
    gauge!("store_collection_size", "collection" => "organizations")
        .set(sizes.organizations as f64);
    gauge!("store_collection_size", "collection" => "events").set(sizes.events as f64);
    gauge!("store_collection_size", "collection" => "notifications")
        .set(sizes.notifications as f64);
}

/// A helper to time repository operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = OperationTimer::new("events.subscribe");
/// let result = self.subscribe_inner(event_id, email).await;
/// timer.record();
/// result
/// ```
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        record_operation_duration(self.operation, self.start.elapsed().as_secs_f64());
    }
}

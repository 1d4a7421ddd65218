//! Publishes collection sizes as gauges.

use persistence::metrics::record_collection_sizes;
use persistence::Database;

use super::scheduler::{Job, JobFrequency};
use crate::error::ApiError;

pub struct StoreMetricsJob {
    db: Database,
    interval_secs: u64,
}

impl StoreMetricsJob {
    pub fn new(db: Database, interval_secs: u64) -> Self {
        Self { db, interval_secs }
    }
}

#[async_trait::async_trait]
impl Job for StoreMetricsJob {
    fn name(&self) -> &'static str {
        "store_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self) -> Result<(), ApiError> {
        let sizes = self.db.sizes().await;
        tracing::debug!(
            users = sizes.users,
            organizations = sizes.organizations,
            events = sizes.events,
            notifications = sizes.notifications,
            "Collection sizes"
        );
        record_collection_sizes(&sizes);
        Ok(())
    }
}

//! Reminds users of favorited events that start soon.

use std::sync::Arc;

use chrono::Utc;

use super::scheduler::{Job, JobFrequency};
use crate::error::ApiError;
use crate::services::NotificationService;

pub struct EventReminderJob {
    notifications: Arc<NotificationService>,
    interval_minutes: u64,
}

impl EventReminderJob {
    pub fn new(notifications: Arc<NotificationService>, interval_minutes: u64) -> Self {
        Self {
            notifications,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for EventReminderJob {
    fn name(&self) -> &'static str {
        "event_reminders"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    /// Catch up on reminders missed while the process was down.
    fn run_at_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), ApiError> {
        let created = self
            .notifications
            .generate_event_reminders(Utc::now())
            .await?;
        if created > 0 {
            tracing::info!(created, "Reminders sent");
        }
        Ok(())
    }
}

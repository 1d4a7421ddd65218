//! Background job scheduler and job implementations.

mod event_reminders;
mod scheduler;
mod store_metrics;

pub use event_reminders::EventReminderJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
pub use store_metrics::StoreMetricsJob;

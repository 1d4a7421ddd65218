//! Domain services for CibESphere.
//!
//! Services contain business logic that operates on domain models and has no
//! storage or runtime dependencies.

pub mod dashboard;
pub mod notification;

pub use dashboard::DashboardAccumulator;
pub use notification::{needs_reminder, NotificationTemplate, REMINDER_WINDOW_HOURS};

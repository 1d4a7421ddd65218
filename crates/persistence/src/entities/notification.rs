//! Notification record.
//!
//! Notifications are stored in their domain shape.

pub type NotificationRecord = domain::models::Notification;

//! Stored record shapes.
//!
//! Records reference each other by id; domain models returned to callers
//! embed the resolved organization instead.

pub mod event;
pub mod notification;
pub mod organization;
pub mod session;
pub mod user;

pub use event::EventRecord;
pub use notification::NotificationRecord;
pub use organization::OrganizationRecord;
pub use session::SessionRecord;
pub use user::UserRecord;

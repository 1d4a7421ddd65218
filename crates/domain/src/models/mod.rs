//! Domain models for CibESphere.

pub mod dashboard;
pub mod event;
pub mod filter;
pub mod notification;
pub mod organization;
pub mod reference;
pub mod session;
pub mod user;

pub use dashboard::DashboardStats;
pub use event::{
    AgendaItem, BookmarkToggle, CreateEventRequest, Event, EventDetails, EventLanguage,
    EventLevel, EventStatus, EventTiming, Speaker, SubscriptionConfirmation, UpdateEventRequest,
};
pub use filter::{EventFilter, FilterError};
pub use notification::{Notification, NotificationKind};
pub use organization::{Organization, UpdateOrganizationRequest};
pub use session::{Session, SessionState};
pub use user::{LoginRequest, RegisterRequest, Role, SocialLinks, UpdateUserRequest, User};

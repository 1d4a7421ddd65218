//! Repository implementations over the collection store.

pub mod dashboard;
pub mod event;
pub mod notification;
pub mod organization;
pub mod session;
pub mod user;

pub use dashboard::DashboardRepository;
pub use event::{DeletedEvent, EventRepository, SubscribeOutcome};
pub use notification::NotificationRepository;
pub use organization::OrganizationRepository;
pub use session::SessionRepository;
pub use user::{BookmarkOutcome, NewOrganization, NewUser, UserCredentials, UserRepository};

//! Client-facing services.
//!
//! Each service owns the repositories it needs and routes every call through
//! the simulated [`Network`](network::Network).

pub mod auth;
pub mod dashboard;
pub mod events;
pub mod network;
pub mod notifications;
pub mod organizations;
pub mod session;
pub mod users;

pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use events::EventService;
pub use network::{Latency, Network};
pub use notifications::NotificationService;
pub use organizations::OrganizationService;
pub use session::SessionStore;
pub use users::UserService;

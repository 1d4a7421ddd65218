//! Dashboard statistics.

use serde::{Deserialize, Serialize};

/// Aggregates shown on the organizer and admin dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_events: u64,
    pub total_attendees: u64,
    /// Distinct non-empty venue cities.
    pub total_cities: u64,
    pub published_events: u64,
}

//! Dashboard aggregation.

use std::collections::HashSet;

use crate::models::{DashboardStats, EventStatus};

/// Folds events into [`DashboardStats`] one at a time.
///
/// ```
/// use domain::models::EventStatus;
/// use domain::services::DashboardAccumulator;
///
/// let mut acc = DashboardAccumulator::default();
/// acc.add(Some("Madrid"), 287, EventStatus::Published);
/// acc.add(Some("Madrid"), 15, EventStatus::Draft);
/// let stats = acc.finish();
/// assert_eq!(stats.total_events, 2);
/// assert_eq!(stats.total_cities, 1);
/// ```
#[derive(Debug, Default)]
pub struct DashboardAccumulator {
    stats: DashboardStats,
    cities: HashSet<String>,
}

impl DashboardAccumulator {
    pub fn add(&mut self, venue_city: Option<&str>, current_attendees: u32, status: EventStatus) {
        self.stats.total_events += 1;
        self.stats.total_attendees += u64::from(current_attendees);
        if status == EventStatus::Published {
            self.stats.published_events += 1;
        }
        if let Some(city) = venue_city.map(str::trim).filter(|c| !c.is_empty()) {
            self.cities.insert(city.to_string());
        }
    }

    pub fn finish(mut self) -> DashboardStats {
        self.stats.total_cities = self.cities.len() as u64;
        self.stats
    }
}

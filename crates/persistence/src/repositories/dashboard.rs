//! Dashboard statistics repository.

use domain::models::DashboardStats;
use domain::services::DashboardAccumulator;
use uuid::Uuid;

use crate::db::Database;
use crate::entities::EventRecord;
use crate::metrics::OperationTimer;

/// Aggregates over the events collection.
#[derive(Clone)]
pub struct DashboardRepository {
    db: Database,
}

fn aggregate<'a>(events: impl Iterator<Item = &'a EventRecord>) -> DashboardStats {
    let mut acc = DashboardAccumulator::default();
    for event in events {
        acc.add(
            event.details.venue_city.as_deref(),
            event.current_attendees,
            event.status,
        );
    }
    acc.finish()
}

impl DashboardRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Statistics over every event of one organization, whatever its status.
    pub async fn organization_stats(&self, organization_id: Uuid) -> DashboardStats {
        let timer = OperationTimer::new("dashboard.organization_stats");
        let events = self.db.events().read().await;
        let stats = aggregate(events.iter().filter(|e| e.organization_id == organization_id));
        timer.record();
        stats
    }

    /// Statistics over the whole catalog.
    pub async fn global_stats(&self) -> DashboardStats {
        let timer = OperationTimer::new("dashboard.global_stats");
        let events = self.db.events().read().await;
        let stats = aggregate(events.iter());
        timer.record();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Fixture;

    async fn repo() -> DashboardRepository {
        let fixture = Fixture::bundled().unwrap();
        DashboardRepository::new(Database::open_in_memory(Some(&fixture)).await.unwrap())
    }

    #[tokio::test]
    async fn test_global_stats_over_seed() {
        let stats = repo().await.global_stats().await;
        assert_eq!(stats.total_events, 4);
        assert_eq!(stats.published_events, 4);
        assert_eq!(stats.total_attendees, 287 + 15 + 120 + 45);
        assert_eq!(stats.total_cities, 4);
    }

    #[tokio::test]
    async fn test_organization_stats() {
        let repo = repo().await;
        let stats = repo
            .organization_stats("0a000000-0000-4000-a000-000000000001".parse().unwrap())
            .await;
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.total_attendees, 287 + 15);
        assert_eq!(stats.total_cities, 2);

        let none = repo.organization_stats(Uuid::new_v4()).await;
        assert_eq!(none, DashboardStats::default());
    }
}

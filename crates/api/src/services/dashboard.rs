use domain::models::DashboardStats;
use persistence::repositories::{DashboardRepository, OrganizationRepository};
use persistence::Database;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::network::{Latency, Network};

/// Aggregate counters for the organizer and admin dashboards.
pub struct DashboardService {
    dashboard: DashboardRepository,
    organizations: OrganizationRepository,
    network: Network,
}

impl DashboardService {
    pub fn new(db: &Database, network: Network) -> Self {
        Self {
            dashboard: DashboardRepository::new(db.clone()),
            organizations: OrganizationRepository::new(db.clone()),
            network,
        }
    }

    /// Stats over one organization's events. An organization without
    /// events gets zeros; an unknown one is `NotFound`.
    pub async fn organizer_dashboard(
        &self,
        organization_id: Uuid,
    ) -> Result<DashboardStats, ApiError> {
        self.network
            .call("organizer_dashboard", Latency::Half, async {
                if self.organizations.find_by_id(organization_id).await.is_none() {
                    return Err(ApiError::not_found("Organization"));
                }
                Ok(self.dashboard.organization_stats(organization_id).await)
            })
            .await
    }

    pub async fn admin_dashboard(&self) -> Result<DashboardStats, ApiError> {
        self.network
            .call("admin_dashboard", Latency::Half, async {
                Ok(self.dashboard.global_stats().await)
            })
            .await
    }
}

//! Organization profiles and moderation.

use std::sync::Arc;

use domain::models::{Organization, UpdateOrganizationRequest};
use domain::services::NotificationTemplate;
use persistence::repositories::{NotificationRepository, OrganizationRepository};
use persistence::Database;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::services::network::{Latency, Network};
use crate::services::notifications::deliver;
use crate::services::session::SessionStore;

pub struct OrganizationService {
    organizations: OrganizationRepository,
    notifications: NotificationRepository,
    session: Arc<SessionStore>,
    network: Network,
}

impl OrganizationService {
    pub fn new(db: &Database, session: Arc<SessionStore>, network: Network) -> Self {
        Self {
            organizations: OrganizationRepository::new(db.clone()),
            notifications: NotificationRepository::new(db.clone()),
            session,
            network,
        }
    }

    /// Also resolves slugs the organization had before a rename.
    pub async fn get_organization_by_slug(&self, slug: &str) -> Result<Organization, ApiError> {
        self.network
            .call("get_organization_by_slug", Latency::Half, async {
                self.organizations
                    .find_by_slug(slug)
                    .await
                    .ok_or_else(|| ApiError::not_found("Organization"))
            })
            .await
    }

    pub async fn get_organization(&self, id: Uuid) -> Result<Organization, ApiError> {
        self.network
            .call("get_organization", Latency::Third, async {
                self.organizations
                    .find_by_id(id)
                    .await
                    .ok_or_else(|| ApiError::not_found("Organization"))
            })
            .await
    }

    pub async fn list_organizations(&self) -> Result<Vec<Organization>, ApiError> {
        self.network
            .call("list_organizations", Latency::Half, async {
                Ok(self.organizations.list().await)
            })
            .await
    }

    /// Marks the organization verified and tells its owner.
    pub async fn verify_organization(&self, id: Uuid) -> Result<Organization, ApiError> {
        let organization = self
            .network
            .call("verify_organization", Latency::Half, async {
                let organization = self
                    .organizations
                    .set_verified(id, true)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Organization"))?;

                if let Some(owner_id) = organization.owner_id {
                    deliver(
                        &self.notifications,
                        vec![NotificationTemplate::organization_verified(owner_id, &organization)],
                    )
                    .await;
                }
                tracing::info!(organization_id = %id, "Organization verified");
                Ok(organization)
            })
            .await?;

        self.session.resync().await;
        Ok(organization)
    }

    /// Events and members see the change on their next read; a logged-in
    /// member's session snapshot is refreshed right away.
    pub async fn update_organization(
        &self,
        id: Uuid,
        request: UpdateOrganizationRequest,
    ) -> Result<Organization, ApiError> {
        let organization = self
            .network
            .call("update_organization", Latency::Eighths(5), async {
                request.validate()?;
                self.organizations
                    .update(id, request)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Organization"))
            })
            .await?;

        self.session.resync().await;
        Ok(organization)
    }
}

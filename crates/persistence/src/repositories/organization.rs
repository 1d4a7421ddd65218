//! Organization repository.

use chrono::Utc;
use domain::models::{Organization, UpdateOrganizationRequest};
use uuid::Uuid;

use crate::db::Database;
use crate::entities::OrganizationRecord;
use crate::error::StoreError;
use crate::metrics::OperationTimer;

/// Repository for the organizations collection.
#[derive(Clone)]
pub struct OrganizationRepository {
    db: Database,
}

/// Picks a slug for `name` that no organization answers to, except `own`.
pub(crate) fn organization_slug(
    name: &str,
    organizations: &[OrganizationRecord],
    own: Option<Uuid>,
) -> String {
    shared::slug::unique_slug(name, |candidate| {
        organizations
            .iter()
            .filter(|org| Some(org.id) != own)
            .any(|org| org.answers_to(candidate))
    })
}

impl OrganizationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Organization> {
        let organizations = self.db.organizations().read().await;
        organizations
            .iter()
            .find(|org| org.id == id)
            .map(Organization::from)
    }

    /// Finds by current slug or by a slug the organization had before a rename.
    pub async fn find_by_slug(&self, slug: &str) -> Option<Organization> {
        let organizations = self.db.organizations().read().await;
        organizations
            .iter()
            .find(|org| org.slug == slug)
            .or_else(|| organizations.iter().find(|org| org.answers_to(slug)))
            .map(Organization::from)
    }

    /// All organizations, by name.
    pub async fn list(&self) -> Vec<Organization> {
        let organizations = self.db.organizations().read().await;
        let mut list: Vec<Organization> = organizations.iter().map(Organization::from).collect();
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        list
    }

    /// Applies a profile patch.
    ///
    /// A name change regenerates the slug; the old slug stays resolvable.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateOrganizationRequest,
    ) -> Result<Option<Organization>, StoreError> {
        let timer = OperationTimer::new("organizations.update");
        let mut staged = self.db.stage_organizations().await;

        let Some(index) = staged.rows().iter().position(|org| org.id == id) else {
            return Ok(None);
        };

        let new_slug = match &request.name {
            Some(name) if shared::slug::slugify(name) != shared::slug::slugify(&staged.rows()[index].name) => {
                Some(organization_slug(name, staged.rows(), Some(id)))
            }
            _ => None,
        };

        let record = &mut staged.rows_mut()[index];
        if let Some(slug) = new_slug {
            if slug != record.slug {
                let old = std::mem::replace(&mut record.slug, slug);
                record.previous_slugs.retain(|s| *s != record.slug);
                record.previous_slugs.push(old);
            }
        }
        if let Some(name) = request.name {
            record.name = name.trim().to_string();
        }
        if let Some(logo_url) = request.logo_url {
            record.logo_url = logo_url;
        }
        if let Some(city) = request.city {
            record.city = city;
        }
        if let Some(description) = request.description {
            record.description = Some(description);
        }
        if let Some(banner_url) = request.banner_url {
            record.banner_url = Some(banner_url);
        }
        if let Some(website) = request.website {
            record.website = Some(website);
        }
        if let Some(email) = request.email {
            record.email = Some(email);
        }
        if let Some(social_links) = request.social_links {
            record.social_links = social_links;
        }
        record.updated_at = Utc::now();
        let updated = Organization::from(&*record);

        self.db.commit(staged).await?;
        timer.record();

        tracing::info!(organization_id = %id, slug = %updated.slug, "Organization updated");
        Ok(Some(updated))
    }

    pub async fn set_verified(
        &self,
        id: Uuid,
        verified: bool,
    ) -> Result<Option<Organization>, StoreError> {
        let mut staged = self.db.stage_organizations().await;

        let Some(record) = staged.rows_mut().iter_mut().find(|org| org.id == id) else {
            return Ok(None);
        };
        record.is_verified = verified;
        record.updated_at = Utc::now();
        let updated = Organization::from(&*record);

        self.db.commit(staged).await?;
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{organization, Fixture};

    async fn repo() -> OrganizationRepository {
        let fixture = Fixture::bundled().unwrap();
        OrganizationRepository::new(Database::open_in_memory(Some(&fixture)).await.unwrap())
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let repo = repo().await;
        let org = repo.find_by_slug("hackingetic").await.unwrap();
        assert_eq!(org.name, "Hackingétic");
        assert!(repo.find_by_slug("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_organization_without_events_is_reachable() {
        let fixture = Fixture::empty().with_organization(organization("SecOps Madrid", "Madrid"));
        let repo = OrganizationRepository::new(Database::open_in_memory(Some(&fixture)).await.unwrap());
        assert!(repo.find_by_slug("secops-madrid").await.is_some());
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let names: Vec<String> = repo().await.list().await.into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["CyberSecurity Spain", "Hackingétic", "SecurIT All"]);
    }

    #[tokio::test]
    async fn test_rename_keeps_old_slug_as_alias() {
        let repo = repo().await;
        let org = repo.find_by_slug("securit-all").await.unwrap();

        let updated = repo
            .update(
                org.id,
                UpdateOrganizationRequest {
                    name: Some("SecurIT All Andalucía".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.slug, "securit-all-andalucia");
        assert_eq!(repo.find_by_slug("securit-all").await.unwrap().id, org.id);
        assert_eq!(repo.find_by_slug("securit-all-andalucia").await.unwrap().id, org.id);
    }

    #[tokio::test]
    async fn test_rename_onto_taken_slug_is_disambiguated() {
        let repo = repo().await;
        let org = repo.find_by_slug("securit-all").await.unwrap();

        let updated = repo
            .update(
                org.id,
                UpdateOrganizationRequest {
                    name: Some("Hackingetic".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.slug, "hackingetic-2");
    }

    #[tokio::test]
    async fn test_update_without_rename_keeps_slug() {
        let repo = repo().await;
        let org = repo.find_by_slug("hackingetic").await.unwrap();

        let updated = repo
            .update(
                org.id,
                UpdateOrganizationRequest {
                    city: Some("Girona".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.slug, "hackingetic");
        assert_eq!(updated.city, "Girona");
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let result = repo()
            .await
            .update(Uuid::new_v4(), UpdateOrganizationRequest::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_set_verified() {
        let fixture = Fixture::empty().with_organization({
            let mut org = organization("SecOps Madrid", "Madrid");
            org.is_verified = false;
            org
        });
        let repo = OrganizationRepository::new(Database::open_in_memory(Some(&fixture)).await.unwrap());
        let id = fixture.organizations[0].id;

        let org = repo.set_verified(id, true).await.unwrap().unwrap();
        assert!(org.is_verified);
        assert!(repo.find_by_id(id).await.unwrap().is_verified);
    }
}

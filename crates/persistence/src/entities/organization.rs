//! Organization record.

use chrono::{DateTime, Utc};
use domain::models::{Organization, SocialLinks};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    pub id: Uuid,
    pub slug: String,
    /// Slugs this organization answered to before a rename.
    #[serde(default)]
    pub previous_slugs: Vec<String>,
    pub name: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub is_verified: bool,
    pub city: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl OrganizationRecord {
    /// Whether `slug` is the current slug or a kept alias.
    pub fn answers_to(&self, slug: &str) -> bool {
        self.slug == slug || self.previous_slugs.iter().any(|s| s == slug)
    }
}

impl From<&OrganizationRecord> for Organization {
    fn from(record: &OrganizationRecord) -> Self {
        Self {
            id: record.id,
            slug: record.slug.clone(),
            name: record.name.clone(),
            logo_url: record.logo_url.clone(),
            is_verified: record.is_verified,
            city: record.city.clone(),
            description: record.description.clone(),
            banner_url: record.banner_url.clone(),
            website: record.website.clone(),
            email: record.email.clone(),
            social_links: record.social_links.clone(),
            owner_id: record.owner_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

//! User record.

use chrono::{DateTime, Utc};
use domain::models::{Organization, Role, SocialLinks, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored user. Unlike [`User`], carries the password hash and references its
/// organization by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    /// Lowercase.
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub favorite_event_ids: Vec<Uuid>,
    #[serde(default)]
    pub bookmarked_event_ids: Vec<Uuid>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl UserRecord {
    pub fn to_domain(&self, organization: Option<Organization>) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: domain::models::user::full_name(&self.first_name, &self.last_name),
            role: self.role,
            is_active: self.is_active,
            is_verified: self.is_verified,
            company: self.company.clone(),
            position: self.position.clone(),
            avatar_url: self.avatar_url.clone(),
            banner_url: self.banner_url.clone(),
            bio: self.bio.clone(),
            city: self.city.clone(),
            social_links: self.social_links.clone(),
            organization,
            favorite_event_ids: self.favorite_event_ids.clone(),
            bookmarked_event_ids: self.bookmarked_event_ids.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Removes `event_id` from favorites and bookmarks. Returns whether it was
    /// a favorite.
    pub fn forget_event(&mut self, event_id: Uuid) -> bool {
        let was_favorite = self.favorite_event_ids.contains(&event_id);
        self.favorite_event_ids.retain(|id| *id != event_id);
        self.bookmarked_event_ids.retain(|id| *id != event_id);
        was_favorite
    }
}

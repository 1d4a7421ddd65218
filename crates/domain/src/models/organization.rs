//! Organization domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::user::SocialLinks;

/// City assigned to organizations created during organizer registration.
pub const UNKNOWN_CITY: &str = "Desconocida";

/// Organization domain model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: String,
    pub is_verified: bool,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "SocialLinks::is_empty")]
    pub social_links: SocialLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of an organization profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 2, max = 255, message = "Name must be 2-255 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: Option<String>,

    pub logo_url: Option<String>,

    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    pub city: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Invalid banner URL format"))]
    pub banner_url: Option<String>,

    #[validate(url(message = "Invalid website URL format"))]
    pub website: Option<String>,

    #[validate(email(message = "Invalid contact email format"))]
    pub email: Option<String>,

    #[validate(nested)]
    pub social_links: Option<SocialLinks>,
}

impl UpdateOrganizationRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.logo_url.is_none()
            && self.city.is_none()
            && self.description.is_none()
            && self.banner_url.is_none()
            && self.website.is_none()
            && self.email.is_none()
            && self.social_links.is_none()
    }
}

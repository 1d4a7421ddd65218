//! Seed fixtures.
//!
//! Collections that are missing from storage are populated from a fixture.
//! The bundled fixture holds the demo catalog: three organizations, four
//! events and one user per role. Seed users carry plaintext passwords that are
//! hashed when the fixture is applied.

use chrono::Utc;
use domain::models::user::normalize_email;
use domain::models::{Role, SocialLinks};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{EventRecord, OrganizationRecord, UserRecord};
use crate::error::StoreError;

const BUNDLED: &str = include_str!("../fixtures/seed.json");

/// A user as written in a fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
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
}

fn default_true() -> bool {
    true
}

impl SeedUser {
    /// An active, verified user with placeholder names.
    pub fn new(email: &str, password: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Seed".to_string(),
            last_name: role.to_string(),
            role,
            is_active: true,
            is_verified: true,
            company: None,
            position: None,
            avatar_url: None,
            banner_url: None,
            bio: None,
            city: None,
            social_links: SocialLinks::default(),
            organization_id: None,
            favorite_event_ids: Vec::new(),
        }
    }

    pub fn with_organization(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    fn into_record(self) -> Result<UserRecord, StoreError> {
        let password_hash = shared::password::hash_password(&self.password)
            .map_err(|e| StoreError::Seed(format!("{}: {}", self.email, e)))?;
        let now = Utc::now();

        Ok(UserRecord {
            id: self.id,
            email: normalize_email(&self.email),
            password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            is_active: self.is_active,
            is_verified: self.is_verified,
            company: self.company,
            position: self.position,
            avatar_url: self.avatar_url,
            banner_url: self.banner_url,
            bio: self.bio,
            city: self.city,
            social_links: self.social_links,
            organization_id: self.organization_id,
            favorite_event_ids: self.favorite_event_ids,
            bookmarked_event_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Initial content for empty collections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub organizations: Vec<OrganizationRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl Fixture {
    /// The demo catalog shipped with the crate.
    pub fn bundled() -> Result<Self, StoreError> {
        Self::from_json(BUNDLED)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let fixture: Fixture =
            serde_json::from_str(json).map_err(|e| StoreError::Seed(e.to_string()))?;
        fixture.check()?;
        Ok(fixture)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_organization(mut self, organization: OrganizationRecord) -> Self {
        self.organizations.push(organization);
        self
    }

    pub fn with_event(mut self, event: EventRecord) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_user(mut self, user: SeedUser) -> Self {
        self.users.push(user);
        self
    }

    /// Every slug must be well formed and every event must point at an
    /// organization of the fixture.
    pub(crate) fn check(&self) -> Result<(), StoreError> {
        let slugs = self
            .organizations
            .iter()
            .flat_map(|org| std::iter::once(&org.slug).chain(&org.previous_slugs))
            .chain(
                self.events
                    .iter()
                    .flat_map(|event| std::iter::once(&event.slug).chain(&event.previous_slugs)),
            );
        for slug in slugs {
            if !shared::slug::is_valid_slug(slug) {
                return Err(StoreError::Seed(format!("malformed slug {:?}", slug)));
            }
        }

        for event in &self.events {
            if !self
                .organizations
                .iter()
                .any(|org| org.id == event.organization_id)
            {
                return Err(StoreError::Seed(format!(
                    "event {} references unknown organization {}",
                    event.slug, event.organization_id
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn user_records(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.users.iter().cloned().map(SeedUser::into_record).collect()
    }
}

/// A minimal organization record, handy for building fixtures.
pub fn organization(name: &str, city: &str) -> OrganizationRecord {
    let now = Utc::now();
    OrganizationRecord {
        id: Uuid::new_v4(),
        slug: shared::slug::slugify(name),
        previous_slugs: Vec::new(),
        name: name.to_string(),
        logo_url: String::new(),
        is_verified: true,
        city: city.to_string(),
        description: None,
        banner_url: None,
        website: None,
        email: None,
        social_links: SocialLinks::default(),
        owner_id: None,
        created_at: now,
        updated_at: now,
    }
}

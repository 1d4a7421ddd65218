//! Event record.

use chrono::{DateTime, Utc};
use domain::models::{Event, EventDetails, EventStatus, Organization};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub slug: String,
    /// Slugs this event answered to before a title change.
    #[serde(default)]
    pub previous_slugs: Vec<String>,
    #[serde(flatten)]
    pub details: EventDetails,
    #[serde(default)]
    pub current_attendees: u32,
    #[serde(default)]
    pub status: EventStatus,
    pub organization_id: Uuid,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn answers_to(&self, slug: &str) -> bool {
        self.slug == slug || self.previous_slugs.iter().any(|s| s == slug)
    }

    pub fn is_full(&self) -> bool {
        self.details.max_attendees != 0 && self.current_attendees >= self.details.max_attendees
    }

    pub fn to_domain(&self, organization: Organization) -> Event {
        Event {
            id: self.id,
            slug: self.slug.clone(),
            details: self.details.clone(),
            current_attendees: self.current_attendees,
            status: self.status,
            organization,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

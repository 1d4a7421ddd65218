//! Event domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::organization::Organization;

/// Category assigned when an event has neither a category nor tags.
pub const DEFAULT_CATEGORY: &str = "General";

/// Event type assigned when none is given.
pub const DEFAULT_EVENT_TYPE: &str = "conference";

/// Publication status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Published,
    Draft,
    Canceled,
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "published" => Ok(EventStatus::Published),
            "draft" => Ok(EventStatus::Draft),
            "canceled" | "cancelled" => Ok(EventStatus::Canceled),
            _ => Err(format!("Unknown event status: {}", s)),
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Published => write!(f, "published"),
            EventStatus::Draft => write!(f, "draft"),
            EventStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// Audience level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventLevel {
    Principiante,
    Intermedio,
    Avanzado,
    Experto,
}

impl EventLevel {
    pub const ALL: [EventLevel; 4] = [
        EventLevel::Principiante,
        EventLevel::Intermedio,
        EventLevel::Avanzado,
        EventLevel::Experto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Principiante => "Principiante",
            EventLevel::Intermedio => "Intermedio",
            EventLevel::Avanzado => "Avanzado",
            EventLevel::Experto => "Experto",
        }
    }
}

impl FromStr for EventLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown event level: {}", s))
    }
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language an event is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventLanguage {
    #[serde(rename = "Español")]
    Spanish,
    #[serde(rename = "Inglés")]
    English,
    #[serde(rename = "Catalán")]
    Catalan,
    #[serde(rename = "Euskera")]
    Basque,
    #[serde(rename = "Gallego")]
    Galician,
    #[serde(rename = "Valenciano")]
    Valencian,
}

impl EventLanguage {
    pub const ALL: [EventLanguage; 6] = [
        EventLanguage::Spanish,
        EventLanguage::English,
        EventLanguage::Catalan,
        EventLanguage::Basque,
        EventLanguage::Galician,
        EventLanguage::Valencian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventLanguage::Spanish => "Español",
            EventLanguage::English => "Inglés",
            EventLanguage::Catalan => "Catalán",
            EventLanguage::Basque => "Euskera",
            EventLanguage::Galician => "Gallego",
            EventLanguage::Valencian => "Valenciano",
        }
    }
}

impl FromStr for EventLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        EventLanguage::ALL
            .into_iter()
            .find(|lang| lang.as_str().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown event language: {}", s))
    }
}

impl std::fmt::Display for EventLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an event sits relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventTiming {
    Upcoming,
    Ongoing,
    Past,
}

/// One slot in an event's agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AgendaItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[validate(length(min = 1, max = 50, message = "Agenda time must be 1-50 characters"))]
    pub time: String,
    #[validate(length(min = 1, max = 200, message = "Agenda title must be 1-200 characters"))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Speaker {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Speaker name must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub topic: String,
    /// Matches an agenda slot's `time`.
    #[serde(default)]
    pub time: String,
    #[validate(url(message = "Invalid speaker image URL"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The editable body of an event.
///
/// Used as-is for creation and as the merge target of [`UpdateEventRequest`].
/// Cross-field rules (date window, pricing, venue) are checked by
/// [`validate_event_details`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_event_details"))]
pub struct EventDetails {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: String,

    #[validate(length(max = 300, message = "Short description must be at most 300 characters"))]
    #[serde(default)]
    pub short_desc: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type", default)]
    pub event_type: String,

    #[serde(default)]
    pub category: String,

    pub level: EventLevel,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,

    #[serde(default)]
    pub is_online: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_community: Option<String>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[validate(url(message = "Invalid online URL"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_url: Option<String>,

    /// 0 means unlimited.
    #[serde(default)]
    pub max_attendees: u32,

    pub is_free: bool,

    /// Minor currency units (cents).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,

    #[serde(default)]
    pub image_url: String,

    #[serde(default)]
    pub banner_url: String,

    #[validate(custom(function = "shared::validation::validate_tags"))]
    #[serde(default)]
    pub tags: Vec<String>,

    pub language: EventLanguage,

    #[validate(nested)]
    #[serde(default)]
    pub agenda: Vec<AgendaItem>,

    #[validate(nested)]
    #[serde(default)]
    pub speakers: Vec<Speaker>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
}

/// Drafts submitted to `create_event` carry exactly the editable body.
pub type CreateEventRequest = EventDetails;

fn schema_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Cross-field rules for an event body.
pub fn validate_event_details(details: &EventDetails) -> Result<(), ValidationError> {
    shared::validation::validate_event_window(details.start_date, details.end_date)?;
    shared::validation::validate_pricing(details.is_free, details.price)?;

    if details.latitude.is_some() != details.longitude.is_some() {
        return Err(schema_error(
            "coordinates",
            "Latitude and longitude must be given together",
        ));
    }
    let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());

    if details.is_online {
        if !filled(&details.online_url) {
            return Err(schema_error(
                "online_url_required",
                "Online events require an online URL",
            ));
        }
        if details.latitude.is_some() {
            return Err(schema_error(
                "online_coordinates",
                "Online events cannot have venue coordinates",
            ));
        }
    } else {
        if !filled(&details.venue_city) {
            return Err(schema_error(
                "venue_required",
                "In-person events require a venue city",
            ));
        }
        if details.online_url.is_some() {
            return Err(schema_error(
                "in_person_online_url",
                "In-person events cannot have an online URL",
            ));
        }
    }
    Ok(())
}

impl EventDetails {
    /// Fills the defaults applied at creation: category falls back to the
    /// first tag (or [`DEFAULT_CATEGORY`]), type to [`DEFAULT_EVENT_TYPE`].
    pub fn with_defaults(mut self) -> Self {
        if self.category.trim().is_empty() {
            self.category = self
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        }
        if self.event_type.trim().is_empty() {
            self.event_type = DEFAULT_EVENT_TYPE.to_string();
        }
        self
    }

    pub fn timing_at(&self, now: DateTime<Utc>) -> EventTiming {
        if now < self.start_date {
            EventTiming::Upcoming
        } else if now > self.end_date {
            EventTiming::Past
        } else {
            EventTiming::Ongoing
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Event domain model as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub slug: String,
    #[serde(flatten)]
    pub details: EventDetails,
    pub current_attendees: u32,
    pub status: EventStatus,
    pub organization: Organization,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_published(&self) -> bool {
        self.status == EventStatus::Published
    }

    /// Seats left, `None` when unlimited.
    pub fn remaining_capacity(&self) -> Option<u32> {
        match self.details.max_attendees {
            0 => None,
            max => Some(max.saturating_sub(self.current_attendees)),
        }
    }

    pub fn is_full(&self) -> bool {
        self.remaining_capacity() == Some(0)
    }

    pub fn timing(&self) -> EventTiming {
        self.details.timing_at(Utc::now())
    }
}

/// Partial update of an event. `id` and organization are not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: Option<String>,
    pub short_desc: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub category: Option<String>,
    pub level: Option<EventLevel>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_online: Option<bool>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub venue_city: Option<String>,
    pub venue_community: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub online_url: Option<String>,
    pub max_attendees: Option<u32>,
    pub is_free: Option<bool>,
    pub price: Option<u64>,
    pub image_url: Option<String>,
    pub banner_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub language: Option<EventLanguage>,
    pub agenda: Option<Vec<AgendaItem>>,
    pub speakers: Option<Vec<Speaker>>,
    pub requirements: Option<String>,
    pub status: Option<EventStatus>,
}

impl UpdateEventRequest {
    /// Merges the patch over an existing body and status.
    ///
    /// Switching an event to free clears its price unless the patch sets one.
    /// Switching between online and in-person clears the other mode's
    /// location fields the same way. The merged body still has to pass
    /// `validate()`.
    pub fn apply(self, details: &mut EventDetails, status: &mut EventStatus) {
        if self.is_free == Some(true) && self.price.is_none() {
            details.price = None;
        }
        match self.is_online {
            Some(false) if self.online_url.is_none() => details.online_url = None,
            Some(true) if self.latitude.is_none() && self.longitude.is_none() => {
                details.latitude = None;
                details.longitude = None;
            }
            _ => {}
        }

        if let Some(value) = self.title {
            details.title = value;
        }
        if let Some(value) = self.short_desc {
            details.short_desc = value;
        }
        if let Some(value) = self.description {
            details.description = value;
        }
        if let Some(value) = self.event_type {
            details.event_type = value;
        }
        if let Some(value) = self.category {
            details.category = value;
        }
        if let Some(value) = self.level {
            details.level = value;
        }
        if let Some(value) = self.start_date {
            details.start_date = value;
        }
        if let Some(value) = self.end_date {
            details.end_date = value;
        }
        if let Some(value) = self.is_online {
            details.is_online = value;
        }
        if let Some(value) = self.max_attendees {
            details.max_attendees = value;
        }
        if let Some(value) = self.is_free {
            details.is_free = value;
        }
        if let Some(value) = self.image_url {
            details.image_url = value;
        }
        if let Some(value) = self.banner_url {
            details.banner_url = value;
        }
        if let Some(value) = self.tags {
            details.tags = value;
        }
        if let Some(value) = self.language {
            details.language = value;
        }
        if let Some(value) = self.agenda {
            details.agenda = value;
        }
        if let Some(value) = self.speakers {
            details.speakers = value;
        }
        if let Some(value) = self.venue_name {
            details.venue_name = Some(value);
        }
        if let Some(value) = self.venue_address {
            details.venue_address = Some(value);
        }
        if let Some(value) = self.venue_city {
            details.venue_city = Some(value);
        }
        if let Some(value) = self.venue_community {
            details.venue_community = Some(value);
        }
        if let Some(value) = self.latitude {
            details.latitude = Some(value);
        }
        if let Some(value) = self.longitude {
            details.longitude = Some(value);
        }
        if let Some(value) = self.online_url {
            details.online_url = Some(value);
        }
        if let Some(value) = self.price {
            details.price = Some(value);
        }
        if let Some(value) = self.requirements {
            details.requirements = Some(value);
        }

        if let Some(value) = self.status {
            *status = value;
        }
    }
}

/// Returned by `subscribe_to_event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionConfirmation {
    pub event_id: Uuid,
    pub contact_email: String,
    pub current_attendees: u32,
    /// Set when the contact email belongs to a registered user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub message: String,
}

/// Returned by `toggle_bookmark`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkToggle {
    pub is_bookmarked: bool,
    pub message: String,
}

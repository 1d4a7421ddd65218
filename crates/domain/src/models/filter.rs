//! Event catalog filter.
//!
//! The catalog view encodes its filter in the query string: date bounds as
//! ISO-8601 strings and repeated keys for the set-valued dimensions, e.g.
//! `?startDate=2025-11-01&tags=Hacking&tags=OSINT&locations=Madrid`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::event::{Event, EventLanguage, EventLevel};
use super::reference;

/// Error produced while parsing a filter query string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid date for {key}: {value}")]
    InvalidDate { key: &'static str, value: String },

    #[error("{0}")]
    UnknownLevel(String),

    #[error("{0}")]
    UnknownLanguage(String),

    #[error("Query string is not valid UTF-8 after decoding: {0}")]
    Encoding(String),
}

/// Filter applied by `list_events`.
///
/// Every dimension is optional and the dimensions are AND-combined. An empty
/// set imposes no constraint; a non-empty set matches when the event hits at
/// least one member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    /// Inclusive lower bound on the event start.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the event start.
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// City or autonomous community names.
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub levels: Vec<EventLevel>,
    #[serde(default)]
    pub languages: Vec<EventLanguage>,
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn decode_component(raw: &str) -> Result<String, FilterError> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| FilterError::Encoding(e.to_string()))
}

/// Accepts an RFC 3339 datetime or a bare `YYYY-MM-DD` date. A bare date
/// covers the whole day: start of day for a lower bound, end of day for an
/// upper bound.
fn parse_bound(key: &'static str, value: &str, bound: Bound) -> Result<DateTime<Utc>, FilterError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| FilterError::InvalidDate {
        key,
        value: value.to_string(),
    })?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN),
    };
    Ok(date.and_time(time).and_utc())
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl EventFilter {
    /// Parses a catalog query string. A leading `?` is accepted; unknown keys
    /// and empty values are ignored.
    pub fn from_query(query: &str) -> Result<Self, FilterError> {
        let mut filter = EventFilter::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(raw_key)?;
            let value = decode_component(raw_value)?;
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.as_str() {
                "startDate" | "start_date" => {
                    filter.start_date = Some(parse_bound("startDate", value, Bound::Start)?);
                }
                "endDate" | "end_date" => {
                    filter.end_date = Some(parse_bound("endDate", value, Bound::End)?);
                }
                "tags" => filter.tags.push(value.to_string()),
                "locations" => filter.locations.push(value.to_string()),
                "levels" => filter
                    .levels
                    .push(value.parse().map_err(FilterError::UnknownLevel)?),
                "languages" => filter
                    .languages
                    .push(value.parse().map_err(FilterError::UnknownLanguage)?),
                other => tracing::debug!(key = other, "Ignoring unknown filter key"),
            }
        }

        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self == &EventFilter::default()
    }

    fn matches_location(&self, event: &Event) -> bool {
        let city = event.details.venue_city.as_deref().unwrap_or_default();
        let community = event.details.venue_community.as_deref().unwrap_or_default();
        let community_of_city = reference::community_of(city);

        self.locations.iter().any(|location| {
            (!city.is_empty() && eq_ignore_case(city, location))
                || (!community.is_empty() && eq_ignore_case(community, location))
                || community_of_city.is_some_and(|c| eq_ignore_case(c, location))
        })
    }

    /// Whether `event` satisfies every dimension of the filter.
    ///
    /// Publication status is not part of the filter.
    pub fn matches(&self, event: &Event) -> bool {
        let details = &event.details;

        if self.start_date.is_some_and(|start| details.start_date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| details.start_date > end) {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| details.has_tag(tag)) {
            return false;
        }
        if !self.locations.is_empty() && !self.matches_location(event) {
            return false;
        }
        if !self.levels.is_empty() && !self.levels.contains(&details.level) {
            return false;
        }
        if !self.languages.is_empty() && !self.languages.contains(&details.language) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::tests::sample_details;
    use crate::models::event::EventStatus;
    use crate::models::organization::Organization;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn sample_event() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            slug: "cybersec-summit-madrid-2024".to_string(),
            details: sample_details(),
            current_attendees: 287,
            status: EventStatus::Published,
            organization: Organization {
                id: Uuid::new_v4(),
                slug: "cybersecurity-spain".to_string(),
                name: "CyberSecurity Spain".to_string(),
                logo_url: String::new(),
                is_verified: true,
                city: "Madrid".to_string(),
                description: None,
                banner_url: None,
                website: None,
                email: None,
                social_links: Default::default(),
                owner_id: None,
                created_at: now,
                updated_at: now,
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_from_query_full() {
        let filter = EventFilter::from_query(
            "?startDate=2025-11-01&endDate=2025-11-30&tags=Hacking&tags=Red+Team\
             &locations=Comunidad%20de%20Madrid&levels=Intermedio&languages=Ingl%C3%A9s",
        )
        .unwrap();

        assert_eq!(
            filter.start_date,
            Some(Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            filter.end_date.unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2025, 11, 30).unwrap()
        );
        assert_eq!(filter.tags, vec!["Hacking", "Red Team"]);
        assert_eq!(filter.locations, vec!["Comunidad de Madrid"]);
        assert_eq!(filter.levels, vec![EventLevel::Intermedio]);
        assert_eq!(filter.languages, vec![EventLanguage::English]);
    }

    #[test]
    fn test_from_query_empty() {
        assert!(EventFilter::from_query("").unwrap().is_empty());
        assert!(EventFilter::from_query("?").unwrap().is_empty());
        assert!(EventFilter::from_query("tags=&page=2").unwrap().is_empty());
    }

    #[test]
    fn test_from_query_rfc3339_dates() {
        let filter = EventFilter::from_query("startDate=2025-11-14T09:00:00.000Z").unwrap();
        assert_eq!(
            filter.start_date,
            Some(Utc.with_ymd_and_hms(2025, 11, 14, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_from_query_errors() {
        assert!(matches!(
            EventFilter::from_query("startDate=yesterday"),
            Err(FilterError::InvalidDate { key: "startDate", .. })
        ));
        assert!(matches!(
            EventFilter::from_query("levels=Guru"),
            Err(FilterError::UnknownLevel(_))
        ));
        assert!(matches!(
            EventFilter::from_query("languages=Klingon"),
            Err(FilterError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(EventFilter::default().matches(&sample_event()));
    }

    #[test]
    fn test_date_bounds_inclusive() {
        let event = sample_event();
        let start = event.details.start_date;

        let exact = EventFilter {
            start_date: Some(start),
            end_date: Some(start),
            ..Default::default()
        };
        assert!(exact.matches(&event));

        let later = EventFilter {
            start_date: Some(start + chrono::Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!later.matches(&event));
    }

    #[test]
    fn test_bare_end_date_covers_whole_day() {
        let event = sample_event();
        let filter = EventFilter::from_query("endDate=2025-11-14").unwrap();
        assert!(filter.matches(&event));
    }

    #[test]
    fn test_tags_intersect() {
        let event = sample_event();
        let hit = EventFilter {
            tags: vec!["Hacking".to_string(), "Networking".to_string()],
            ..Default::default()
        };
        let miss = EventFilter {
            tags: vec!["Hacking".to_string()],
            ..Default::default()
        };
        assert!(hit.matches(&event));
        assert!(!miss.matches(&event));
    }

    #[test]
    fn test_location_matches_city_or_community() {
        let mut event = sample_event();
        for location in ["Madrid", "Comunidad de Madrid", "madrid"] {
            let filter = EventFilter {
                locations: vec![location.to_string()],
                ..Default::default()
            };
            assert!(filter.matches(&event), "{}", location);
        }

        // Community resolved through the reference map when not stored.
        event.details.venue_community = None;
        let filter = EventFilter {
            locations: vec!["Comunidad de Madrid".to_string()],
            ..Default::default()
        };
        assert!(filter.matches(&event));

        let elsewhere = EventFilter {
            locations: vec!["Cataluña".to_string()],
            ..Default::default()
        };
        assert!(!elsewhere.matches(&event));
    }

    #[test]
    fn test_dimensions_are_and_combined() {
        let event = sample_event();
        let filter = EventFilter {
            tags: vec!["Networking".to_string()],
            levels: vec![EventLevel::Experto],
            ..Default::default()
        };
        assert!(!filter.matches(&event));

        let filter = EventFilter {
            tags: vec!["Networking".to_string()],
            levels: vec![EventLevel::Experto, EventLevel::Intermedio],
            languages: vec![EventLanguage::English],
            ..Default::default()
        };
        assert!(filter.matches(&event));
    }
}

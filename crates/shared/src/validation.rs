//! Common validation utilities.
//!
//! Functions here plug into `#[validate(custom(function = ...))]` on request
//! types, or are called directly from schema-level checks.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Maximum number of tags on one event.
pub const MAX_TAGS: usize = 20;

/// Maximum length of a single tag.
pub const MAX_TAG_LEN: usize = 64;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        Err(error("latitude_range", "Latitude must be between -90 and 90"))
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(error("longitude_range", "Longitude must be between -180 and 180"))
    }
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Value must not be blank"))
    } else {
        Ok(())
    }
}

/// Tags must be non-blank, short, and few.
pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(error("tags_count", "An event can have at most 20 tags"));
    }
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err(error("tag_blank", "Tags must not be blank"));
    }
    if tags.iter().any(|t| t.chars().count() > MAX_TAG_LEN) {
        return Err(error("tag_length", "Tags must be at most 64 characters"));
    }
    Ok(())
}

/// An event may not end before it starts.
pub fn validate_event_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if end < start {
        Err(error("date_range", "End date must not be before start date"))
    } else {
        Ok(())
    }
}

/// `current` may not exceed `max` unless `max` is 0 (unlimited).
pub fn validate_attendance(current: u32, max: u32) -> Result<(), ValidationError> {
    if max != 0 && current > max {
        Err(error(
            "capacity",
            "Maximum attendees cannot be lower than current attendees",
        ))
    } else {
        Ok(())
    }
}

/// Paid events need a price; free events must not carry one.
pub fn validate_pricing(is_free: bool, price: Option<u64>) -> Result<(), ValidationError> {
    match (is_free, price) {
        (false, None) => Err(error("price_required", "Paid events require a price")),
        (true, Some(p)) if p > 0 => Err(error("price_on_free", "Free events cannot have a price")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(40.452).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(-90.1).is_err());
    }

    #[test]
    fn test_validate_latitude_error_message() {
        let err = validate_latitude(100.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Latitude must be between -90 and 90"
        );
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(-3.6922).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.1).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("CyberSec").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_validate_tags() {
        assert!(validate_tags(&Vec::new()).is_ok());
        assert!(validate_tags(&["OSINT".to_string(), "Red Team".to_string()]).is_ok());
        assert!(validate_tags(&[" ".to_string()]).is_err());
        assert!(validate_tags(&["x".repeat(65)]).is_err());
        let many: Vec<String> = (0..21).map(|i| format!("tag{}", i)).collect();
        assert_eq!(validate_tags(&many).unwrap_err().code, "tags_count");
    }

    #[test]
    fn test_validate_event_window() {
        let start = Utc.with_ymd_and_hms(2025, 11, 14, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 11, 15, 18, 0, 0).unwrap();
        assert!(validate_event_window(start, end).is_ok());
        assert!(validate_event_window(start, start).is_ok());
        assert!(validate_event_window(end, start).is_err());
    }

    #[test]
    fn test_validate_attendance() {
        assert!(validate_attendance(0, 0).is_ok());
        assert!(validate_attendance(500, 0).is_ok());
        assert!(validate_attendance(287, 500).is_ok());
        assert!(validate_attendance(500, 500).is_ok());
        assert!(validate_attendance(501, 500).is_err());
    }

    #[test]
    fn test_validate_pricing() {
        assert!(validate_pricing(true, None).is_ok());
        assert!(validate_pricing(true, Some(0)).is_ok());
        assert!(validate_pricing(false, Some(25000)).is_ok());
        assert!(validate_pricing(false, Some(0)).is_ok());
        assert_eq!(validate_pricing(false, None).unwrap_err().code, "price_required");
        assert_eq!(validate_pricing(true, Some(100)).unwrap_err().code, "price_on_free");
    }
}

//! The event model and draft validation.
//!
//! An admin fills in an [`EventDraft`]; [`EventDraft::validate`] checks every
//! field and reports all failures at once so a form can mark each of them.
//! A valid draft becomes an [`Event`] once the catalog gives it an id.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::FieldError;

const TITLE_LEN: (usize, usize) = (3, 100);
const LOCATION_LEN: (usize, usize) = (3, 150);
const DESCRIPTION_LEN: (usize, usize) = (10, 2000);

/// `14:30`, `9:00`, `09:00 AM`, `9:00pm`.
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([01]?[0-9]|2[0-3]):[0-5][0-9](\s?(AM|PM))?$").expect("valid time regex")
});

/// Unique identifier for an event.
///
/// Opaque text: events published here get a UUID, while records written by
/// the browser build carry ids like `"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A published event.
///
/// Serialized field names match the browser build (`imageUrl`), so
/// persisted bookings are readable by either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    /// Comma-separated keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

/// Raw form input for a new event.
///
/// Optional fields treat an empty string the same as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
}

impl EventDraft {
    /// Checks every field.
    ///
    /// # Errors
    /// One [`FieldError`] per failing field, in form order.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        self.check().map(|_| ())
    }

    /// Validates the draft and turns it into an event with `id`.
    ///
    /// # Errors
    /// Same as [`validate`](Self::validate).
    pub fn into_event(self, id: EventId) -> Result<Event, Vec<FieldError>> {
        let date = self.check()?;
        Ok(Event {
            id,
            title: self.title.trim().to_string(),
            date,
            time: self.time.trim().to_string(),
            location: self.location.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            image_url: non_empty(self.image_url),
            organizer: non_empty(self.organizer),
            keywords: non_empty(self.keywords),
        })
    }

    /// Runs all checks; on success hands back the parsed date.
    fn check(&self) -> Result<NaiveDate, Vec<FieldError>> {
        let mut errors = Vec::new();

        check_len(&mut errors, "title", &self.title, TITLE_LEN);

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        if date.is_none() {
            errors.push(FieldError::new("date", "invalid date, expected YYYY-MM-DD"));
        }

        if !TIME_RE.is_match(self.time.trim()) {
            errors.push(FieldError::new(
                "time",
                "invalid time format (e.g., 09:00 AM or 14:30)",
            ));
        }

        check_len(&mut errors, "location", &self.location, LOCATION_LEN);

        if !self.price.is_finite() || self.price < 0.0 {
            errors.push(FieldError::new("price", "price cannot be negative"));
        }

        if let Some(raw) = self.image_url.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if Url::parse(raw).is_err() {
                errors.push(FieldError::new("imageUrl", "invalid image URL"));
            }
        }

        check_len(&mut errors, "description", &self.description, DESCRIPTION_LEN);

        match date {
            Some(date) if errors.is_empty() => Ok(date),
            _ => Err(errors),
        }
    }
}

fn check_len(errors: &mut Vec<FieldError>, field: &'static str, value: &str, (min, max): (usize, usize)) {
    let len = value.trim().chars().count();
    if len < min {
        errors.push(FieldError::new(field, format!("must be at least {min} characters")));
    } else if len > max {
        errors.push(FieldError::new(field, format!("must be at most {max} characters")));
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

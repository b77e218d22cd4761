use chrono::{DateTime, Utc};
use icalendar::{Component, Event};

/// One VEVENT as seen by the filter and the browser.
///
/// `title` and `description` are empty when the property is missing. `start`
/// is `None` when DTSTART is missing or could not be resolved to an instant.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub title: String,
    pub start: Option<DateTime<Utc>>,
    pub description: String,
    /// The calendar-model event this record was read from; re-serialized as-is
    /// except for the description.
    pub raw: Event,
}

impl EventRecord {
    pub fn new(raw: Event, start: Option<DateTime<Utc>>) -> Self {
        let title = raw.get_summary().unwrap_or_default().to_string();
        let description = raw.get_description().unwrap_or_default().to_string();
        Self {
            title,
            start,
            description,
            raw,
        }
    }

    /// Rewrites the description on both the record and the raw event.
    pub fn set_description(&mut self, text: String) {
        self.raw.description(&text);
        self.description = text;
    }
}

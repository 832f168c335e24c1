//! Calendar event entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event_tags;

/// The normalized, content-bearing fields of an event, before it has an
/// identity or an owner.
///
/// Two events with equal `NewEvent` content for the same owner are the same
/// event as far as the service is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed description, `None` when empty.
    pub description: Option<String>,
    /// Absolute URL, `None` when empty.
    pub external_url: Option<String>,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant, never before `start`.
    pub end: DateTime<Utc>,
    /// Whether the time component is meaningful.
    pub all_day: bool,
    /// Tags extracted from title and description.
    pub tags: Vec<String>,
}

impl NewEvent {
    /// Creates an all-day event spanning the single day at `day`.
    pub fn all_day(title: impl Into<String>, day: DateTime<Utc>) -> Self {
        Self::new(title, day, day, true)
    }

    /// Creates a timed event.
    pub fn timed(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(title, start, end, false)
    }

    fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> Self {
        let title = title.into();
        let tags = event_tags(&title, None);
        Self {
            title,
            description: None,
            external_url: None,
            start,
            end,
            all_day,
            tags,
        }
    }

    /// Sets the description and re-derives the tags.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self.tags = event_tags(&self.title, self.description.as_deref());
        self
    }

    /// Sets the external URL.
    pub fn with_external_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }
}

/// A stored calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Event title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional link to more information.
    pub external_url: Option<String>,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant.
    pub end: DateTime<Utc>,
    /// Whether this is an all-day event.
    pub all_day: bool,
    /// Lower-cased tags, without the leading `@`.
    pub tags: Vec<String>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Creates a new event owned by `user_id` from normalized fields.
    pub fn from_new(user_id: Uuid, fields: NewEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: fields.title,
            description: fields.description,
            external_url: fields.external_url,
            start: fields.start,
            end: fields.end,
            all_day: fields.all_day,
            tags: fields.tags,
            created_at: Utc::now(),
        }
    }

    /// Replaces the stored tags.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if this event carries exactly the given content.
    ///
    /// Tags are derived from title and description and take no part.
    pub fn matches(&self, fields: &NewEvent) -> bool {
        self.title == fields.title
            && self.start == fields.start
            && self.end == fields.end
            && self.all_day == fields.all_day
            && self.external_url == fields.external_url
            && self.description == fields.description
    }

    /// Length of the event in whole seconds.
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// A half-open query window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new range.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if the event overlaps this window.
    ///
    /// A timed event that ends exactly at the window start does not overlap.
    /// Zero-length all-day events count when their day starts inside the window.
    pub fn overlaps(&self, event: &Event) -> bool {
        event.start < self.end && (event.end > self.start || event.start >= self.start)
    }
}

//! Wire type definitions.

use entities::Event;
use serde::{Deserialize, Serialize};

/// An event as it appears in JSON and XML bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventObject {
    pub title: String,
    pub id: String,
    /// Epoch seconds
    pub start: i64,
    /// Epoch seconds
    pub end: i64,
    #[serde(rename = "allDay")]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Positional form of an event used by the compact format:
/// `[title, start, end, all_day, id, external_url, description]`.
pub type CompactEvent = (
    String,
    i64,
    i64,
    bool,
    String,
    Option<String>,
    Option<String>,
);

impl From<&Event> for EventObject {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            id: event.id.to_string(),
            start: event.start.timestamp(),
            end: event.end.timestamp(),
            all_day: event.all_day,
            external_url: event.external_url.clone(),
            description: event.description.clone(),
        }
    }
}

impl EventObject {
    pub fn into_compact(self) -> CompactEvent {
        (
            self.title,
            self.start,
            self.end,
            self.all_day,
            self.id,
            self.external_url,
            self.description,
        )
    }
}

/// Body of an event listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsEnvelope<T> {
    pub events: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Body returned after creating an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEnvelope<T> {
    pub event: T,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionBody {
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBody {
    pub guid: String,
}

/// Formats a stored tag for display.
pub fn display_tag(tag: &str) -> String {
    format!("@{tag}")
}

/// Formats a list of stored tags for display.
pub fn display_tags(tags: &[String]) -> Vec<String> {
    tags.iter().map(|t| display_tag(t)).collect()
}

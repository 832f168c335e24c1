//! Event query handling.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use entities::{collect_tags, Event, TimeRange, User};
use event_protocol::{Format, TagsMode, API_VERSION};
use event_store::EventStore;
use futures_util::TryStreamExt;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::services::normalize::{normalize, parse_timestamp, EventForm, NormalizeRules};

/// Query parameters of an event listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsQuery {
    pub guid: Option<String>,
    /// Epoch seconds
    pub start: Option<String>,
    /// Epoch seconds
    pub end: Option<String>,
    pub include_tags: Option<String>,
    pub refresh: Option<String>,
}

/// A rendered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
    pub content_type: &'static str,
}

impl Reply {
    fn new(status: StatusCode, format: Format, body: String) -> Self {
        Self {
            status,
            body,
            content_type: format.content_type(),
        }
    }
}

/// Handles listing, creation and registration against an event store.
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    rules: NormalizeRules,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, rules: NormalizeRules) -> Self {
        Self { store, rules }
    }

    /// Resolves the user owning `guid`.
    async fn authorize(&self, guid: Option<&str>) -> ApiResult<User> {
        let guid = guid
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .ok_or(ApiError::MissingParameter("guid"))?;

        self.store
            .find_user(guid)
            .await?
            .ok_or(ApiError::GuidNotRecognized)
    }

    /// Lists the caller's events overlapping `[start, end)`.
    pub async fn list_events(&self, query: &ListEventsQuery, format: Format) -> ApiResult<Reply> {
        let user = self.authorize(query.guid.as_deref()).await?;

        let start = parse_range_bound("start", "start timestamp", query.start.as_deref())?;
        let end = parse_range_bound("end", "end timestamp", query.end.as_deref())?;
        if end < start {
            return Err(ApiError::InvalidParameter {
                name: "end",
                reason: "before start".to_string(),
            });
        }

        if query.refresh.is_some() {
            tracing::debug!(user_id = %user.id, "Refresh requested; tags are always recomputed");
        }

        let events: Vec<Event> = self
            .store
            .find_events(user.id, TimeRange::new(start, end))
            .try_collect()
            .await?;

        let tags = match TagsMode::from_param(query.include_tags.as_deref()) {
            TagsMode::None => None,
            TagsMode::Matched => Some(collect_tags(&events)),
            TagsMode::All => Some(self.store.owner_tags(user.id).await?),
        };

        tracing::debug!(
            user_id = %user.id,
            count = events.len(),
            format = %format,
            "Listed events"
        );

        let body = format.renderer().events(&events, tags.as_deref())?;
        Ok(Reply::new(StatusCode::OK, format, body))
    }

    /// Creates an event from posted fields, or returns the caller's existing
    /// event with identical content.
    pub async fn create_event(&self, form: &EventForm, format: Format) -> ApiResult<Reply> {
        let user = self.authorize(form.guid.as_deref()).await?;
        let fields = normalize(form, Utc::now(), &self.rules)?;

        let insertion = self
            .store
            .create_event_unless_matching(user.id, fields)
            .await?;

        let status = if insertion.is_created() {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        let event = insertion.into_event();

        tracing::info!(
            user_id = %user.id,
            event_id = %event.id,
            created = status == StatusCode::CREATED,
            "Stored event"
        );

        let body = format.renderer().created(&event)?;
        Ok(Reply::new(status, format, body))
    }

    /// Registers a new user and returns its guid.
    pub async fn register_user(&self, format: Format) -> ApiResult<Reply> {
        let user = self.store.create_user(User::new()).await?;
        tracing::info!(user_id = %user.id, "Registered user");

        let body = format.renderer().user(&user)?;
        Ok(Reply::new(StatusCode::CREATED, format, body))
    }

    pub fn version(&self, format: Format) -> ApiResult<Reply> {
        let body = format.renderer().version(API_VERSION)?;
        Ok(Reply::new(StatusCode::OK, format, body))
    }
}

/// Parses a required range bound; `label` names it in the not-supplied error.
fn parse_range_bound(
    name: &'static str,
    label: &'static str,
    value: Option<&str>,
) -> ApiResult<DateTime<Utc>> {
    parse_timestamp(name, value)
        .map_err(|e| ApiError::InvalidParameter {
            name,
            reason: e.reason.to_string(),
        })?
        .ok_or(ApiError::MissingParameter(label))
}

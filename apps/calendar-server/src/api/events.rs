//! Event API endpoints.

use event_protocol::Format;

use crate::error::ApiResult;
use crate::services::{EventForm, ListEventsQuery, Reply};
use crate::state::AppState;

/// `GET /api/events.{fmt}`
pub async fn list_events(
    state: &AppState,
    query: &ListEventsQuery,
    format: Format,
) -> ApiResult<Reply> {
    state.events.list_events(query, format).await
}

/// `POST /api/events.{fmt}`
pub async fn create_event(state: &AppState, form: &EventForm, format: Format) -> ApiResult<Reply> {
    state.events.create_event(form, format).await
}

//! Version endpoint.

use event_protocol::Format;

use crate::error::ApiResult;
use crate::services::Reply;
use crate::state::AppState;

/// `GET /api/version.{fmt}`
pub fn get_version(state: &AppState, format: Format) -> ApiResult<Reply> {
    state.events.version(format)
}

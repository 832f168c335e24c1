//! User registration endpoint.

use event_protocol::Format;

use crate::error::ApiResult;
use crate::services::Reply;
use crate::state::AppState;

/// `POST /api/users.{fmt}`
pub async fn register_user(state: &AppState, format: Format) -> ApiResult<Reply> {
    state.events.register_user(format).await
}

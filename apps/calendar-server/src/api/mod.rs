//! API endpoints.

pub mod events;
pub mod users;
pub mod version;

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::{header, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Form, Router,
};
use event_protocol::Format;

use crate::error::{ApiError, ApiResult};
use crate::services::{EventForm, ListEventsQuery, Reply};
use crate::state::AppState;

/// Resources served under `/api/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Events,
    Version,
    Users,
}

impl Resource {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "events" => Some(Resource::Events),
            "version" => Some(Resource::Version),
            "users" => Some(Resource::Users),
            _ => None,
        }
    }

    /// Format used when the path carries no extension.
    fn default_format(&self) -> Format {
        match self {
            Resource::Events | Resource::Users => Format::Json,
            Resource::Version => Format::Text,
        }
    }
}

/// Splits a path segment such as `events.json` into its resource and format.
pub fn parse_resource(segment: &str) -> ApiResult<(Resource, Format)> {
    let (name, extension) = match segment.split_once('.') {
        Some((name, extension)) => (name, Some(extension)),
        None => (segment, None),
    };

    let resource = Resource::from_name(name)
        .ok_or_else(|| ApiError::RouteNotFound(format!("/api/{segment}")))?;

    let format = match extension {
        Some(extension) => Format::from_extension(extension)
            .ok_or_else(|| ApiError::UnsupportedFormat(extension.to_string()))?,
        None => resource.default_format(),
    };

    Ok((resource, format))
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Creates the API router with all endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/{resource}", get(get_resource).post(post_resource))
        .route("/api/{resource}/", get(get_resource).post(post_resource))
        // Health check
        .route("/health", get(health_check))
        .fallback(not_found)
}

async fn get_resource(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<ListEventsQuery>,
) -> ApiResult<Reply> {
    match parse_resource(&segment)? {
        (Resource::Events, format) => events::list_events(&state, &query, format).await,
        (Resource::Version, format) => version::get_version(&state, format),
        (Resource::Users, _) => Err(ApiError::RouteNotFound(format!("GET /api/{segment}"))),
    }
}

async fn post_resource(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    form: Result<Form<EventForm>, FormRejection>,
) -> ApiResult<Reply> {
    let (resource, format) = parse_resource(&segment)?;

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Treating unreadable form as empty");
            EventForm::default()
        }
    };

    match resource {
        Resource::Events => events::create_event(&state, &form, format).await,
        Resource::Users => users::register_user(&state, format).await,
        Resource::Version => Err(ApiError::RouteNotFound(format!("POST /api/{segment}"))),
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

//! Server error types.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use event_protocol::ProtocolError;
use event_store::StoreError;

use crate::services::ValidationError;

/// Errors returned by request handling. Every variant renders as plain text.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required parameter was absent.
    #[error("{0} not supplied")]
    MissingParameter(&'static str),

    /// The guid does not belong to any user.
    #[error("guid not recognized")]
    GuidNotRecognized,

    /// Posted event fields were rejected.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A query parameter could not be used.
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("not found: {0}")]
    RouteNotFound(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("render error: {0}")]
    Render(#[from] ProtocolError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_)
            | ApiError::RouteNotFound(_)
            | ApiError::UnsupportedFormat(_) => StatusCode::NOT_FOUND,
            ApiError::GuidNotRecognized => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, [(header::CONTENT_TYPE, "text/plain")], self.to_string()).into_response()
    }
}

/// Result type alias for request handling.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use crate::services::ValidationReason;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingParameter("guid").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::GuidNotRecognized.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::from(ValidationError::new("title", ValidationReason::Missing)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::Corrupt("bad row".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::MissingParameter("guid").to_string(), "guid not supplied");
        assert_eq!(ApiError::GuidNotRecognized.to_string(), "guid not recognized");
        assert_eq!(
            ApiError::from(ValidationError::new("date", ValidationReason::InvalidTimestamp))
                .to_string(),
            "date not a timestamp"
        );
    }

    #[test]
    fn test_response_is_plain_text() {
        let response = ApiError::GuidNotRecognized.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    }
}

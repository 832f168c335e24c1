//! Rendering error types

use thiserror::Error;

/// Errors that can occur while rendering a response body.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// JSON serialization failed
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing formatted text failed
    #[error("formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Result type for rendering operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

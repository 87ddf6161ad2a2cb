//! HTTP-facing errors for the seokit server.
//!
//! Bodies are plain text; internal failures are logged at the boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Internal(String),
}

impl From<seokit_core::Error> for WebError {
    fn from(err: seokit_core::Error) -> Self {
        match err {
            seokit_core::Error::OgDisabled => WebError::NotFound("OG image generation is disabled".into()),
            seokit_core::Error::InvalidInput(msg) => WebError::InvalidInput(msg),
            other => WebError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            WebError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, [("content-type", "text/plain; charset=utf-8")], self.to_string()).into_response()
    }
}

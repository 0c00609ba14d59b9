use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::foundation::error::CanvasError;

/// Plain-text HTTP failures of the canvas endpoints.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    /// Malformed request or no session to deliver to (400).
    #[error("{0}")]
    BadRequest(String),
    /// Requested artifact does not exist (404).
    #[error("{0}")]
    NotFound(String),
    /// Anything unexpected (500).
    #[error("{0}")]
    Internal(String),
}

impl From<CanvasError> for ApiError {
    fn from(e: CanvasError) -> Self {
        match e {
            CanvasError::NoActiveSession => Self::BadRequest("No active canvas instance".into()),
            CanvasError::Serde(msg) => Self::BadRequest(msg),
            other => {
                tracing::error!(error = %other, "unexpected error in canvas endpoint");
                Self::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use spider_core::SessionError;
use spider_grid::GridError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A path segment could not be parsed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The session rejected the request.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Self::Session(e) => session_status(e),
        }
    }
}

const fn session_status(error: &SessionError) -> StatusCode {
    match error {
        SessionError::CellNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::UnknownParameter(_)
        | SessionError::InvalidParameter { .. }
        | SessionError::NotDrawable(_) => StatusCode::BAD_REQUEST,
        SessionError::Evaluation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Grid(
            GridError::CellNotFound(_)
            | GridError::MissingAttribute { .. }
            | GridError::InvalidStepSize(_)
            | GridError::InvalidStartDistance(_)
            | GridError::UntrackedAttribute(_)
            | GridError::UnsupportedGeometry(_),
        ) => StatusCode::BAD_REQUEST,
        SessionError::Grid(_) | SessionError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

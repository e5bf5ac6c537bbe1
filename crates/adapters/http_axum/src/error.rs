//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gardenhub_domain::error::GardenHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`GardenHubError`] (or a malformed request) to an HTTP response.
pub enum ApiError {
    Domain(GardenHubError),
    Malformed(String),
}

impl From<GardenHubError> for ApiError {
    fn from(err: GardenHubError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Malformed(message) => (StatusCode::BAD_REQUEST, message),
            Self::Domain(GardenHubError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(GardenHubError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(GardenHubError::Conflict(err)) => (StatusCode::CONFLICT, err.to_string()),
            Self::Domain(GardenHubError::Upstream(err)) => {
                tracing::error!(error = %err, "upstream error");
                (StatusCode::BAD_GATEWAY, "upstream unavailable".to_string())
            }
            Self::Domain(err @ (GardenHubError::Transport(_) | GardenHubError::Storage(_))) => {
                tracing::error!(error = ?err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

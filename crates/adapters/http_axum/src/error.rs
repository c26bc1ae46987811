//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use rulehub_domain::error::RuleHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`RuleHubError`] to an HTTP response with appropriate status code.
pub struct ApiError(RuleHubError);

impl From<RuleHubError> for ApiError {
    fn from(err: RuleHubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            RuleHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            RuleHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            RuleHubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            RuleHubError::Channel(err) => {
                tracing::error!(error = %err, "channel error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

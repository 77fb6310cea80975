//! HTTP response types and error mapping.
//!
//! Validation and domain-rule failures surface as 400 with the
//! descriptive message; dependency outages as 503 and anything else as
//! 500, both with generic bodies that leak no internals.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::portfolio::PortfolioError;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Error wrapper translating engine failures to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub PortfolioError);

impl From<PortfolioError> for ApiError {
    fn from(error: PortfolioError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_client_error() {
            return (StatusCode::BAD_REQUEST, self.0.to_string()).into_response();
        }

        tracing::error!(error = %self.0, "Request failed on a server-side dependency");
        match self.0 {
            PortfolioError::ExternalUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable, please retry".to_string(),
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::UserId;

    #[test]
    fn client_errors_map_to_bad_request_with_message() {
        let response = ApiError(PortfolioError::UserNotActive {
            user_id: UserId::new(5),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn dependency_outage_maps_to_service_unavailable() {
        let response = ApiError(PortfolioError::ExternalUnavailable {
            message: "store down".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

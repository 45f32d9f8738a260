//! JSON error responses for the API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub const MISSING_ADDRESS: &str = "Address parameter is required";
pub const MISSING_COORDINATES: &str = "Latitude and longitude parameters are required";
pub const INVALID_COORDINATES: &str = "Latitude and longitude must be valid coordinates";
pub const LOCATION_NOT_FOUND: &str = "Location not found";
pub const GEOCODE_FAILED: &str = "Failed to geocode address";

/// Request failure rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: &'static str },

    #[error("{message}")]
    NotFound { message: &'static str },

    #[error("{message}")]
    Internal { message: &'static str },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = ApiError::BadRequest {
            message: MISSING_ADDRESS,
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Address parameter is required");

        let err = ApiError::NotFound {
            message: LOCATION_NOT_FOUND,
        };
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = ApiError::Internal {
            message: GEOCODE_FAILED,
        };
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::CraftError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<CraftError> for ApiError {
    fn from(err: CraftError) -> Self {
        match err {
            CraftError::Validation(msg) => ApiError::BadRequest(msg),
            CraftError::NotFound | CraftError::OutputUnavailable => {
                ApiError::NotFound(err.to_string())
            }
            CraftError::Io(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_craft_error_mapping() {
        assert!(matches!(
            ApiError::from(CraftError::Validation("`age` must be a string".to_string())),
            ApiError::BadRequest(msg) if msg == "`age` must be a string"
        ));
        assert!(matches!(
            ApiError::from(CraftError::NotFound),
            ApiError::NotFound(msg) if msg == "task not found"
        ));
        assert!(matches!(
            ApiError::from(CraftError::OutputUnavailable),
            ApiError::NotFound(msg) if msg == "output not available"
        ));
        assert!(matches!(
            ApiError::from(CraftError::Io(std::io::Error::other("disk gone"))),
            ApiError::InternalError(msg) if msg == "disk gone"
        ));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InternalError("x".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

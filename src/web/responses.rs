//! HTTP response types and utilities
//!
//! Every JSON endpoint answers with the same envelope:
//! `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AppError, AppResult};

pub const UPSTREAM_UNAVAILABLE_MESSAGE: &str = "Instagram connection failed. Try again later.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Helper function to convert AppResult to HTTP response
pub fn handle_result<T>(result: AppResult<T>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(data) => ok(data).into_response(),
        Err(error) => handle_error(error),
    }
}

/// Convert AppError to appropriate HTTP response.
///
/// Only not-found, validation and upstream-unavailable errors carry a
/// caller-facing message; everything else is answered with a generic 500.
pub fn handle_error(error: AppError) -> Response {
    let (status, message) = match &error {
        AppError::NotFound { resource, .. } => {
            (StatusCode::NOT_FOUND, format!("{resource} not found"))
        }
        AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AppError::UpstreamUnavailable { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            UPSTREAM_UNAVAILABLE_MESSAGE.to_string(),
        ),
        _ => {
            debug!("Request failed: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MESSAGE.to_string(),
            )
        }
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

/// Success response helpers
pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

/// Error response helpers
pub fn internal_error(message: &str) -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(message.to_string())),
    )
}

pub fn too_many_requests(message: String, retry_after_secs: u64) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [("Retry-After", retry_after_secs.to_string())],
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = vec![
            (AppError::not_found("Profile", "ghost"), StatusCode::NOT_FOUND, "Profile not found"),
            (
                AppError::UpstreamUnavailable {
                    message: "HTTP 429".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
                UPSTREAM_UNAVAILABLE_MESSAGE,
            ),
            (
                AppError::validation("Username must not be empty"),
                StatusCode::BAD_REQUEST,
                "Username must not be empty",
            ),
            (
                AppError::internal("secret stack detail"),
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MESSAGE,
            ),
        ];

        for (error, status, message) in cases {
            let response = handle_error(error);
            assert_eq!(response.status(), status);
            let body = body_json(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], message);
            assert!(body.get("data").is_none());
        }
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = handle_result::<_>(Ok(serde_json::json!({ "x": 1 })));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "success": true, "data": { "x": 1 } }));
    }
}

//! Error handling for the bookshop HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookshop_db::StoreError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("conflict: {message}")]
    Conflict { message: String, code: String },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String, code: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            code: "conflict".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            code: "unauthorized".to_string(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            code: "forbidden".to_string(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => Self::not_found(message),
            StoreError::Conflict(message) => Self::conflict(message),
            StoreError::InvalidInput(message) => Self::bad_request(message),
            StoreError::Unauthorized => Self::unauthorized(StoreError::Unauthorized.to_string()),
            StoreError::Internal(e) => Self::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();

        // Duplicate registrations are reported as bad input, not 409.
        let (status, error_code, message) = match self {
            AppError::Conflict { message, code } => (StatusCode::BAD_REQUEST, code, message),
            AppError::NotFound { message, code } => (StatusCode::NOT_FOUND, code, message),
            AppError::Unauthorized { message, code } => (StatusCode::UNAUTHORIZED, code, message),
            AppError::Forbidden { message, code } => (StatusCode::FORBIDDEN, code, message),
            AppError::BadRequest { message, code } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Internal(e) => {
                tracing::error!(error_id = %error_id, error = ?e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    e.to_string(),
                )
            }
        };

        tracing::warn!(
            error_id = %error_id,
            error_code = %error_code,
            status_code = %status.as_u16(),
            "Request error"
        );

        // Release builds never echo internal error text
        let message = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let body = json!({
            "success": false,
            "message": message,
            "error": error_code,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_store_error_mapping() {
        let cases = [
            (StoreError::not_found("gone"), StatusCode::NOT_FOUND),
            (StoreError::conflict("taken"), StatusCode::BAD_REQUEST),
            (StoreError::invalid("bad"), StatusCode::BAD_REQUEST),
            (StoreError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                StoreError::Internal(anyhow::anyhow!("lock exploded")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (store_error, status) in cases {
            let response = AppError::from(store_error).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_forbidden_mapping() {
        let response = AppError::forbidden("Invalid token").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_error_envelope_format() {
        let response = AppError::not_found("Book not found with this ISBN").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Book not found with this ISBN");
        assert_eq!(body["error"], "not_found");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_keeps_store_message() {
        let response = AppError::from(StoreError::Unauthorized).into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid credentials");
        assert_eq!(body["error"], "unauthorized");
    }
}

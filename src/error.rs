use crate::device::DeviceId;
use axum::extract::multipart::MultipartError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::time::Duration;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum InventoryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Device {0} not found")]
    NotFound(DeviceId),

    #[error("Database error: {0}")]
    Storage(#[from] SqlxError),

    #[error("Storage call exceeded {0:?}")]
    StorageTimeout(Duration),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),
}

impl InventoryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for the backing-store failures that surface as 5xx.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::StorageTimeout(_))
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            InventoryError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION_ERROR".to_string(),
                    message,
                },
            ),
            InventoryError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("Device {id} not found."),
                },
            ),
            InventoryError::StorageTimeout(limit) => {
                error!(limit_ms = limit.as_millis() as u64, "storage call timed out");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ApiErrorBody {
                        code: "STORAGE_TIMEOUT".to_string(),
                        message: "The storage backend did not respond in time.".to_string(),
                    },
                )
            }
            InventoryError::Multipart(e) => (
                e.status(),
                ApiErrorBody {
                    code: "BAD_UPLOAD".to_string(),
                    message: e.body_text(),
                },
            ),
            err @ InventoryError::Storage(_) => {
                error!(error = %err, "responding with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "An internal server error occurred.".to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

pub type InventoryResult<T> = Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        let cases = [
            (InventoryError::validation("bad"), StatusCode::BAD_REQUEST),
            (InventoryError::NotFound(7), StatusCode::NOT_FOUND),
            (
                InventoryError::Storage(SqlxError::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                InventoryError::StorageTimeout(Duration::from_millis(10)),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn storage_class_is_detected() {
        assert!(InventoryError::StorageTimeout(Duration::from_secs(1)).is_storage());
        assert!(!InventoryError::NotFound(1).is_storage());
    }
}

use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::models::RecordId;

/// Failures raised by a remote store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Document not found: {0}")]
    NotFound(RecordId),

    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Failures returned by the record synchronizer.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("Failed to persist record: {0}")]
    Persistence(StoreError),

    #[error("Failed to fetch records: {0}")]
    Fetch(StoreError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Sync(SyncError::MissingField(field)) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required field: {}", field),
            ),
            AppError::Sync(SyncError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("Record not found: {}", id))
            }
            AppError::Sync(e @ (SyncError::Persistence(_) | SyncError::Fetch(_))) => {
                error!("remote store error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Remote store error occurred".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}

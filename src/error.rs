use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::storage::StorageError;
use crate::store::StoreError;

const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Failure of one intake request. Every variant is terminal for the request.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// A required text field was absent or empty. Nothing has been written yet.
    #[error("Missing required fields")]
    Validation,

    /// Object storage refused an asset; no job record exists.
    #[error("Failed to upload image: {0}")]
    Upload(#[source] StorageError),

    /// The datastore refused the job insert; uploaded assets stay in storage.
    #[error("Failed to create request: {0}")]
    Persistence(#[source] StoreError),

    /// Anything else, e.g. an unreadable multipart body.
    #[error("{}", internal_message(.0))]
    Internal(String),
}

fn internal_message(message: &str) -> &str {
    if message.trim().is_empty() {
        INTERNAL_SERVER_ERROR
    } else {
        message
    }
}

impl IntakeError {
    pub fn status(&self) -> StatusCode {
        match self {
            IntakeError::Validation => StatusCode::BAD_REQUEST,
            IntakeError::Upload(_) | IntakeError::Persistence(_) | IntakeError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub fn internal_error_response() -> Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        if let IntakeError::Internal(message) = &self {
            tracing::error!(error = %message, "Error processing request");
        }
        json_error(self.status(), &self.to_string())
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::{AlertError, ContactError, RecordingError, SelectError, StorageError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<RecordingError> for ApiError {
    fn from(e: RecordingError) -> Self {
        let status = match &e {
            RecordingError::DeviceAccess(_) => StatusCode::SERVICE_UNAVAILABLE,
            RecordingError::SessionActive
            | RecordingError::InvalidTransition { .. }
            | RecordingError::StoppedDuringStart => StatusCode::CONFLICT,
            RecordingError::Finalize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<AlertError> for ApiError {
    fn from(e: AlertError) -> Self {
        let status = match &e {
            AlertError::NoContacts => StatusCode::PRECONDITION_FAILED,
            AlertError::Delivery(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ContactError> for ApiError {
    fn from(e: ContactError) -> Self {
        let status = match &e {
            ContactError::InvalidName | ContactError::InvalidPhone(_) => StatusCode::BAD_REQUEST,
            ContactError::LimitReached(_) => StatusCode::CONFLICT,
            ContactError::NotFound(_) => StatusCode::NOT_FOUND,
            ContactError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<SelectError> for ApiError {
    fn from(e: SelectError) -> Self {
        Self::not_found(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        Self::internal(e.to_string())
    }
}

//! API error responses.
//!
//! Validation and authorization failures carry a stable error code and HTTP
//! status and are surfaced to the caller unchanged, as
//! `{ "error": { "httpStatus": ..., "code": ... } }`. Notification failures
//! never reach this layer; they are logged and swallowed at the source.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::base::types::DeskError;

pub type ApiResult<T> = Result<T, ApiError>;

/// An API-tier error: HTTP status plus a stable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str) -> Self {
        Self { status, code }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::FORBIDDEN, "AUTHORIZATION_ERROR")
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND")
    }

    pub fn malformed() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "MALFORMED_INPUT")
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "httpStatus": self.status.as_u16(),
                "code": self.code,
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DeskError>() {
            Some(DeskError::ResourceNotFound) => Self::not_found(),
            Some(DeskError::SecretAlreadyExists) => Self::new(StatusCode::BAD_REQUEST, "SECRET_ALREADY_EXISTS"),
            Some(DeskError::MalformedInput(_)) => Self::malformed(),
            None => {
                error!("Internal error: {:#}", err);
                Self::internal()
            }
        }
    }
}

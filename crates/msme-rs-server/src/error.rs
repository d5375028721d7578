//! Error types for the HTTP surface.

use crate::catalog::CatalogError;
use crate::engine::ChatEngineError;
use crate::gate::AuthError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{debug, error};
use msme_rs_chatlog::ChatLogError;
use msme_rs_protocol::ErrorBody;
use thiserror::Error;

/// Message returned when a feedback or lookup key matches no record.
pub const LOG_NOT_FOUND: &str = "Log not found";

/// Failure of a single request, rendered as `{success: false, msg}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, query, or field value.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    /// Persistence or other server-side failure.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed (status={}, error={})", status.as_u16(), self);
        } else {
            debug!("request rejected (status={}, error={})", status.as_u16(), self);
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

impl From<ChatLogError> for ApiError {
    fn from(err: ChatLogError) -> Self {
        match err {
            ChatLogError::NotFound(_) => ApiError::NotFound(LOG_NOT_FOUND.to_string()),
            ChatLogError::Invalid(message) => ApiError::Validation(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ChatEngineError> for ApiError {
    fn from(err: ChatEngineError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Failures while assembling the application from config.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("chat log store: {0}")]
    ChatLog(#[from] ChatLogError),
    #[error("chat engine: {0}")]
    Engine(#[from] ChatEngineError),
}

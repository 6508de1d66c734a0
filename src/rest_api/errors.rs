//! # REST API Errors
//!
//! Error types for the ark endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::db::StorageError;

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// `sortBy` outside the sortable columns
    #[error("Invalid sortBy: {0:?} (expected one of ark, original_identifier, project, path)")]
    InvalidSortField(String),

    /// `order` other than `asc` or `desc`
    #[error("Invalid order: {0:?} (expected asc or desc)")]
    InvalidSortOrder(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store failure while serving a request
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Spreadsheet could not be generated
    #[error("Export failed: {0}")]
    Export(String),

    /// Internal error (blocking task panicked, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RestError::InvalidSortField(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidSortOrder(_) => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            RestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for RestError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        RestError::Export(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<RestError> for ErrorResponse {
    fn from(err: RestError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

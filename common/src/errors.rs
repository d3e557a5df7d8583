//! Unified error type for the console.
//!
//! Every failure path ends up either as a status string inside the status
//! view or as the diagnostic text returned from a mutation endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised by the stores, the engine and the HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// The relational store could not be reached (connect or ping).
    #[error("database unreachable: {0}")]
    Connectivity(String),

    /// A statement failed against a reachable relational store.
    #[error("query failed: {0}")]
    Query(String),

    /// The cache store is disabled or did not answer PING.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// A cache command failed after the health check succeeded.
    #[error("cache operation failed: {0}")]
    CacheOperation(String),

    /// The table is not part of the current discovery output.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// The column does not exist in the (discovered) table.
    #[error("unknown column `{column}` in table `{table}`")]
    UnknownColumn { table: String, column: String },

    /// Deletes require a column literally named `id`.
    #[error("table `{0}` has no `id` column; rows cannot be deleted from it")]
    MissingIdColumn(String),

    /// Malformed request input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The INSERT statement was rejected by the database.
    #[error("failed to add row: {0}")]
    Insert(String),

    /// The DELETE statement was rejected by the database.
    #[error("failed to delete row: {0}")]
    Delete(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Connectivity(_) => "DATABASE_UNREACHABLE",
            AppError::Query(_) => "QUERY_ERROR",
            AppError::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
            AppError::CacheOperation(_) => "CACHE_ERROR",
            AppError::UnknownTable(_) => "UNKNOWN_TABLE",
            AppError::UnknownColumn { .. } => "UNKNOWN_COLUMN",
            AppError::MissingIdColumn(_) => "MISSING_ID_COLUMN",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Insert(_) => "INSERT_ERROR",
            AppError::Delete(_) => "DELETE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status matching the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Connectivity(_) | AppError::CacheUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::UnknownTable(_)
            | AppError::UnknownColumn { .. }
            | AppError::MissingIdColumn(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Insert(_) | AppError::Delete(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Query(_) | AppError::CacheOperation(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "request rejected");
        }
        (status, Json(ApiResponse::err(self.code(), self.to_string()))).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

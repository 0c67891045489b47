//! Error taxonomy for scheduling operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::db::DbLockError;

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Quality score outside the closed range 0..=5
    #[error("quality must be between 0 and 5, got {0}")]
    InvalidQuality(i64),

    /// Due-set limit that is not a positive integer
    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(i64),

    #[error("card {0} not found")]
    CardNotFound(i64),

    /// Another grading of the same card won the compare-and-swap
    #[error("card {0} was modified concurrently")]
    Conflict(i64),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database unavailable")]
    DbUnavailable,
}

impl ScheduleError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidQuality(_) | Self::InvalidLimit(_) => StatusCode::BAD_REQUEST,
            Self::CardNotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::DbUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbLockError> for ScheduleError {
    fn from(_: DbLockError) -> Self {
        Self::DbUnavailable
    }
}

impl IntoResponse for ScheduleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

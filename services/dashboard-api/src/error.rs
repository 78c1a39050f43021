//! JSON error notices.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use landcover_common::DashboardError;
use serde::Serialize;

use crate::metrics;

pub type ApiResult<T> = Result<T, ApiError>;

/// A failure local to one request.
#[derive(Debug)]
pub struct ApiError(pub DashboardError);

impl<E> From<E> for ApiError
where
    E: Into<DashboardError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorNotice {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = self.0.error_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self.0, "Request failed");
        } else {
            tracing::warn!(code, error = %self.0, "Request rejected");
        }
        metrics::record_request_error(code);

        let notice = ErrorNotice {
            error: code,
            message: self.0.to_string(),
        };
        (status, Json(notice)).into_response()
    }
}

/// Blocking work that panicked or was cancelled.
pub fn join_error(err: tokio::task::JoinError) -> DashboardError {
    DashboardError::Internal(format!("background task failed: {}", err))
}

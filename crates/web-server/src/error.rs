use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Could not read the allow-list: {0}")]
    ReadAllowlist(#[source] io::Error),
    #[error("Could not append to the allow-list: {0}")]
    AppendAllowlist(#[source] io::Error),
    #[error("The performance report has not been computed yet")]
    ReportNotReady,
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidEmail => (StatusCode::BAD_REQUEST, "Invalid email"),
            AppError::ReadAllowlist(io_err) => {
                tracing::error!(error = %io_err, "Allow-list read failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not read emails file",
                )
            }
            AppError::AppendAllowlist(io_err) => {
                tracing::error!(error = %io_err, "Allow-list append failed.");
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not append email")
            }
            AppError::ReportNotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Performance report not available yet",
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

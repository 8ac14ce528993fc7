use crate::allowlist::{AppendOutcome, normalize};
use crate::{AppState, error::AppError};
use analytics::PerformanceReport;
use axum::{Json, body::Bytes, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;

/// Pulls a usable address out of a `{ "email": string }` body.
///
/// The body is parsed by hand so that malformed JSON, a missing field and a non-string
/// value all produce the same `Invalid email` answer.
fn email_from_body(body: &[u8]) -> Result<String, AppError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| AppError::InvalidEmail)?;
    value
        .get("email")
        .and_then(Value::as_str)
        .and_then(normalize)
        .ok_or(AppError::InvalidEmail)
}

/// # POST /api/append-email
pub async fn append_email(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let email = email_from_body(&body)?;
    let message = match state.allowlist.append(&email).await? {
        AppendOutcome::AlreadyPresent => "Email already present",
        AppendOutcome::Added => "Email added",
    };
    Ok(Json(json!({ "message": message })))
}

/// # POST /api/check-email
/// The access gate: answers whether the address is on the allow-list.
pub async fn check_email(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let email = email_from_body(&body)?;
    let authorized = state.allowlist.contains(&email).await?;
    tracing::debug!(authorized, "Access check.");
    Ok(Json(json!({ "authorized": authorized })))
}

/// # GET /api/performance
pub async fn get_performance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PerformanceReport>, AppError> {
    let report = state.report.read().await;
    report.clone().map(Json).ok_or(AppError::ReportNotReady)
}

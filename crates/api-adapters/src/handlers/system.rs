use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domains::DomainError;

use crate::error::ApiError;
use crate::state::AppState;

const OPENMETRICS: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|err| DomainError::internal(format!("metrics encoding failed: {err}")))?;
    Ok((StatusCode::OK, [(CONTENT_TYPE, OPENMETRICS)], body).into_response())
}

pub async fn not_found() -> ApiError {
    ApiError(DomainError::NotFound("page"))
}

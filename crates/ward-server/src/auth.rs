use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Absent configuration disables auth entirely (dev mode); present
/// configuration requires an exact match via header or query param
/// (spec §4.5 "accept an optional API key header/query param").
pub fn check_api_key(state: &AppState, headers: &HeaderMap, query_key: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = &state.api_key else {
        return Ok(());
    };
    let header_key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    let provided = header_key.or(query_key);
    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(AppError::Auth("missing or invalid API key".to_string()))
    }
}

pub async fn require_api_key(
    State(state): State<AppState>,
    Query(query): Query<ApiKeyQuery>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: Next,
) -> Response {
    match check_api_key(&state, &headers, query.api_key.as_deref()) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

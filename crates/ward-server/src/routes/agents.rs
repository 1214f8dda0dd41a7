use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterAgentRequest {
    name: String,
}

/// No auth (spec §4.5): idempotent by `(name, source=hook)`.
pub async fn register_agent(
    State(state): State<AppState>,
    Json(req): Json<RegisterAgentRequest>,
) -> Result<Json<Value>, AppError> {
    let entry = state.registry.register_hook(&req.name);
    let value = serde_json::to_value(&entry).map_err(|e| AppError::Internal(e.to_string()))?;
    state.store.put_registry_entry(&value)?;
    Ok(Json(value))
}

pub async fn list_agents(State(state): State<AppState>) -> Json<Value> {
    let entries = state.registry.list();
    Json(json!(entries))
}

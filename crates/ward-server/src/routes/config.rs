use axum::extract::State;
use axum::Json;
use serde_json::{json, Map, Value};

use crate::error::AppError;
use crate::state::AppState;

pub async fn get_config(State(state): State<AppState>) -> Json<Value> {
    let config = state.config.lock().unwrap();
    let mut value = serde_json::to_value(&*config).expect("EngineConfig always serializes");
    if let Value::Object(ref mut map) = value {
        map.insert(
            "_runtime".to_string(),
            json!({
                "mutable_keys": ward_types::EngineConfig::MUTABLE_KEYS,
            }),
        );
    }
    Json(value)
}

pub async fn put_config(State(state): State<AppState>, Json(patch): Json<Map<String, Value>>) -> Result<Json<Value>, AppError> {
    let mut config = state.config.lock().unwrap();
    let mut next = config.clone();
    let updated = next.apply_patch(&patch);
    next.validate().map_err(AppError::Validation)?;
    state.store.save_config(&next)?;
    *config = next;

    let mut value = serde_json::to_value(&*config).expect("EngineConfig always serializes");
    if let Value::Object(ref mut map) = value {
        map.insert("_runtime".to_string(), json!({"updated_keys": updated}));
    }
    Ok(Json(value))
}

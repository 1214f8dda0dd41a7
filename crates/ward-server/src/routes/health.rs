use axum::Json;
use serde_json::{json, Value};

/// Ambient liveness endpoint; unauthenticated, no dashboard equivalent.
pub async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

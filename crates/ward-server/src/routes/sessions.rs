use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::normalize::normalize_session;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    50
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Value>>, AppError> {
    let sessions = state.store.list_sessions(query.limit)?;
    Ok(Json(sessions.iter().map(normalize_session).collect()))
}

pub async fn get_session(State(state): State<AppState>, Path(session_id): Path<String>) -> Result<Json<Value>, AppError> {
    let session = state.store.get_session(&session_id)?;
    Ok(Json(normalize_session(&session)))
}

pub async fn delete_session(State(state): State<AppState>, Path(session_id): Path<String>) -> Result<Json<Value>, AppError> {
    state.store.get_session(&session_id)?;
    state.store.delete_session(&session_id)?;
    Ok(Json(json!({"ok": true})))
}

pub async fn delete_step(
    State(state): State<AppState>,
    Path((session_id, step_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.store.get_session(&session_id)?;
    let steps = session.get("steps").and_then(Value::as_array).cloned().unwrap_or_default();
    let remaining: Vec<Value> = steps
        .iter()
        .filter(|s| s.get("step_id").and_then(Value::as_str) != Some(step_id.as_str()))
        .cloned()
        .collect();
    if remaining.len() == steps.len() {
        return Err(AppError::NotFound("step not found".to_string()));
    }
    let remaining_count = remaining.len();
    session["steps"] = Value::Array(remaining);
    session["total_steps"] = json!(remaining_count);
    state.store.replace_session(&session)?;
    Ok(Json(json!({"ok": true, "remaining": remaining_count})))
}

/// Create-or-resume by `session_id` (spec §4.5). Resuming needs to clear
/// `ended_at`, which the merge-on-write invariant in `put_session` can't
/// do — so the full next revision is built here and written verbatim via
/// `replace_session`.
pub async fn ingest_session(State(state): State<AppState>, Json(data): Json<Value>) -> Result<Json<Value>, AppError> {
    let session_id = data
        .get("session_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("session_id is required".to_string()))?
        .to_string();

    if let Ok(mut existing) = state.store.get_session(&session_id) {
        existing["status"] = json!("active");
        existing["ended_at"] = Value::Null;
        if data.get("task").is_some() && existing.get("task").map(is_empty_task).unwrap_or(true) {
            existing["task"] = data["task"].clone();
        }
        if let Some(swarm_id) = data.get("swarm_id").filter(|v| !v.is_null()) {
            if existing.get("swarm_id").map(Value::is_null).unwrap_or(true) {
                existing["swarm_id"] = swarm_id.clone();
            }
        }
        if let Some(swarm_order) = data.get("swarm_order").filter(|v| !v.is_null()) {
            if existing.get("swarm_order").map(Value::is_null).unwrap_or(true) {
                existing["swarm_order"] = swarm_order.clone();
            }
        }
        let merged = state.store.replace_session(&existing)?;
        return Ok(Json(merged));
    }

    let session = json!({
        "session_id": session_id,
        "agent_id": data.get("agent_id").cloned().unwrap_or(json!("")),
        "agent_name": data.get("agent_name").cloned().unwrap_or(json!("Unknown")),
        "model": data.get("model").cloned().unwrap_or(Value::Null),
        "task": data.get("task").cloned().unwrap_or(json!("")),
        "started_at": data.get("started_at").cloned().unwrap_or(json!(Utc::now().to_rfc3339())),
        "ended_at": Value::Null,
        "status": "active",
        "total_steps": 0,
        "steps": [],
        "issues": [],
        "overall_quality": "PENDING",
        "efficiency_score": Value::Null,
        "security_score": Value::Null,
        "task_completion": Value::Null,
        "completion_confidence": Value::Null,
        "loop_detected": false,
        "security_breach_detected": false,
        "total_execution_time_ms": 0,
        "ai_evaluation": "",
        "recommendations": [],
        "tool_analysis": [],
        "decision_observations": [],
        "efficiency_explanation": "",
        "swarm_id": data.get("swarm_id").cloned().unwrap_or(Value::Null),
        "swarm_order": data.get("swarm_order").cloned().unwrap_or(Value::Null),
        "handoff_input": data.get("handoff_input").cloned().unwrap_or(Value::Null),
    });
    let created = state.store.put_session(&session)?;
    Ok(Json(created))
}

fn is_empty_task(task: &Value) -> bool {
    match task {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

pub async fn add_step(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(step): Json<Value>,
) -> Result<Json<Value>, AppError> {
    state.store.get_session(&session_id)?;
    let patch = json!({
        "session_id": session_id,
        "status": "active",
        "steps": [step],
    });
    let merged = state.store.put_session(&patch)?;
    let total_steps = merged.get("steps").and_then(Value::as_array).map(Vec::len).unwrap_or(0);
    state.hub.publish(json!({"type": "session_update", "session": normalize_session(&merged)}));
    Ok(Json(json!({"status": "ok", "total_steps": total_steps})))
}

pub async fn complete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(mut data): Json<Value>,
) -> Result<Json<Value>, AppError> {
    state.store.get_session(&session_id)?;
    if let Value::Object(ref mut map) = data {
        map.insert("session_id".to_string(), json!(session_id));
        map.entry("status").or_insert(json!("completed"));
    }
    let merged = state.store.put_session(&data)?;
    state.hub.publish(json!({"type": "session_update", "session": normalize_session(&merged)}));
    Ok(Json(json!({"status": "ok", "session_id": session_id})))
}

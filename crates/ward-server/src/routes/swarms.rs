use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// `GET /swarms`/`GET /swarms/{id}` scan every session for a shared
/// `swarm_id`; there is no secondary swarm index, so this samples the
/// same bound the rest of the dashboard routes use for "all sessions".
const ALL_SESSIONS_SAMPLE: usize = 10_000;

const QUALITY_PRIORITY: &[&str] = &["FAILED", "STUCK", "POOR", "PENDING", "GOOD", "EXCELLENT"];

fn task_preview(task: &Value) -> Value {
    match task {
        Value::Object(map) => json!(map.get("description").and_then(Value::as_str).unwrap_or("")),
        Value::String(s) => json!(s),
        _ => json!(""),
    }
}

fn swarm_order(session: &Value) -> i64 {
    session.get("swarm_order").and_then(Value::as_i64).unwrap_or(0)
}

fn group_by_swarm(sessions: Vec<Value>) -> std::collections::BTreeMap<String, Vec<Value>> {
    let mut groups: std::collections::BTreeMap<String, Vec<Value>> = std::collections::BTreeMap::new();
    for session in sessions {
        if let Some(swarm_id) = session.get("swarm_id").and_then(Value::as_str).map(str::to_string) {
            groups.entry(swarm_id).or_default().push(session);
        }
    }
    groups
}

pub async fn list_swarms(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let sessions = state.store.list_sessions(ALL_SESSIONS_SAMPLE)?;
    let groups = group_by_swarm(sessions);

    let mut swarms: Vec<Value> = groups
        .into_iter()
        .map(|(swarm_id, members)| {
            let mut sorted_members = members.clone();
            sorted_members.sort_by_key(swarm_order);

            let overall = QUALITY_PRIORITY
                .iter()
                .find(|q| {
                    members
                        .iter()
                        .any(|m| m.get("overall_quality").and_then(Value::as_str) == Some(**q))
                })
                .copied()
                .unwrap_or("PENDING");

            let started_at = members
                .iter()
                .filter_map(|m| m.get("started_at").and_then(Value::as_str))
                .min()
                .unwrap_or("")
                .to_string();
            let ended_at = members
                .iter()
                .filter_map(|m| m.get("ended_at").and_then(Value::as_str))
                .max()
                .unwrap_or("")
                .to_string();

            let agents: Vec<Value> = sorted_members
                .iter()
                .map(|m| {
                    json!({
                        "session_id": m.get("session_id").cloned().unwrap_or(Value::Null),
                        "agent_name": m.get("agent_name").cloned().unwrap_or(Value::Null),
                        "swarm_order": m.get("swarm_order").cloned().unwrap_or(Value::Null),
                        "overall_quality": m.get("overall_quality").cloned().unwrap_or(json!("PENDING")),
                        "efficiency_score": m.get("efficiency_score").cloned().unwrap_or(Value::Null),
                        "security_score": m.get("security_score").cloned().unwrap_or(Value::Null),
                        "task": task_preview(m.get("task").unwrap_or(&Value::Null)),
                        "status": m.get("status").cloned().unwrap_or(Value::Null),
                        "total_steps": m.get("total_steps").cloned().unwrap_or(json!(0)),
                        "handoff_input": m.get("handoff_input").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect();

            json!({
                "swarm_id": swarm_id,
                "agent_count": members.len(),
                "overall_quality": overall,
                "started_at": started_at,
                "ended_at": ended_at,
                "agents": agents,
            })
        })
        .collect();

    swarms.sort_by(|a, b| {
        let a_ts = a.get("started_at").and_then(Value::as_str).unwrap_or("");
        let b_ts = b.get("started_at").and_then(Value::as_str).unwrap_or("");
        b_ts.cmp(a_ts)
    });

    Ok(Json(swarms))
}

pub async fn get_swarm(State(state): State<AppState>, Path(swarm_id): Path<String>) -> Result<Json<Value>, AppError> {
    let sessions = state.store.list_sessions(ALL_SESSIONS_SAMPLE)?;
    let mut members: Vec<Value> = sessions
        .into_iter()
        .filter(|s| s.get("swarm_id").and_then(Value::as_str) == Some(swarm_id.as_str()))
        .collect();
    if members.is_empty() {
        return Err(AppError::NotFound("swarm not found".to_string()));
    }
    members.sort_by_key(swarm_order);

    Ok(Json(json!({
        "swarm_id": swarm_id,
        "agent_count": members.len(),
        "sessions": members,
    })))
}

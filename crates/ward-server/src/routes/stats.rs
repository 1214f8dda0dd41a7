use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

const CRITICAL_SECURITY_THRESHOLD: u64 = 70;
const STATS_SAMPLE_LIMIT: usize = 500;

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let sessions = state.store.list_sessions(STATS_SAMPLE_LIMIT)?;

    let total_sessions = sessions.len();
    let active_sessions = sessions
        .iter()
        .filter(|s| s.get("ended_at").and_then(Value::as_str).is_none())
        .count();
    let critical_threats = sessions
        .iter()
        .filter(|s| {
            s.get("security_score")
                .and_then(Value::as_u64)
                .map(|score| score < CRITICAL_SECURITY_THRESHOLD)
                .unwrap_or(false)
        })
        .count();

    let avg = |key: &str| -> Option<f64> {
        let scores: Vec<f64> = sessions
            .iter()
            .filter_map(|s| s.get(key).and_then(Value::as_f64))
            .collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    };

    let total_agents = state.registry.list().len();

    Ok(Json(json!({
        "total_sessions": total_sessions,
        "active_sessions": active_sessions,
        "critical_threats": critical_threats,
        "avg_efficiency": avg("efficiency_score"),
        "avg_security": avg("security_score"),
        "total_agents": total_agents,
    })))
}

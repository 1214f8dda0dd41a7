use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

const SESSION_SAMPLE_LIMIT: usize = 50;
const DEFAULT_LIMIT: usize = 200;

#[derive(Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn task_description(task: &Value) -> String {
    match task {
        Value::Object(map) => map.get("description").and_then(Value::as_str).unwrap_or("").to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn truncated(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

fn step_severity(step: &Value) -> &'static str {
    let status = step.get("status").and_then(Value::as_str).unwrap_or("SUCCESS");
    let security = step.get("security_score").and_then(Value::as_i64);
    if let Some(sec) = security {
        if sec < 70 {
            return "critical";
        }
        if sec < 90 {
            return "warning";
        }
    }
    match status {
        "IRRELEVANT" | "REDUNDANT" => "warning",
        "FAILED" | "BLOCKED" => "critical",
        _ => "info",
    }
}

fn issue_severity(severity_num: u64) -> &'static str {
    if severity_num >= 8 {
        "critical"
    } else if severity_num >= 5 {
        "warning"
    } else {
        "info"
    }
}

fn session_end_severity(quality: &str) -> &'static str {
    match quality {
        "EXCELLENT" | "GOOD" => "info",
        "POOR" => "warning",
        _ => "critical",
    }
}

/// Synthesizes a chronological event feed from the most-recently-touched
/// sessions (spec §4.5 `GET /audit-logs`): one `session_start`/`session_end`
/// pair plus one `tool_call` event per step and one `issue` event per
/// recorded issue, sorted by timestamp descending.
pub async fn get_audit_logs(State(state): State<AppState>, Query(query): Query<AuditQuery>) -> Result<Json<Vec<Value>>, AppError> {
    let sessions = state.store.list_sessions(SESSION_SAMPLE_LIMIT)?;
    let mut events: Vec<Value> = Vec::new();

    for session in &sessions {
        let sid = session.get("session_id").and_then(Value::as_str).unwrap_or("").to_string();
        let agent = session.get("agent_name").and_then(Value::as_str).unwrap_or("Unknown").to_string();
        let start_time = session
            .get("started_at")
            .or_else(|| session.get("start_time"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        if !start_time.is_empty() {
            let preview = truncated(&task_description(session.get("task").unwrap_or(&Value::Null)), 80);
            events.push(json!({
                "id": format!("{sid}-start"),
                "timestamp": start_time,
                "event_type": "session_start",
                "session_id": sid,
                "agent_name": agent,
                "summary": format!("Session started \u{2013} {preview}"),
                "severity": "info",
            }));
        }

        for step in session.get("steps").and_then(Value::as_array).into_iter().flatten() {
            let ts = step.get("timestamp").and_then(Value::as_str).unwrap_or(&start_time);
            let tool = step.get("tool_name").and_then(Value::as_str).unwrap_or("unknown");
            let status = step.get("status").and_then(Value::as_str).unwrap_or("SUCCESS");
            let sec_display = step
                .get("security_score")
                .and_then(Value::as_i64)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let rel_display = step
                .get("relevance_score")
                .and_then(Value::as_i64)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            events.push(json!({
                "id": step.get("step_id").and_then(Value::as_str).unwrap_or(""),
                "timestamp": ts,
                "event_type": "tool_call",
                "session_id": sid,
                "agent_name": agent,
                "summary": format!("{tool}() \u{2192} {status}  |  Security: {sec_display}%  Relevance: {rel_display}%"),
                "severity": step_severity(step),
                "detail": step.get("reasoning").and_then(Value::as_str).unwrap_or(""),
            }));
        }

        for issue in session.get("issues").and_then(Value::as_array).into_iter().flatten() {
            let severity_num = issue.get("severity").and_then(Value::as_u64).unwrap_or(5);
            events.push(json!({
                "id": issue.get("issue_id").and_then(Value::as_str).unwrap_or(""),
                "timestamp": issue.get("timestamp").and_then(Value::as_str).unwrap_or(&start_time),
                "event_type": "issue",
                "session_id": sid,
                "agent_name": agent,
                "summary": format!(
                    "[{}] {}",
                    issue.get("issue_type").and_then(Value::as_str).unwrap_or("UNKNOWN"),
                    issue.get("description").and_then(Value::as_str).unwrap_or("")
                ),
                "severity": issue_severity(severity_num),
                "detail": issue.get("recommendation").and_then(Value::as_str).unwrap_or(""),
            }));
        }

        let end_time = session.get("ended_at").or_else(|| session.get("end_time")).and_then(Value::as_str);
        if let Some(end_time) = end_time {
            let quality = session.get("overall_quality").and_then(Value::as_str).unwrap_or("GOOD");
            let efficiency = session.get("efficiency_score").and_then(Value::as_i64).unwrap_or(0);
            let security_display = session
                .get("security_score")
                .and_then(Value::as_i64)
                .map(|v| format!("{v}%"))
                .unwrap_or_else(|| "N/A".to_string());
            events.push(json!({
                "id": format!("{sid}-end"),
                "timestamp": end_time,
                "event_type": "session_end",
                "session_id": sid,
                "agent_name": agent,
                "summary": format!("Session ended \u{2013} Quality: {quality}, Efficiency: {efficiency}%, Security: {security_display}"),
                "severity": session_end_severity(quality),
            }));
        }
    }

    events.sort_by(|a, b| {
        let a_ts = a.get("timestamp").and_then(Value::as_str).unwrap_or("");
        let b_ts = b.get("timestamp").and_then(Value::as_str).unwrap_or("");
        b_ts.cmp(a_ts)
    });
    events.truncate(query.limit);

    Ok(Json(events))
}

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

const TOOL_RESULT_DISPLAY_LIMIT: usize = 300;
const STALE_ACTIVE_MINUTES: i64 = 5;

fn as_str_or<'a>(value: &'a Value, key: &str, default: &'a str) -> String {
    value.get(key).and_then(Value::as_str).unwrap_or(default).to_string()
}

fn task_preview(task: &Value) -> String {
    match task {
        Value::Object(map) => map
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn format_tool_input(input: &Value) -> String {
    match input {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truncate_display(result: &str) -> String {
    if result.chars().count() > TOOL_RESULT_DISPLAY_LIMIT {
        let mut s: String = result.chars().take(TOOL_RESULT_DISPLAY_LIMIT).collect();
        s.push_str("...");
        s
    } else {
        result.to_string()
    }
}

fn normalize_issue(issue: &Value) -> Value {
    if let Value::Object(_) = issue {
        json!({
            "issue_id": as_str_or(issue, "issue_id", ""),
            "issue_type": as_str_or(issue, "issue_type", "NONE"),
            "severity": issue.get("severity").cloned().unwrap_or(json!(5)),
            "description": as_str_or(issue, "description", ""),
            "recommendation": as_str_or(issue, "recommendation", ""),
            "affected_steps": issue.get("affected_step_ids").or_else(|| issue.get("affected_steps")).cloned().unwrap_or(json!([])),
        })
    } else {
        let text = issue.as_str().map(str::to_string).unwrap_or_else(|| issue.to_string());
        json!({
            "issue_type": text,
            "severity": 5,
            "description": text,
            "recommendation": "",
        })
    }
}

fn normalize_step(step: &Value) -> Value {
    let tool_input = step.get("tool_input").cloned().unwrap_or(Value::Null);
    let tool_name = step
        .get("tool_name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| step.get("action").and_then(Value::as_str))
        .unwrap_or("")
        .to_string();
    let tool_result = step
        .get("tool_result")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default();

    json!({
        "step_id": as_str_or(step, "step_id", ""),
        "step_number": step.get("step_number").cloned().unwrap_or(json!(0)),
        "timestamp": as_str_or(step, "timestamp", ""),
        "tool_name": tool_name,
        "tool_input": format_tool_input(&tool_input),
        "tool_result": truncate_display(&tool_result),
        "status": as_str_or(step, "status", "SUCCESS"),
        "relevance_score": step.get("relevance_score").cloned().unwrap_or(Value::Null),
        "security_score": step.get("security_score").cloned().unwrap_or(Value::Null),
        "reasoning": as_str_or(step, "reasoning", ""),
    })
}

/// Derive `active` / `completed` / `terminated`, applying the explicit
/// override and stale-session rules (spec §4.5 "Normalization").
fn derive_status(session: &Value, overall_quality: &mut String) -> String {
    let loop_detected = session.get("loop_detected").and_then(Value::as_bool).unwrap_or(false);
    let mut status = if loop_detected || overall_quality == "STUCK" {
        "terminated".to_string()
    } else if session.get("ended_at").and_then(Value::as_str).is_some()
        || session.get("end_time").and_then(Value::as_str).is_some()
    {
        "completed".to_string()
    } else {
        "active".to_string()
    };

    if let Some(explicit) = session.get("status").and_then(Value::as_str) {
        if explicit == "active" || explicit == "terminated" {
            status = explicit.to_string();
        }
    }

    if status == "active" {
        let started_at = session
            .get("started_at")
            .or_else(|| session.get("start_time"))
            .and_then(Value::as_str);
        if let Some(started_at) = started_at {
            if let Ok(start) = DateTime::parse_from_rfc3339(started_at) {
                let elapsed = Utc::now().signed_duration_since(start.with_timezone(&Utc));
                let no_end = session.get("ended_at").and_then(Value::as_str).is_none();
                if elapsed.num_minutes() > STALE_ACTIVE_MINUTES && no_end {
                    status = "terminated".to_string();
                    *overall_quality = "FAILED".to_string();
                }
            }
        }
    }

    status
}

/// Coerce a raw, hook-streamed session document into the canonical shape
/// the dashboard renders (spec §4.5 "Normalization"). Pure and total:
/// every field is defaulted, never panics on a missing or malformed key.
pub fn normalize_session(session: &Value) -> Value {
    let task_str = task_preview(session.get("task").unwrap_or(&Value::Null));

    let issues: Vec<Value> = session
        .get("issues")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(normalize_issue).collect())
        .unwrap_or_default();

    let steps: Vec<Value> = session
        .get("steps")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(normalize_step).collect())
        .unwrap_or_default();

    let mut overall_quality = as_str_or(session, "overall_quality", "GOOD");
    let status = derive_status(session, &mut overall_quality);

    json!({
        "session_id": as_str_or(session, "session_id", ""),
        "agent_name": as_str_or(session, "agent_name", "Unknown"),
        "model": session.get("model").cloned().unwrap_or(Value::Null),
        "task": task_str,
        "start_time": session.get("started_at").or_else(|| session.get("start_time")).cloned().unwrap_or(json!("")),
        "end_time": session.get("ended_at").or_else(|| session.get("end_time")).cloned().unwrap_or(Value::Null),
        "status": status,
        "total_steps": session.get("total_steps").cloned().unwrap_or(json!(steps.len())),
        "overall_quality": overall_quality,
        "efficiency_score": session.get("efficiency_score").cloned().unwrap_or(Value::Null),
        "security_score": session.get("security_score").cloned().unwrap_or(Value::Null),
        "issues": issues,
        "steps": steps,
        "ai_evaluation": session.get("ai_evaluation").cloned().unwrap_or(Value::Null),
        "tool_analysis": session.get("tool_analysis").cloned().unwrap_or(json!([])),
        "decision_observations": session.get("decision_observations").cloned().unwrap_or(json!([])),
        "efficiency_explanation": session.get("efficiency_explanation").cloned().unwrap_or(json!("")),
        "recommendations": session.get("recommendations").cloned().unwrap_or(json!([])),
        "task_completion": session.get("task_completion").cloned().unwrap_or(json!(false)),
        "loop_detected": session.get("loop_detected").cloned().unwrap_or(json!(false)),
        "security_breach_detected": session.get("security_breach_detected").cloned().unwrap_or(json!(false)),
        "total_execution_time_ms": session.get("total_execution_time_ms").cloned().unwrap_or(json!(0)),
        "swarm_id": session.get("swarm_id").cloned().unwrap_or(Value::Null),
        "swarm_order": session.get("swarm_order").cloned().unwrap_or(Value::Null),
    })
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one `(tool_name, tool_input, tool_result)` triple.
///
/// Status may be upgraded by later evaluation (e.g. SUCCESS -> FAILED on
/// a missing-config match) but a BLOCKED step is never downgraded or
/// followed by a later step from the same attempt (invariant 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Success,
    Failed,
    Irrelevant,
    Redundant,
    Blocked,
}

/// One recorded step within a session, insertion-ordered.
///
/// `relevance_score` and `security_score` start absent and are filled in
/// by the evaluation orchestrator (C4); a back-fill must never erase a
/// value that already exists (see the session store's field-level merge).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_id: String,
    pub step_number: u32,
    pub timestamp: DateTime<Utc>,
    pub tool_name: String,
    /// Redacted before persistence or broadcast (invariant 5).
    pub tool_input: Value,
    /// Truncated to roughly 500 chars; the full result is kept only in
    /// memory for C4's per-step evaluation, never persisted.
    pub tool_result: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl StepRecord {
    pub const RESULT_TRUNCATE_LIMIT: usize = 500;

    pub fn truncate_result(result: &str) -> String {
        if result.chars().count() <= Self::RESULT_TRUNCATE_LIMIT {
            result.to_string()
        } else {
            let mut s: String = result.chars().take(Self::RESULT_TRUNCATE_LIMIT).collect();
            s.push_str("...[truncated]");
            s
        }
    }

    /// A pure-reasoning step synthesized when the assistant emits text
    /// with no tool calls at all (spec §4.3 "On MessageAdded").
    pub fn pure_reasoning(step_id: impl Into<String>, step_number: u32, reasoning: String) -> Self {
        Self {
            step_id: step_id.into(),
            step_number,
            timestamp: Utc::now(),
            tool_name: "ai_reasoning".to_string(),
            tool_input: Value::Null,
            tool_result: String::new(),
            status: StepStatus::Success,
            relevance_score: Some(100),
            security_score: Some(100),
            reasoning: Some(reasoning),
            metadata: Value::Null,
        }
    }

    pub fn is_tool_call(&self) -> bool {
        self.tool_name != "ai_reasoning"
    }
}

use serde::{Deserialize, Serialize};
use ward_types::{OverallQuality, StepRecord, TaskDefinition};

/// Per-step judge request (spec §4.4): the task, the call itself, and a
/// short summary of what happened before it.
#[derive(Debug, Clone, Serialize)]
pub struct StepEvalRequest {
    pub task_description: String,
    pub tool_name: String,
    pub tool_input: serde_json::Value,
    pub result_truncated_for_judge: String,
    pub prior_steps_summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepEvalResponse {
    pub relevance_score: u8,
    pub security_score: u8,
    #[serde(default)]
    pub reasoning: String,
}

/// Per-session judge request: the task, every step, and total wall time.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvalRequest {
    pub task: Option<TaskDefinition>,
    pub steps: Vec<StepRecord>,
    pub total_execution_time_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionEvalResponse {
    pub task_completed: Option<bool>,
    pub completion_confidence: Option<u8>,
    pub efficiency_score: Option<u8>,
    pub security_score: Option<u8>,
    pub overall_quality: Option<OverallQuality>,
    pub reasoning: Option<String>,
    pub per_tool_analysis: Option<serde_json::Value>,
    pub decision_observations: Option<Vec<String>>,
    pub efficiency_explanation: Option<String>,
    pub recommendations: Option<Vec<String>>,
}

impl SessionEvalResponse {
    /// The fixed verdict used when the session has zero tool-call steps
    /// (pure reasoning) — the judge is skipped entirely (spec §4.4).
    pub fn pure_reasoning_default() -> Self {
        Self {
            task_completed: Some(true),
            completion_confidence: Some(80),
            efficiency_score: Some(100),
            security_score: Some(100),
            overall_quality: Some(OverallQuality::Good),
            reasoning: Some("session contained no tool calls".to_string()),
            per_tool_analysis: None,
            decision_observations: None,
            efficiency_explanation: None,
            recommendations: None,
        }
    }

    /// The verdict used when `task` is `None` (spec §4.4).
    pub fn pending_default() -> Self {
        Self {
            overall_quality: Some(OverallQuality::Pending),
            ..Default::default()
        }
    }
}

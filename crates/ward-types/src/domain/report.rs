use super::{QualityIssue, StepRecord, StepStatus, TaskDefinition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallQuality {
    Excellent,
    Good,
    Poor,
    Failed,
    Stuck,
    Pending,
}

/// Step counts by status, recomputed whenever the step list changes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StepCounts {
    pub success: u32,
    pub failed: u32,
    pub irrelevant: u32,
    pub redundant: u32,
    pub blocked: u32,
}

impl StepCounts {
    pub fn recompute(steps: &[StepRecord]) -> Self {
        let mut counts = StepCounts::default();
        for step in steps {
            match step.status {
                StepStatus::Success => counts.success += 1,
                StepStatus::Failed => counts.failed += 1,
                StepStatus::Irrelevant => counts.irrelevant += 1,
                StepStatus::Redundant => counts.redundant += 1,
                StepStatus::Blocked => counts.blocked += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.success + self.failed + self.irrelevant + self.redundant + self.blocked
    }
}

/// The durable record of one top-level agent invocation (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskDefinition>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub counts: StepCounts,
    pub overall_quality: OverallQuality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_completion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_confidence: Option<u8>,
    #[serde(default)]
    pub issues: Vec<QualityIssue>,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub total_execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_analysis: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_observations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency_explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swarm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swarm_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff_input: Option<String>,
    /// Set when the step analyzer has flagged a loop at severity >= 8;
    /// drives the `STUCK` override independent of judge output.
    #[serde(default)]
    pub loop_detected: bool,
}

impl SessionReport {
    pub fn new(session_id: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            agent_name: agent_name.into(),
            model: None,
            task: None,
            started_at: Utc::now(),
            ended_at: None,
            counts: StepCounts::default(),
            overall_quality: OverallQuality::Pending,
            efficiency_score: None,
            security_score: None,
            task_completion: None,
            completion_confidence: None,
            issues: Vec::new(),
            steps: Vec::new(),
            total_execution_time_ms: 0,
            judge_summary: None,
            tool_analysis: None,
            decision_observations: None,
            efficiency_explanation: None,
            recommendations: None,
            swarm_id: None,
            swarm_order: None,
            handoff_input: None,
            loop_detected: false,
        }
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn tool_call_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|s| s.is_tool_call())
    }

    pub fn has_hard_security_failure(&self) -> bool {
        self.issues.iter().any(|i| i.is_hard_security_failure())
    }

    pub fn has_loop_signal(&self) -> bool {
        self.loop_detected || self.issues.iter().any(|i| i.is_loop_signal())
    }
}

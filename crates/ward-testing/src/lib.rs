//! Fixture builders shared across the workspace's test suites, following
//! the teacher's builder-function-per-type fixture shape.

use chrono::Utc;
use ward_types::{OverallQuality, QualityIssue, SessionReport, StepRecord, StepStatus, TaskDefinition};

/// A `TaskDefinition` with a fixed id, short description, and `max_steps`.
pub fn task(max_steps: u32) -> TaskDefinition {
    TaskDefinition::new("test-task", "do a representative thing", max_steps)
}

/// A successful tool-call step with both scores filled in.
pub fn success_step(step_number: u32, tool_name: &str) -> StepRecord {
    StepRecord {
        step_id: format!("step-{step_number}"),
        step_number,
        timestamp: Utc::now(),
        tool_name: tool_name.to_string(),
        tool_input: serde_json::json!({}),
        tool_result: "ok".to_string(),
        status: StepStatus::Success,
        relevance_score: Some(95),
        security_score: Some(95),
        reasoning: None,
        metadata: serde_json::Value::Null,
    }
}

/// A step with an explicit status and no scores, for exercising
/// evaluation back-fill.
pub fn unscored_step(step_number: u32, tool_name: &str, status: StepStatus) -> StepRecord {
    let mut step = success_step(step_number, tool_name);
    step.status = status;
    step.relevance_score = None;
    step.security_score = None;
    step
}

/// A minimal `SessionReport` in progress — no steps, no verdict yet.
pub fn pending_session(session_id: &str, agent_name: &str) -> SessionReport {
    let mut report = SessionReport::new(session_id, agent_name);
    report.task = Some(task(10));
    report
}

/// A `SessionReport` with `n` successful steps and an `EXCELLENT` verdict,
/// as if it had already been finalized cleanly.
pub fn finished_excellent_session(session_id: &str, agent_name: &str, n: u32) -> SessionReport {
    let mut report = pending_session(session_id, agent_name);
    for i in 1..=n {
        report.steps.push(success_step(i, "read"));
    }
    report.counts = ward_types::StepCounts::recompute(&report.steps);
    report.overall_quality = OverallQuality::Excellent;
    report.efficiency_score = Some(100);
    report.security_score = Some(100);
    report.task_completion = Some(true);
    report.ended_at = Some(Utc::now());
    report
}

/// A single moderate-severity quality issue, for tests that just need
/// something in `report.issues` without caring about its exact content.
pub fn sample_issue(issue_type: ward_types::IssueType, severity: u8) -> QualityIssue {
    QualityIssue::new("issue-1", issue_type, severity, "sample issue for tests")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_excellent_session_has_matching_counts() {
        let report = finished_excellent_session("s1", "bot", 3);
        assert_eq!(report.counts.success, 3);
        assert_eq!(report.overall_quality, OverallQuality::Excellent);
    }

    #[test]
    fn unscored_step_clears_both_scores() {
        let step = unscored_step(1, "write", StepStatus::Failed);
        assert!(step.relevance_score.is_none());
        assert!(step.security_score.is_none());
    }
}

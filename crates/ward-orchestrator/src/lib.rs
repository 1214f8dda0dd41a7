mod descriptor;
mod eval;
mod missing_config;
mod overrides;

pub use descriptor::{EvalMode, TaskDescriptor};
pub use eval::{evaluate_step, StepEvalOutcome};
pub use missing_config::find_missing_config_hint;
pub use overrides::apply_overrides;

use std::time::Duration;
use ward_judge::{JudgeClient, SessionEvalRequest, SessionEvalResponse};
use ward_types::{QualityIssue, SessionReport, StepCounts, StepStatus};

fn apply_step_outcome(report: &mut SessionReport, outcome: StepEvalOutcome) {
    if let Some(step) = report.steps.iter_mut().find(|s| s.step_id == outcome.step_id) {
        if let Some(v) = outcome.relevance_score {
            step.relevance_score = Some(v);
        }
        if let Some(v) = outcome.security_score {
            step.security_score = Some(v);
        }
        if outcome.reasoning.is_some() {
            step.reasoning = outcome.reasoning;
        }
        if let Some(status) = outcome.status_override {
            // a BLOCKED step is never downgraded (invariant 2).
            if step.status != StepStatus::Blocked {
                step.status = status;
            }
        }
    }
    report.issues.extend(outcome.issues);
}

fn merge_session_eval(report: &mut SessionReport, response: SessionEvalResponse) {
    if let Some(v) = response.task_completed {
        report.task_completion = Some(v);
    }
    if let Some(v) = response.completion_confidence {
        report.completion_confidence = Some(v);
    }
    if let Some(v) = response.efficiency_score {
        report.efficiency_score = Some(v);
    }
    if let Some(v) = response.security_score {
        report.security_score = Some(v);
    }
    if let Some(v) = response.overall_quality {
        report.overall_quality = v;
    }
    if response.reasoning.is_some() {
        report.judge_summary = response.reasoning;
    }
    if response.per_tool_analysis.is_some() {
        report.tool_analysis = response.per_tool_analysis;
    }
    if response.decision_observations.is_some() {
        report.decision_observations = response.decision_observations;
    }
    if response.efficiency_explanation.is_some() {
        report.efficiency_explanation = response.efficiency_explanation;
    }
    if response.recommendations.is_some() {
        report.recommendations = response.recommendations;
    }
}

async fn drain_and_judge(judge: &dyn JudgeClient, report: &mut SessionReport, queue: Vec<TaskDescriptor>) {
    for descriptor in queue {
        let outcome = evaluate_step(judge, &descriptor).await;
        apply_step_outcome(report, outcome);
    }
    report.counts = StepCounts::recompute(&report.steps);

    let response = if report.tool_call_steps().next().is_none() {
        SessionEvalResponse::pure_reasoning_default()
    } else if report.task.is_none() {
        SessionEvalResponse::pending_default()
    } else {
        let request = SessionEvalRequest {
            task: report.task.clone(),
            steps: report.steps.clone(),
            total_execution_time_ms: report.total_execution_time_ms,
        };
        match judge.evaluate_session(&request).await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(session_id = %report.session_id, error = %err, "session judge call failed; heuristic scores retained");
                SessionEvalResponse::default()
            }
        }
    };
    merge_session_eval(report, response);
}

/// Drain the session's evaluation queue and run the session-level judge,
/// under a hard timeout, then apply the deterministic overrides (spec
/// §4.3 step 3-4). On timeout, a warning issue is recorded and the
/// heuristic scores already on `report` are left untouched — this
/// function never discards data, it only potentially adds less.
pub async fn finalize_session(
    judge: &dyn JudgeClient,
    report: &mut SessionReport,
    queue: Vec<TaskDescriptor>,
    timeout: Duration,
) {
    if tokio::time::timeout(timeout, drain_and_judge(judge, report, queue))
        .await
        .is_err()
    {
        tracing::warn!(session_id = %report.session_id, "evaluation finalization timed out");
        report.issues.push(QualityIssue::new(
            format!("{}-eval-timeout", report.session_id),
            ward_types::IssueType::Incompleteness,
            4,
            "evaluation finalization timed out; heuristic scores retained",
        ));
    }
    apply_overrides(report);
}

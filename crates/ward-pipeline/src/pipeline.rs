use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ward_analyzer::{AnalyzerConfig, AnalyzerState};
use ward_core::redact;
use ward_judge::JudgeClient;
use ward_orchestrator::{EvalMode, TaskDescriptor};
use ward_types::{GuardMode, SessionReport, StepCounts, StepRecord, StepStatus, TaskDefinition};

use crate::host::ToolDecision;
use crate::ingest::{IngestClient, NoopIngest};
use crate::lifecycle::{AfterToolEvent, BeforeToolEvent, MessageAddedEvent, SessionEndEvent, SessionStartEvent};
use crate::persist::SessionPersistence;
use crate::prompt_scan::scan_system_prompt;
use crate::state::PipelineState;

/// Derive a session id the way the pipeline does when the host doesn't
/// supply one: a caller id always wins; otherwise a slug built from the
/// swarm id (if any, so swarm members share a common prefix), the agent
/// name, and a millisecond-precision run timestamp, so two runs of the
/// same hook agent never collide (spec §9 "session identity").
fn derive_session_id(caller_session_id: Option<&str>, agent_name: &str, swarm_id: Option<&str>) -> String {
    if let Some(id) = caller_session_id {
        return id.to_string();
    }
    let ts = Utc::now().format("%Y%m%dT%H%M%S%3f");
    match swarm_id {
        Some(swarm) => format!("{swarm}-{agent_name}-{ts}"),
        None => format!("{agent_name}-{ts}"),
    }
}

fn heuristic_efficiency_score(total_steps: u32, max_steps: u32) -> u8 {
    let over = total_steps as i64 - max_steps as i64;
    (100 - 10 * over.max(0)).clamp(0, 100) as u8
}

/// The per-session interception pipeline (C3). One instance owns exactly
/// one session's mutable state, end to end; every write to that session's
/// durable record flows through `on_session_end` so there is a single
/// writer (spec §5).
pub struct Pipeline {
    state: PipelineState,
    report: SessionReport,
    analyzer: AnalyzerState,
    guard_mode: GuardMode,
    max_steps: u32,
    step_counter: u32,
    made_tool_call: bool,
    loop_detected: bool,
    eval_queue: Vec<TaskDescriptor>,
    pending_tool: Option<(String, serde_json::Value, bool)>, // (tool_name, redacted_input, was_redundant)
    ingest: Arc<dyn IngestClient>,
}

impl Pipeline {
    pub fn new(analyzer_config: AnalyzerConfig) -> Self {
        Self::with_ingest(analyzer_config, Arc::new(NoopIngest))
    }

    pub fn with_ingest(analyzer_config: AnalyzerConfig, ingest: Arc<dyn IngestClient>) -> Self {
        Self {
            state: PipelineState::Idle,
            report: SessionReport::new("", ""),
            analyzer: AnalyzerState::new(analyzer_config),
            guard_mode: GuardMode::Monitor,
            max_steps: 50,
            step_counter: 0,
            made_tool_call: false,
            loop_detected: false,
            eval_queue: Vec::new(),
            pending_tool: None,
            ingest,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    /// `IDLE -> ACTIVE`. Resets all per-session state, scans the system
    /// prompt, and — if an ingest endpoint is configured and reports a
    /// prior record for this session id — resumes step numbering from
    /// the count it returns instead of starting at zero (spec §4.3).
    pub fn on_session_start(&mut self, event: SessionStartEvent, guard_mode: GuardMode) {
        let session_id = derive_session_id(
            event.caller_session_id.as_deref(),
            &event.agent_name,
            event.swarm_id.as_deref(),
        );

        self.guard_mode = guard_mode;
        self.max_steps = event.max_steps.unwrap_or(50);
        self.step_counter = 0;
        self.made_tool_call = false;
        self.loop_detected = false;
        self.eval_queue.clear();
        self.pending_tool = None;
        self.analyzer.reset();

        self.report = SessionReport::new(session_id.clone(), event.agent_name.clone());
        self.report.model = event.model;
        self.report.swarm_id = event.swarm_id;
        self.report.swarm_order = event.swarm_order;

        if let Some(prompt) = &event.system_prompt {
            if let Some(issue) = scan_system_prompt(&format!("{session_id}-prompt-scan"), prompt) {
                self.report.issues.push(issue);
            }
        }

        self.ingest.register_agent(&event.agent_name);
        if let Some(resume) = self.ingest.ingest_session(&self.report) {
            self.step_counter = resume.prior_step_count as u32;
        }

        self.state = PipelineState::Active;
    }

    /// Auto-detects the task from the first user message, and synthesizes
    /// a pure-reasoning step when the assistant emits text with no tool
    /// calls at all so far this session (spec §4.3 "On MessageAdded").
    pub fn on_message_added(&mut self, event: MessageAddedEvent) {
        if event.is_user && self.report.task.is_none() {
            self.report.task = Some(TaskDefinition::from_message(
                format!("{}-task", self.report.session_id),
                &event.text,
                self.max_steps,
            ));
        }

        if !event.is_user && !event.has_tool_calls && !event.text.trim().is_empty() && !self.made_tool_call {
            self.step_counter += 1;
            let step_id = format!("{}-step-{}", self.report.session_id, self.step_counter);
            self.report.steps.push(StepRecord::pure_reasoning(
                step_id,
                self.step_counter,
                event.text,
            ));
            self.report.counts = StepCounts::recompute(&self.report.steps);
        }
    }

    /// `ACTIVE -> TOOL_PENDING`. Runs the bounded-memory rule engine and
    /// returns whether the host should proceed or cancel. Cancellation
    /// fires only when intervention is enabled and a loop was detected,
    /// or the step budget is already exhausted — in either case no tool
    /// is actually invoked, so the pipeline returns straight to `ACTIVE`
    /// and records a BLOCKED step (spec §4.3, §4.2 invariant 1).
    pub fn on_before_tool(&mut self, event: BeforeToolEvent) -> ToolDecision {
        self.state = PipelineState::ToolPending;
        self.step_counter += 1;
        self.made_tool_call = true;

        let analysis = self
            .analyzer
            .analyze_step(&event.tool_name, &event.tool_input, self.step_counter);
        if analysis.loop_detected() {
            self.loop_detected = true;
            self.report.loop_detected = true;
        }
        self.report.issues.extend(analysis.issues);

        let redacted_input = redact(&event.tool_input);
        let over_budget = self.step_counter > self.max_steps;
        let should_cancel = (self.guard_mode == GuardMode::Intervene && self.loop_detected) || over_budget;

        if should_cancel {
            let reason = if over_budget {
                format!("step budget of {} exceeded", self.max_steps)
            } else {
                "loop detected; intervention enabled".to_string()
            };
            let step_id = format!("{}-step-{}", self.report.session_id, self.step_counter);
            self.report.steps.push(StepRecord {
                step_id,
                step_number: self.step_counter,
                timestamp: Utc::now(),
                tool_name: event.tool_name,
                tool_input: redacted_input,
                tool_result: String::new(),
                status: StepStatus::Blocked,
                relevance_score: None,
                security_score: None,
                reasoning: Some(reason.clone()),
                metadata: serde_json::Value::Null,
            });
            self.report.counts = StepCounts::recompute(&self.report.steps);
            self.pending_tool = None;
            self.state = PipelineState::Active;
            return ToolDecision::Cancel { reason };
        }

        self.pending_tool = Some((event.tool_name, redacted_input, analysis.redundant));
        ToolDecision::Allow
    }

    /// `TOOL_PENDING -> ACTIVE`. Determines status, truncates the result,
    /// appends the step, and enqueues it for relevance/security judging
    /// at finalization.
    pub fn on_after_tool(&mut self, event: AfterToolEvent) {
        let Some((tool_name, tool_input, was_redundant)) = self.pending_tool.take() else {
            self.state = PipelineState::Active;
            return;
        };

        let status = if event.is_error {
            StepStatus::Failed
        } else if was_redundant {
            StepStatus::Redundant
        } else {
            StepStatus::Success
        };

        let step_id = format!("{}-step-{}", self.report.session_id, self.step_counter);
        let truncated = StepRecord::truncate_result(&event.tool_result);

        let prior_steps_summary = self
            .report
            .steps
            .iter()
            .rev()
            .take(5)
            .map(|s| s.tool_name.clone())
            .collect::<Vec<_>>()
            .join(", ");

        let step = StepRecord {
            step_id: step_id.clone(),
            step_number: self.step_counter,
            timestamp: Utc::now(),
            tool_name: tool_name.clone(),
            tool_input: tool_input.clone(),
            tool_result: truncated.clone(),
            status,
            relevance_score: None,
            security_score: None,
            reasoning: None,
            metadata: serde_json::Value::Null,
        };
        self.report.steps.push(step.clone());
        self.report.counts = StepCounts::recompute(&self.report.steps);

        let task_description = self
            .report
            .task
            .as_ref()
            .map(|t| t.description.clone())
            .unwrap_or_default();

        self.eval_queue.push(TaskDescriptor {
            step_id,
            mode: EvalMode::Relevance,
            task_description,
            tool_name,
            tool_input,
            result_truncated_for_judge: truncated,
            full_untruncated_result: event.tool_result,
            prior_steps_summary,
        });

        self.ingest.stream_step(&self.report.session_id, &step);
        self.state = PipelineState::Active;
    }

    /// `* -> FINALIZING -> DONE`. Writes a heuristic report, drains the
    /// evaluation queue through the judge under `timeout`, applies the
    /// deterministic overrides, and writes the merged final report. The
    /// heuristic write happens before the (potentially slow) judge pass
    /// so a crash or timeout still leaves a durable, if less complete,
    /// record (spec §4.3 step 3-4, §9 "bounded finalization").
    pub async fn on_session_end(
        &mut self,
        event: SessionEndEvent,
        judge: &dyn JudgeClient,
        persistence: &dyn SessionPersistence,
        timeout: Duration,
    ) -> &SessionReport {
        self.state = PipelineState::Finalizing;

        self.report.handoff_input = event.handoff_input;
        self.report.ended_at = Some(Utc::now());
        self.report.total_execution_time_ms = (self.report.ended_at.unwrap() - self.report.started_at)
            .num_milliseconds()
            .max(0) as u64;
        self.report.counts = StepCounts::recompute(&self.report.steps);
        self.report.efficiency_score = Some(heuristic_efficiency_score(
            self.report.total_steps() as u32,
            self.max_steps,
        ));

        persistence.save(&self.report);

        let queue = std::mem::take(&mut self.eval_queue);
        ward_orchestrator::finalize_session(judge, &mut self.report, queue, timeout).await;

        if let Some(task) = self.report.task.clone() {
            if let Some(issue) = AnalyzerState::check_efficiency(self.report.total_steps(), &task) {
                self.report.issues.push(issue);
                ward_orchestrator::apply_overrides(&mut self.report);
            }
        }

        self.ingest.complete_session(&self.report);
        persistence.save(&self.report);

        self.state = PipelineState::Done;
        &self.report
    }
}

mod host;
mod ingest;
mod lifecycle;
mod persist;
mod pipeline;
mod prompt_scan;
mod state;

pub use host::{AgentHost, ToolDecision};
pub use ingest::{IngestClient, NoopIngest, ResumeInfo};
pub use lifecycle::{
    AfterToolEvent, BeforeToolEvent, LifecycleEvent, MessageAddedEvent, SessionEndEvent, SessionStartEvent,
};
pub use persist::{NoopPersistence, SessionPersistence};
pub use pipeline::Pipeline;
pub use prompt_scan::scan_system_prompt;
pub use state::PipelineState;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use ward_analyzer::AnalyzerConfig;
    use ward_judge::{JudgeClient, SessionEvalRequest, SessionEvalResponse, StepEvalRequest, StepEvalResponse};
    use ward_types::{GuardMode, IssueType, OverallQuality, StepStatus};

    /// A judge that always returns perfect scores, for scenarios that
    /// only exercise deterministic (analyzer/orchestrator override) logic.
    struct StubJudge;

    #[async_trait]
    impl JudgeClient for StubJudge {
        async fn evaluate_step(&self, _req: &StepEvalRequest) -> ward_types::Result<StepEvalResponse> {
            Ok(StepEvalResponse {
                relevance_score: 100,
                security_score: 100,
                reasoning: "fine".into(),
            })
        }

        async fn evaluate_session(&self, _req: &SessionEvalRequest) -> ward_types::Result<SessionEvalResponse> {
            Ok(SessionEvalResponse {
                task_completed: Some(true),
                completion_confidence: Some(90),
                efficiency_score: Some(100),
                security_score: Some(100),
                overall_quality: Some(OverallQuality::Excellent),
                ..Default::default()
            })
        }
    }

    #[derive(Default)]
    struct RecordingPersistence {
        saved: Mutex<Vec<ward_types::SessionReport>>,
    }

    impl SessionPersistence for RecordingPersistence {
        fn save(&self, report: &ward_types::SessionReport) {
            self.saved.lock().unwrap().push(report.clone());
        }
    }

    fn start_event(agent: &str) -> SessionStartEvent {
        SessionStartEvent {
            caller_session_id: None,
            agent_name: agent.to_string(),
            swarm_id: None,
            swarm_order: None,
            model: Some("test-model".into()),
            system_prompt: Some("You are a helpful assistant.".into()),
            max_steps: Some(10),
        }
    }

    fn run_tool(pipeline: &mut Pipeline, tool: &str, input: serde_json::Value, result: &str, is_error: bool) -> ToolDecision {
        let decision = pipeline.on_before_tool(BeforeToolEvent {
            tool_name: tool.to_string(),
            tool_input: input,
        });
        if decision == ToolDecision::Allow {
            pipeline.on_after_tool(AfterToolEvent {
                tool_result: result.to_string(),
                is_error,
            });
        }
        decision
    }

    #[tokio::test]
    async fn s1_clean_two_step_task_is_excellent() {
        let mut pipeline = Pipeline::new(AnalyzerConfig::default());
        pipeline.on_session_start(start_event("calc-bot"), GuardMode::Monitor);
        pipeline.on_message_added(MessageAddedEvent {
            is_user: true,
            text: "add two numbers and write the result".into(),
            has_tool_calls: false,
        });

        run_tool(&mut pipeline, "calc", json!({"expr": "2+2"}), "4", false);
        run_tool(&mut pipeline, "write_file", json!({"path": "out.txt", "content": "4"}), "ok", false);

        let persistence = RecordingPersistence::default();
        let report = pipeline
            .on_session_end(SessionEndEvent::default(), &StubJudge, &persistence, Duration::from_secs(2))
            .await;

        assert_eq!(report.total_steps(), 2);
        assert!(report.steps.iter().all(|s| s.status == StepStatus::Success));
        assert!(report.steps.iter().all(|s| s.relevance_score == Some(100)));
        assert_eq!(report.overall_quality, OverallQuality::Excellent);
        assert_eq!(report.task_completion, Some(true));
        assert!(report.issues.is_empty());
    }

    #[tokio::test]
    async fn s2_ssl_bypass_forces_failed_and_caps_security_score() {
        let mut pipeline = Pipeline::new(AnalyzerConfig::default());
        pipeline.on_session_start(start_event("fetch-bot"), GuardMode::Monitor);
        pipeline.on_message_added(MessageAddedEvent {
            is_user: true,
            text: "fetch the page".into(),
            has_tool_calls: false,
        });

        let decision = pipeline.on_before_tool(BeforeToolEvent {
            tool_name: "fetch".into(),
            tool_input: json!({"url": "https://x", "verify_ssl": false}),
        });
        assert_eq!(decision, ToolDecision::Allow);
        assert!(pipeline
            .report()
            .issues
            .iter()
            .any(|i| i.issue_type == IssueType::SecurityBypass && i.severity == 8));
        pipeline.on_after_tool(AfterToolEvent {
            tool_result: "<html>...</html>".into(),
            is_error: false,
        });

        let persistence = RecordingPersistence::default();
        let report = pipeline
            .on_session_end(SessionEndEvent::default(), &StubJudge, &persistence, Duration::from_secs(2))
            .await;

        assert_eq!(report.overall_quality, OverallQuality::Failed);
        assert!(report.security_score.unwrap() <= 40);
    }

    #[tokio::test]
    async fn s3_evasion_loop_ends_stuck() {
        let mut pipeline = Pipeline::new(AnalyzerConfig::default());
        pipeline.on_session_start(start_event("poller"), GuardMode::Monitor);
        pipeline.on_message_added(MessageAddedEvent {
            is_user: true,
            text: "poll until ready".into(),
            has_tool_calls: false,
        });

        // three distinct nonces first (to trip the evasion/disguised-loop
        // rule on the differing-input case), then a nonce repeated enough
        // times to fill the sliding window with one dominant signature.
        for nonce in [1.1, 2.2, 3.3, 3.3, 3.3, 3.3] {
            run_tool(&mut pipeline, "wait", json!({"nonce": nonce}), "not ready", false);
        }

        assert!(pipeline
            .report()
            .issues
            .iter()
            .any(|i| i.issue_type == IssueType::SuspiciousBehavior));
        assert!(pipeline
            .report()
            .issues
            .iter()
            .any(|i| i.issue_type == IssueType::InfiniteLoop && i.severity == 9));

        let persistence = RecordingPersistence::default();
        let report = pipeline
            .on_session_end(SessionEndEvent::default(), &StubJudge, &persistence, Duration::from_secs(2))
            .await;

        assert_eq!(report.overall_quality, OverallQuality::Stuck);
    }

    #[tokio::test]
    async fn s4_redundant_duplicate_marks_second_step() {
        let mut pipeline = Pipeline::new(AnalyzerConfig::default());
        pipeline.on_session_start(start_event("reader"), GuardMode::Monitor);
        pipeline.on_message_added(MessageAddedEvent {
            is_user: true,
            text: "read the file twice".into(),
            has_tool_calls: false,
        });

        run_tool(&mut pipeline, "read", json!({"path": "a"}), "contents", false);
        run_tool(&mut pipeline, "read", json!({"path": "a"}), "contents", false);

        assert_eq!(pipeline.report().steps[1].status, StepStatus::Redundant);
        assert!(pipeline
            .report()
            .issues
            .iter()
            .any(|i| i.issue_type == IssueType::Inefficiency && i.severity == 3));

        let persistence = RecordingPersistence::default();
        let report = pipeline
            .on_session_end(SessionEndEvent::default(), &StubJudge, &persistence, Duration::from_secs(2))
            .await;
        assert_eq!(report.task_completion, Some(true));
    }

    #[tokio::test]
    async fn s5_missing_config_fails_the_step() {
        let mut pipeline = Pipeline::new(AnalyzerConfig::default());
        pipeline.on_session_start(start_event("exchange-bot"), GuardMode::Monitor);
        pipeline.on_message_added(MessageAddedEvent {
            is_user: true,
            text: "check the account balance".into(),
            has_tool_calls: false,
        });

        run_tool(
            &mut pipeline,
            "exchange_balance",
            json!({}),
            "AuthenticationError: retCode: 33004 invalid api-key",
            false,
        );

        let persistence = RecordingPersistence::default();
        let report = pipeline
            .on_session_end(SessionEndEvent::default(), &StubJudge, &persistence, Duration::from_secs(2))
            .await;

        assert_eq!(report.steps[0].status, StepStatus::Failed);
        assert!(report
            .issues
            .iter()
            .any(|i| i.issue_type == IssueType::MissingConfig && i.severity == 7));
    }

    #[tokio::test]
    async fn s6_resume_continues_step_numbering() {
        struct ResumingIngest;
        impl IngestClient for ResumingIngest {
            fn register_agent(&self, _name: &str) {}
            fn ingest_session(&self, _session: &ward_types::SessionReport) -> Option<ResumeInfo> {
                Some(ResumeInfo { prior_step_count: 3 })
            }
            fn stream_step(&self, _session_id: &str, _step: &ward_types::StepRecord) {}
            fn complete_session(&self, _session: &ward_types::SessionReport) {}
        }

        let mut pipeline = Pipeline::with_ingest(AnalyzerConfig::default(), Arc::new(ResumingIngest));
        pipeline.on_session_start(
            SessionStartEvent {
                caller_session_id: Some("X".into()),
                ..start_event("resumed-bot")
            },
            GuardMode::Monitor,
        );

        let decision = pipeline.on_before_tool(BeforeToolEvent {
            tool_name: "read".into(),
            tool_input: json!({"path": "a"}),
        });
        assert_eq!(decision, ToolDecision::Allow);
        pipeline.on_after_tool(AfterToolEvent {
            tool_result: "ok".into(),
            is_error: false,
        });

        assert_eq!(pipeline.report().steps.last().unwrap().step_number, 4);
    }

    #[tokio::test]
    async fn intervention_cancels_when_loop_detected() {
        let mut pipeline = Pipeline::new(AnalyzerConfig::default());
        pipeline.on_session_start(start_event("poller"), GuardMode::Intervene);
        // window size 5, loop_threshold 3: the first 4 identical calls fill
        // the window short of a verdict; the 5th completes it and the
        // repeated signature trips the pattern-repetition rule in the same
        // call that discovers it, so that call is the one that gets blocked.
        for _ in 0..4 {
            let decision = run_tool(&mut pipeline, "poll", json!({"nonce": 1}), "not ready", false);
            assert_eq!(decision, ToolDecision::Allow);
        }
        let decision = pipeline.on_before_tool(BeforeToolEvent {
            tool_name: "poll".into(),
            tool_input: json!({"nonce": 1}),
        });
        assert!(matches!(decision, ToolDecision::Cancel { .. }));
        assert_eq!(pipeline.report().steps.last().unwrap().status, StepStatus::Blocked);
    }

    #[tokio::test]
    async fn pure_reasoning_step_is_synthesized_before_any_tool_call() {
        let mut pipeline = Pipeline::new(AnalyzerConfig::default());
        pipeline.on_session_start(start_event("thinker"), GuardMode::Monitor);
        pipeline.on_message_added(MessageAddedEvent {
            is_user: true,
            text: "think about it".into(),
            has_tool_calls: false,
        });
        pipeline.on_message_added(MessageAddedEvent {
            is_user: false,
            text: "Let me consider the options first.".into(),
            has_tool_calls: false,
        });

        assert_eq!(pipeline.report().steps.len(), 1);
        assert_eq!(pipeline.report().steps[0].tool_name, "ai_reasoning");
        assert!(pipeline.report().steps[0].is_tool_call() == false);
    }
}

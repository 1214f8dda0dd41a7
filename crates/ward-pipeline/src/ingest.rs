use ward_types::{SessionReport, StepRecord};

/// What the ingest endpoint reported back when a session was resumed
/// (spec §4.3 "On SessionStart"): only the count matters here, since
/// it's what lets the pipeline continue numbering without gaps.
#[derive(Debug, Clone, Copy)]
pub struct ResumeInfo {
    pub prior_step_count: usize,
}

/// The pipeline's view of the ingest/dashboard boundary (C5), used when
/// a hook deployment has an ingest endpoint configured. All methods are
/// best-effort and never propagate a failure back into the pipeline
/// (mirrors the original source's "never raises, short timeout" dashboard
/// posting behavior) — a concrete implementation should swallow its own
/// transport errors and log them.
pub trait IngestClient: Send + Sync {
    fn register_agent(&self, name: &str);
    fn ingest_session(&self, session: &SessionReport) -> Option<ResumeInfo>;
    fn stream_step(&self, session_id: &str, step: &StepRecord);
    fn complete_session(&self, session: &SessionReport);
}

/// The default when no ingest endpoint is configured: every call is a
/// silent no-op and no session is ever reported as resumable.
pub struct NoopIngest;

impl IngestClient for NoopIngest {
    fn register_agent(&self, _name: &str) {}
    fn ingest_session(&self, _session: &SessionReport) -> Option<ResumeInfo> {
        None
    }
    fn stream_step(&self, _session_id: &str, _step: &StepRecord) {}
    fn complete_session(&self, _session: &SessionReport) {}
}

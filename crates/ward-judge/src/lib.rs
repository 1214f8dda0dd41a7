mod contract;
mod parse;

pub use contract::{SessionEvalRequest, SessionEvalResponse, StepEvalRequest, StepEvalResponse};
pub use parse::{extract_json_object, parse_lenient};

use async_trait::async_trait;

/// Abstraction over the external LLM judge backend (spec §4.4, §6
/// "Judge contract"). Failures are returned as `ward_types::Error`,
/// never panics — the caller (the orchestrator) is responsible for
/// letting heuristic scores survive on any `Err`.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn evaluate_step(&self, request: &StepEvalRequest) -> ward_types::Result<StepEvalResponse>;

    async fn evaluate_session(&self, request: &SessionEvalRequest) -> ward_types::Result<SessionEvalResponse>;
}

/// Always-succeeds stub judge. Used for pure-reasoning sessions, tests,
/// and any deployment with `enable_ai_eval = false`.
pub struct NullJudge;

#[async_trait]
impl JudgeClient for NullJudge {
    async fn evaluate_step(&self, _request: &StepEvalRequest) -> ward_types::Result<StepEvalResponse> {
        Ok(StepEvalResponse {
            relevance_score: 100,
            security_score: 100,
            reasoning: "stub judge: no backend configured".to_string(),
        })
    }

    async fn evaluate_session(&self, _request: &SessionEvalRequest) -> ward_types::Result<SessionEvalResponse> {
        Ok(SessionEvalResponse::pure_reasoning_default())
    }
}

/// Generic JSON-over-HTTP judge backend. The wire shape is left to the
/// deployment (only the response schema from spec §4.4 is assumed);
/// responses are parsed leniently (see `parse_lenient`).
pub struct HttpJudge {
    client: reqwest::Client,
    step_endpoint: String,
    session_endpoint: String,
    bearer_token: Option<String>,
}

impl HttpJudge {
    pub fn new(base_url: impl Into<String>, bearer_token: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            step_endpoint: format!("{base_url}/evaluate/step"),
            session_endpoint: format!("{base_url}/evaluate/session"),
            bearer_token,
        }
    }

    fn request_builder(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(url);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

#[async_trait]
impl JudgeClient for HttpJudge {
    async fn evaluate_step(&self, request: &StepEvalRequest) -> ward_types::Result<StepEvalResponse> {
        let response = self
            .request_builder(&self.step_endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ward_types::Error::JudgeUnavailable(e.to_string()))?;
        let text = response
            .text()
            .await
            .map_err(|e| ward_types::Error::JudgeUnavailable(e.to_string()))?;
        parse_lenient(&text).map_err(|e| ward_types::Error::JudgeUnavailable(e.to_string()))
    }

    async fn evaluate_session(&self, request: &SessionEvalRequest) -> ward_types::Result<SessionEvalResponse> {
        let response = self
            .request_builder(&self.session_endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ward_types::Error::JudgeUnavailable(e.to_string()))?;
        let text = response
            .text()
            .await
            .map_err(|e| ward_types::Error::JudgeUnavailable(e.to_string()))?;
        parse_lenient(&text).map_err(|e| ward_types::Error::JudgeUnavailable(e.to_string()))
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentSource {
    Git,
    Zip,
    Hook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Analyzing,
    Analyzed,
    Ready,
    Running,
}

/// An agent known to the engine. Hook-sourced entries are idempotent by
/// `name` (spec §4.5 `POST /agents/register`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRegistryEntry {
    pub id: String,
    pub name: String,
    pub source: AgentSource,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub capability_descriptor: Value,
}

impl AgentRegistryEntry {
    pub fn new_hook(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source: AgentSource::Hook,
            status: AgentStatus::Ready,
            created_at: Utc::now(),
            last_run: None,
            capability_descriptor: Value::Null,
        }
    }
}

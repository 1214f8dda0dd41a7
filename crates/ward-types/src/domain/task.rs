use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the agent was asked to do, captured once at session start and
/// immutable thereafter (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub expected_tools: BTreeSet<String>,
    pub max_steps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_criteria: Option<String>,
}

impl TaskDefinition {
    pub fn new(id: impl Into<String>, description: impl Into<String>, max_steps: u32) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected_tools: BTreeSet::new(),
            max_steps,
            success_criteria: None,
        }
    }

    /// Build a task from the first user message, trimmed and capped the
    /// way the pipeline does when no explicit task was supplied.
    pub fn from_message(id: impl Into<String>, text: &str, max_steps: u32) -> Self {
        const CAP: usize = 500;
        let trimmed = text.trim();
        let description = if trimmed.chars().count() > CAP {
            trimmed.chars().take(CAP).collect()
        } else {
            trimmed.to_string()
        };
        Self::new(id, description, max_steps)
    }
}

use serde_json::Value;

/// Emitted once per session, before anything else (spec §4.3).
#[derive(Debug, Clone)]
pub struct SessionStartEvent {
    /// A caller-supplied session id, when the host already has one (e.g.
    /// resuming a session the framework itself tracks). Wins over
    /// derivation when present.
    pub caller_session_id: Option<String>,
    pub agent_name: String,
    pub swarm_id: Option<String>,
    pub swarm_order: Option<u32>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_steps: Option<u32>,
}

/// Emitted for every message appended to the conversation, assistant or
/// user. Used to auto-detect the task (first user message) and to
/// synthesize pure-reasoning steps (assistant text with no tool calls).
#[derive(Debug, Clone)]
pub struct MessageAddedEvent {
    pub is_user: bool,
    pub text: String,
    pub has_tool_calls: bool,
}

/// Emitted immediately before a tool call is dispatched to the host.
#[derive(Debug, Clone)]
pub struct BeforeToolEvent {
    pub tool_name: String,
    pub tool_input: Value,
}

/// Emitted once the host has executed (or failed to execute) the tool
/// most recently announced via `BeforeToolEvent`.
#[derive(Debug, Clone)]
pub struct AfterToolEvent {
    pub tool_result: String,
    pub is_error: bool,
}

/// Emitted once, when the agent invocation is complete.
#[derive(Debug, Clone, Default)]
pub struct SessionEndEvent {
    pub handoff_input: Option<String>,
}

/// The five lifecycle events a host drives the pipeline with (spec §4.3).
/// `Pipeline` exposes one typed method per variant; this enum exists as
/// the closed taxonomy a host-side dispatcher matches against.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    SessionStart(SessionStartEvent),
    MessageAdded(MessageAddedEvent),
    BeforeTool(BeforeToolEvent),
    AfterTool(AfterToolEvent),
    SessionEnd(SessionEndEvent),
}

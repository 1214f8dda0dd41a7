use serde_json::Value;

/// What kind of out-of-band check a queued descriptor asks for (spec §4.4
/// "Queue"). `ShadowVerify` is accepted for contract fidelity but this
/// implementation treats it as a no-op: shadow-browser verification
/// requires driving an external browser, which is outside this engine's
/// scope (no sandboxed execution, spec §1 Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    Relevance,
    ShadowVerify,
}

/// A plain-data task descriptor enqueued by C3 for one step. Queues live
/// on the owning session and are drained exactly once, during
/// finalization, on a worker whose lifetime is bounded by the
/// finalization timeout (spec §4.4, §9 "cross-event-loop task handoffs").
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    pub step_id: String,
    pub mode: EvalMode,
    pub task_description: String,
    pub tool_name: String,
    pub tool_input: Value,
    pub result_truncated_for_judge: String,
    pub full_untruncated_result: String,
    pub prior_steps_summary: String,
}

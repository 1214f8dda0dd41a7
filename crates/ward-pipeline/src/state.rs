/// States of the per-session interception pipeline (spec §4.3).
///
/// `IDLE -> ACTIVE -> (BeforeTool -> ToolPending -> AfterTool -> ACTIVE)*
/// -> FINALIZING -> DONE`. `SessionEnd` from any non-DONE state forces
/// `FINALIZING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Active,
    ToolPending,
    Finalizing,
    Done,
}

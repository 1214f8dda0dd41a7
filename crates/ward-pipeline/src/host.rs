/// Capability interface the hosting agent framework presents to the
/// pipeline, per spec §9 "Dynamic discovery -> interface": rather than
/// scanning for agent instances or factory functions by attribute/name,
/// the hosting layer is wired in explicitly at staging time.
///
/// This engine's pipeline never calls back through `AgentHost` itself —
/// lifecycle events flow one way, from the host into the pipeline — but
/// the trait is the documented seam a concrete integration implements to
/// receive `cancel_tool` instructions and to register the five hooks.
pub trait AgentHost: Send + Sync {
    /// Invoke the agent with a task, for hosts that run agents in-process.
    fn invoke(&self, task: &str) -> Result<String, String>;

    /// Called once at staging time so the host can route its five
    /// lifecycle callbacks into a `Pipeline`.
    fn register_hook(&mut self, hook_name: &'static str);
}

/// A decision returned by `Pipeline::on_before_tool`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolDecision {
    Allow,
    Cancel { reason: String },
}

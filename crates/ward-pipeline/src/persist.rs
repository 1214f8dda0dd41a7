use ward_types::SessionReport;

/// Where `Pipeline::on_session_end` writes the heuristic and final
/// reports. Kept as a trait so this crate never depends on the session
/// store directly — the glue that wires a `Pipeline` to a real `Store`
/// (and to C5's broadcast hub) lives one layer up.
pub trait SessionPersistence: Send + Sync {
    fn save(&self, report: &SessionReport);
}

/// Used by tests and by hosts that don't need durability (e.g. a dry-run
/// CLI invocation).
pub struct NoopPersistence;

impl SessionPersistence for NoopPersistence {
    fn save(&self, _report: &SessionReport) {}
}

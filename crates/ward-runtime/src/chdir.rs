use std::sync::Mutex;

/// Process-wide lock guarding `std::env::set_current_dir` calls, mirroring
/// the original source's `_chdir_lock` (spec §9). Unused by the HTTP
/// ingest path in this engine — no component here calls `set_current_dir`
/// — but kept as a documented seam: an in-process agent-execution
/// integration that does shell out with a working-directory change
/// should serialize through this so concurrent sessions' path resolution
/// never interleaves.
#[derive(Default)]
pub struct ChdirLock(Mutex<()>);

impl ChdirLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.0.lock().unwrap()
    }
}

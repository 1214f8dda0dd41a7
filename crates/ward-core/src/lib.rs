pub mod atomic;
pub mod canonical;
pub mod error;
pub mod redact;

pub use atomic::{atomic_write, atomic_write_json};
pub use canonical::{call_signature, canonicalize};
pub use error::{Error, Result};
pub use redact::{redact, REDACTION_MARKER, SENSITIVE_MARKERS};

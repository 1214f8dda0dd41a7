use std::fmt;

/// Result type for ward-types operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Surface-level error taxonomy shared across the engine (see spec §7).
///
/// This is the single error type that crosses crate boundaries; binaries
/// and call sites that don't need to distinguish kinds use `anyhow`
/// instead, converting into one of these variants at the edge.
#[derive(Debug)]
pub enum Error {
    /// Bad client input; reject with an explanation.
    Validation(String),
    /// Unknown session / agent / step.
    NotFound(String),
    /// The judge backend failed or timed out; heuristic scores survive.
    JudgeUnavailable(String),
    /// A subprocess or in-process agent raised or timed out.
    ExecutionFailure(String),
    /// The filesystem refused an atomic rename or similar write.
    StorageFailure(String),
    /// Missing or mismatched API key on a protected endpoint.
    Auth(String),
    /// Wraps an underlying IO error.
    Io(std::io::Error),
    /// Wraps a JSON (de)serialization error.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(msg) => write!(f, "validation error: {msg}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
            Error::JudgeUnavailable(msg) => write!(f, "judge unavailable: {msg}"),
            Error::ExecutionFailure(msg) => write!(f, "execution failure: {msg}"),
            Error::StorageFailure(msg) => write!(f, "storage failure: {msg}"),
            Error::Auth(msg) => write!(f, "auth error: {msg}"),
            Error::Io(err) => write!(f, "IO error: {err}"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Index(rusqlite::Error),
    NotFound(String),
    Validation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Index(err) => write!(f, "index error: {}", err),
            Error::NotFound(what) => write!(f, "not found: {}", what),
            Error::Validation(msg) => write!(f, "validation error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Index(err) => Some(err),
            Error::NotFound(_) | Error::Validation(_) => None,
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

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Index(err)
    }
}

impl From<ward_core::Error> for Error {
    fn from(err: ward_core::Error) -> Self {
        match err {
            ward_core::Error::Io(e) => Error::Io(e),
            ward_core::Error::Json(e) => Error::Json(e),
        }
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Global exception handler boundary (spec §4.5, §7): every handler error
/// converges here and comes out as `{detail, error_type?}`.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Auth(String),
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Auth(_) => "auth_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn detail(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Auth(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "detail": self.detail(),
            "error_type": self.error_type(),
        }));
        (self.status(), body).into_response()
    }
}

impl From<ward_store::Error> for AppError {
    fn from(err: ward_store::Error) -> Self {
        match err {
            ward_store::Error::NotFound(msg) => AppError::NotFound(msg),
            ward_store::Error::Validation(msg) => AppError::Validation(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

// ============================
// crates/auth-lib/src/error.rs
// ============================
//! Central error types + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Faults this subsystem does not recover from: the branch store or the
/// serialization layer misbehaving. Request-level authentication failures are
/// `AuthError` and never surface here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
            AppError::Decode(_) => "ENC_001",
            AppError::Internal(_) => "INT_001",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// The recoverable authentication taxonomy. These are never propagated to the
/// caller as errors; their `Display` strings are written verbatim into the
/// caller's `AuthStatus`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Malformed user JSON")]
    MalformedUser,

    #[error("Malformed authentication request")]
    MalformedRequest,

    #[error("Invalid e-mail")]
    InvalidEmail,

    #[error("User exists")]
    UserExists,

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Missing authentication type")]
    MissingType,

    #[error("Unknown authentication type")]
    UnknownType,
}

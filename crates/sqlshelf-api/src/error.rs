use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Every failure the service can report. Each variant maps to one stable
/// status code; internal causes are logged, never sent to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("unknown user")]
    UnknownUser,

    #[error("incorrect password")]
    BadCredentials,

    /// Absent, or owned by someone else. The two are never distinguished.
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    /// The store could not be reached or returned something unusable.
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error("AI assistant is not configured")]
    AssistantDisabled,

    #[error("AI upstream failed: {0}")]
    Upstream(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::UnknownUser => StatusCode::BAD_REQUEST,
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::InvalidToken | Self::BadCredentials => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AssistantDisabled => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Store(e) => {
                error!("Store error: {:#}", e);
                "internal server error".to_string()
            }
            Self::Upstream(detail) => {
                error!("AI upstream error: {}", detail);
                "AI service error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::UnknownPlatform;

pub const PROXY_FALLBACK_MESSAGE: &str = "Failed to fetch GitHub contributions";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    NotFound(#[from] UnknownPlatform),

    #[error("GitHub API responded with status: {}", .0.as_u16())]
    Upstream(StatusCode),

    #[error("{0}")]
    Proxy(String),
}

impl AppError {
    /// Wraps an exception raised while proxying, keeping its message when it has one.
    pub fn proxy(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        if message.trim().is_empty() {
            AppError::Proxy(PROXY_FALLBACK_MESSAGE.to_string())
        } else {
            AppError::Proxy(message)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(status) => *status,
            AppError::Proxy(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Proxy(msg) => {
                tracing::error!("Error fetching GitHub contributions: {}", msg);
            }
            AppError::Upstream(upstream) => {
                tracing::warn!("Contributions upstream returned {}", upstream);
            }
            _ => {}
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

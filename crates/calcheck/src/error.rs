//! Error types for the calcheck binary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use slot_engine::SlotError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The calendar API answered, but not with a usable event list.
    #[error("Calendar API error: {0}")]
    Calendar(String),

    #[error("Telegram API error ({status}): {body}")]
    Telegram { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Engine(#[from] SlotError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Invalid event data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Forbidden")]
    Forbidden,

    #[error("Unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Calendar(_) | AppError::Telegram { .. } | AppError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Json(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Engine(_) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request_failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request_rejected");
        }
        // Upstream bodies can be long and noisy; the log has the detail.
        let message = match status {
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::SERVICE_UNAVAILABLE => "Service unavailable",
            StatusCode::BAD_GATEWAY => "Calendar or messaging service unavailable",
            _ => "Internal error",
        };
        (status, message).into_response()
    }
}

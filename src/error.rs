use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::qr::QrRenderError;
use crate::storage::StorageError;

/// Request-level failures. Validation problems never reach this type; they
/// are rendered inline on the form that produced them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource not found")]
    NotFound,

    #[error("template error")]
    Template(#[from] minijinja::Error),

    #[error("session error")]
    Session(#[from] axum_login::tower_sessions::session::Error),

    #[error("auth error")]
    Auth(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Qr(#[from] QrRenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = ?self, "request failed");
        }

        // Internal details stay in the log.
        let message = match &self {
            AppError::NotFound => "Not Found",
            _ => "Something went wrong. Please try again.",
        };

        (status, message.to_string()).into_response()
    }
}

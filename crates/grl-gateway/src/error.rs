use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use grl_core::{ShortCode, ShortenerError};
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced to HTTP clients as plain text.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(ShortCode),
    #[error("Not Allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error("stored url is not a valid Location header: {0}")]
    InvalidRedirect(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Shortener(_) | AppError::InvalidRedirect(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (status, self.to_string()).into_response()
    }
}

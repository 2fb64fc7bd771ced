use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Failed to fetch data: {0}")]
    FetchError(String),

    #[error("Empty text")]
    EmptyContent,

    #[error("LLM processing error: {0}")]
    LlmError(String),

    /// Uniform client-facing failure of the summarize pipeline.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::InvalidReference(_) | AppError::EmptyContent => {
                StatusCode::BAD_REQUEST
            }
            AppError::ConfigError(_) | AppError::FetchError(_) | AppError::LlmError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error(self.status_code(), self.to_string()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

use reqwest::StatusCode;
use thiserror::Error;

use crate::task::ValidationError;

#[derive(Error, Debug)]
pub enum TaskError {
    /// Transport failure: connection refused, timeout, TLS, bad body.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Invalid task: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Base URL cannot carry a path: {0}")]
    InvalidBaseUrl(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TaskError {
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        TaskError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TaskError::Api { status, .. } => Some(*status),
            TaskError::Http(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Rejected before any request was made.
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;

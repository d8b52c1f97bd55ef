//! Boundary error taxonomy.

use super::handler::TaskResponse;
use crate::task::{domain::TaskDomainError, services::TaskRepositoryError};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to callers of [`super::TaskHandler`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed identifier, payload or field value.
    #[error("{0}")]
    InvalidInput(String),

    /// No live task has the requested identifier.
    #[error("task not found")]
    NotFound,

    /// Unexpected failure below the handler.
    #[error("{operation} failed: {detail}")]
    Fault {
        /// Operation that failed, such as `create task`.
        operation: &'static str,
        /// Underlying error message.
        detail: String,
    },
}

impl ApiError {
    /// Classifies a repository error for the named operation.
    #[must_use]
    pub fn from_repository(operation: &'static str, err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(_) => Self::NotFound,
            TaskRepositoryError::Store(store_err) => Self::Fault {
                operation,
                detail: store_err.to_string(),
            },
        }
    }

    /// Returns the status code reported for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Fault { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error as a response with a `message` body.
    #[must_use]
    pub fn into_response(self) -> TaskResponse {
        if let Self::Fault { operation, detail } = &self {
            tracing::warn!(operation, detail = %detail, "task request failed");
        }
        TaskResponse {
            status: self.status(),
            location: None,
            body: json!({ "message": self.to_string() }),
        }
    }
}

impl From<TaskDomainError> for ApiError {
    fn from(err: TaskDomainError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

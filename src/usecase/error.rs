use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::repository::errors::RepositoryError;
use crate::usecase::password::PasswordError;

#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username or email already registered")]
    DuplicateIdentity,

    #[error("A place named '{0}' already exists")]
    DuplicateName(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),
}

impl From<RepositoryError> for UsecaseError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => UsecaseError::NotFound("Resource".to_string()),
            RepositoryError::Duplicate => {
                UsecaseError::Internal("unexpected duplicate row".to_string())
            }
            RepositoryError::DatabaseError(msg) => UsecaseError::Internal(msg),
        }
    }
}

impl From<PasswordError> for UsecaseError {
    fn from(e: PasswordError) -> Self {
        UsecaseError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for UsecaseError {
    fn from(e: anyhow::Error) -> Self {
        UsecaseError::Internal(e.to_string())
    }
}

impl IntoResponse for UsecaseError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            UsecaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UsecaseError::Forbidden(_) => StatusCode::FORBIDDEN,
            UsecaseError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            UsecaseError::DuplicateIdentity => StatusCode::CONFLICT,
            UsecaseError::DuplicateName(_) => StatusCode::BAD_REQUEST,
            UsecaseError::Validation(_) => StatusCode::BAD_REQUEST,
            UsecaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            UsecaseError::Internal(_) => {
                tracing::error!(error = %self, "internal error");
            }
            UsecaseError::NotFound(_) => {
                tracing::warn!(error = %self, "resource not found");
            }
            UsecaseError::Forbidden(_) => {
                tracing::warn!(error = %self, "forbidden");
            }
            _ => {
                tracing::debug!(error = %self);
            }
        }

        // Internal details stay in the logs, not the body.
        let body = match &self {
            UsecaseError::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

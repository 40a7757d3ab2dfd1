//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types
pub use types::{AuthError, SessionError, TokenError};

use ks_shared::errors::error_codes;
use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Underlying store fault, wrapped with context
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Uniqueness violation in the store
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Request deadline elapsed before the operation finished
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
            DomainError::Storage { .. } => error_codes::STORAGE_ERROR,
            DomainError::Conflict { .. } => error_codes::CONFLICT,
            DomainError::Timeout { .. } => error_codes::TIMEOUT,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
            DomainError::Auth(AuthError::InvalidCredentials) => error_codes::INVALID_CREDENTIALS,
            DomainError::Session(SessionError::InvalidRefreshToken) => {
                error_codes::INVALID_REFRESH_TOKEN
            }
            DomainError::Session(SessionError::SessionNotFound) => error_codes::SESSION_NOT_FOUND,
            DomainError::Session(SessionError::InvalidAccessToken) => {
                error_codes::INVALID_ACCESS_TOKEN
            }
            DomainError::Token(TokenError::GenerationFailed { .. }) => {
                error_codes::TOKEN_GENERATION_FAILED
            }
            DomainError::Token(TokenError::Malformed { .. }) => error_codes::INVALID_REFRESH_TOKEN,
        }
    }

    /// Whether the caller is at fault, as opposed to this service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::Validation { .. }
                | DomainError::Auth(_)
                | DomainError::Session(_)
                | DomainError::Token(TokenError::Malformed { .. })
        )
    }

    /// Wraps a store fault with the operation that hit it
    pub fn storage(context: &str, source: impl std::fmt::Display) -> Self {
        DomainError::Storage {
            message: format!("{}: {}", context, source),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

//! Unit tests for domain error types

use crate::errors::{AuthError, DomainError, SessionError, TokenError};

#[test]
fn test_messages_do_not_distinguish_token_failures() {
    let error: DomainError = SessionError::InvalidRefreshToken.into();
    assert_eq!(error.to_string(), "Invalid refresh token");

    let error: DomainError = AuthError::InvalidCredentials.into();
    assert_eq!(error.to_string(), "Invalid credentials");
}

#[test]
fn test_error_codes() {
    assert_eq!(
        DomainError::from(SessionError::SessionNotFound).error_code(),
        "SESSION_NOT_FOUND"
    );
    assert_eq!(
        DomainError::from(SessionError::InvalidAccessToken).error_code(),
        "INVALID_ACCESS_TOKEN"
    );
    assert_eq!(
        DomainError::from(TokenError::GenerationFailed { reason: "x".into() }).error_code(),
        "TOKEN_GENERATION_FAILED"
    );
    assert_eq!(
        DomainError::Timeout { operation: "renew".into() }.error_code(),
        "TIMEOUT"
    );
    assert_eq!(DomainError::storage("find session", "io").error_code(), "STORAGE_ERROR");
}

#[test]
fn test_storage_wraps_context() {
    let error = DomainError::storage("Failed to delete session", "connection reset");
    assert_eq!(
        error.to_string(),
        "Storage error: Failed to delete session: connection reset"
    );
}

#[test]
fn test_client_error_classification() {
    assert!(DomainError::from(AuthError::InvalidCredentials).is_client_error());
    assert!(DomainError::from(SessionError::SessionNotFound).is_client_error());
    assert!(!DomainError::storage("x", "y").is_client_error());
    assert!(!DomainError::Timeout { operation: "login".into() }.is_client_error());
    assert!(!DomainError::from(TokenError::GenerationFailed { reason: "x".into() }).is_client_error());
}

//! Error kinds for credential, session and token handling
//!
//! Expired and forged tokens map to the same variant and message.

use thiserror::Error;

/// Credential check failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown account or wrong secret, indistinguishable to the caller
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Session protocol outcomes that reject the request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Bad signature, parse failure, expiry, revocation or binding mismatch
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// No session for a validly signed refresh token; every session of the
    /// entity has been purged before this is returned
    #[error("Session not found")]
    SessionNotFound,

    /// Access token failed verification
    #[error("Invalid access token")]
    InvalidAccessToken,
}

/// Token signing and parsing faults
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token generation failed: {reason}")]
    GenerationFailed { reason: String },

    #[error("Malformed token: {reason}")]
    Malformed { reason: String },
}

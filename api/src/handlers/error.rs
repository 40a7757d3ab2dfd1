//! Domain error to HTTP response mapping
//!
//! Storage and internal faults are logged here with their detail and
//! answered with a generic body.

use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse};
use validator::ValidationErrors;

use ks_core::errors::{DomainError, TokenError};
use ks_shared::errors::{error_codes, ErrorResponse};

/// Status code for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Auth(_) | DomainError::Session(_) => StatusCode::UNAUTHORIZED,
        DomainError::Token(TokenError::Malformed { .. }) => StatusCode::UNAUTHORIZED,
        DomainError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Conflict { .. } => StatusCode::CONFLICT,
        DomainError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        DomainError::Token(TokenError::GenerationFailed { .. })
        | DomainError::Storage { .. }
        | DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing message for a domain error
fn public_message(error: &DomainError) -> String {
    match error {
        DomainError::Validation { message } => message.clone(),
        DomainError::Conflict { .. } => "Request conflicted with a concurrent request".to_string(),
        DomainError::Timeout { .. } => "Request timed out".to_string(),
        DomainError::Auth(_) | DomainError::Session(_) => error.to_string(),
        DomainError::Token(TokenError::Malformed { .. }) => "Invalid refresh token".to_string(),
        DomainError::Token(TokenError::GenerationFailed { .. })
        | DomainError::Storage { .. }
        | DomainError::Internal { .. } => "Something went wrong".to_string(),
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let status = status_for(&error);

    if status.is_server_error() {
        tracing::error!(error = %error, code = error.error_code(), "Request failed");
    } else {
        tracing::debug!(error = %error, code = error.error_code(), "Request rejected");
    }

    HttpResponse::build(status).json(ErrorResponse::new(error.error_code(), public_message(&error)))
}

/// Renew and logout need the refresh token cookie
pub fn missing_refresh_cookie() -> HttpResponse {
    HttpResponse::Forbidden().json(ErrorResponse::new(
        error_codes::FORBIDDEN,
        "Missing refresh token cookie",
    ))
}

pub fn validation_failed(errors: ValidationErrors) -> HttpResponse {
    tracing::debug!(%errors, "Request body failed validation");
    HttpResponse::UnprocessableEntity().json(ErrorResponse::new(
        error_codes::VALIDATION_ERROR,
        "Validation failed for one or more fields",
    ))
}

/// Replaces actix's plain-text body for unreadable JSON payloads
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::BAD_REQUEST,
        "Invalid request payload",
    ));
    actix_web::error::InternalError::from_response(err, response).into()
}

use actix_web::{web, HttpRequest, HttpResponse};

use ks_core::errors::SessionError;
use ks_core::repositories::AccountRepository;
use ks_core::services::SessionManager;

use crate::app::AppState;
use crate::dto::{ApiResponse, EntityResponse};
use crate::handlers::{bearer_token, handle_domain_error, ACCESS_TOKEN_COOKIE};

/// Handler for GET /api/v1/auth/me
///
/// Reads the access token from the `accessToken` cookie, falling back to an
/// `Authorization: Bearer` header.
pub async fn me<A, S>(state: web::Data<AppState<A, S>>, req: HttpRequest) -> HttpResponse
where
    A: AccountRepository + 'static,
    S: SessionManager + 'static,
{
    let token = req
        .cookie(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| bearer_token(&req));

    let Some(token) = token else {
        return handle_domain_error(SessionError::InvalidAccessToken.into());
    };

    match state.auth_service.current_entity(&token) {
        Ok(entity) => HttpResponse::Ok().json(ApiResponse::with_data(
            "authenticated",
            EntityResponse::from(entity),
        )),
        Err(error) => handle_domain_error(error),
    }
}

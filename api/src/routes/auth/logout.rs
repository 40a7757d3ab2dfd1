use actix_web::{web, HttpRequest, HttpResponse};

use ks_core::repositories::AccountRepository;
use ks_core::services::SessionManager;

use crate::app::AppState;
use crate::dto::ApiResponse;
use crate::handlers::{handle_domain_error, missing_refresh_cookie, REFRESH_TOKEN_COOKIE};

/// Handler for POST /api/v1/auth/logout
///
/// Both token cookies are cleared whatever the outcome.
pub async fn logout<A, S>(state: web::Data<AppState<A, S>>, req: HttpRequest) -> HttpResponse
where
    A: AccountRepository + 'static,
    S: SessionManager + 'static,
{
    let mut response = match req.cookie(REFRESH_TOKEN_COOKIE) {
        None => missing_refresh_cookie(),
        Some(refresh_token) => match state.auth_service.logout(refresh_token.value()).await {
            Ok(()) => HttpResponse::Ok().json(ApiResponse::message("logged out")),
            Err(error) => handle_domain_error(error),
        },
    };

    state.cookies.clear_on(&mut response);
    response
}

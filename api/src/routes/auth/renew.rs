use actix_web::{web, HttpRequest, HttpResponse};

use ks_core::repositories::AccountRepository;
use ks_core::services::SessionManager;

use crate::app::AppState;
use crate::dto::ApiResponse;
use crate::handlers::{device_context, handle_domain_error, missing_refresh_cookie, REFRESH_TOKEN_COOKIE};

/// Handler for POST /api/v1/tokens/renew
///
/// Exchanges the `refreshToken` cookie for a fresh pair. The presented
/// token is consumed; presenting it again revokes every session of the
/// entity.
///
/// ## Errors
/// - 401 Unauthorized: Invalid refresh token, or the session no longer exists
/// - 403 Forbidden: No refresh token cookie
/// - 504 Gateway Timeout: Request deadline elapsed
pub async fn renew<A, S>(state: web::Data<AppState<A, S>>, req: HttpRequest) -> HttpResponse
where
    A: AccountRepository + 'static,
    S: SessionManager + 'static,
{
    let Some(refresh_token) = req.cookie(REFRESH_TOKEN_COOKIE) else {
        return missing_refresh_cookie();
    };

    let device = device_context(&req);

    match state.auth_service.renew(refresh_token.value(), &device).await {
        Ok(pair) => {
            let mut response = HttpResponse::Ok();
            state.cookies.attach_pair(&mut response, &pair);
            response.json(ApiResponse::message("tokens renewed and attached to cookies"))
        }
        Err(error) => handle_domain_error(error),
    }
}

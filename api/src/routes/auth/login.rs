use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use ks_core::domain::entities::EntityType;
use ks_core::repositories::AccountRepository;
use ks_core::services::SessionManager;

use crate::app::AppState;
use crate::dto::{ApiResponse, LoginRequest};
use crate::handlers::{device_context, handle_domain_error, validation_failed};

/// Handler for POST /api/v1/users/login
pub async fn login_user<A, S>(
    state: web::Data<AppState<A, S>>,
    req: HttpRequest,
    body: web::Json<LoginRequest>,
) -> HttpResponse
where
    A: AccountRepository + 'static,
    S: SessionManager + 'static,
{
    login(&state, &req, body.into_inner(), EntityType::User).await
}

/// Handler for POST /api/v1/admins/login
pub async fn login_admin<A, S>(
    state: web::Data<AppState<A, S>>,
    req: HttpRequest,
    body: web::Json<LoginRequest>,
) -> HttpResponse
where
    A: AccountRepository + 'static,
    S: SessionManager + 'static,
{
    login(&state, &req, body.into_inner(), EntityType::Admin).await
}

/// Verifies the credentials and sets both token cookies
///
/// ## Success (201 Created)
/// ```json
/// { "status": "success", "message": "logged in, tokens attached to cookies" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Unreadable payload
/// - 401 Unauthorized: Unknown email or wrong password
/// - 422 Unprocessable Entity: Payload failed validation
/// - 504 Gateway Timeout: Request deadline elapsed
async fn login<A, S>(
    state: &AppState<A, S>,
    req: &HttpRequest,
    body: LoginRequest,
    entity_type: EntityType,
) -> HttpResponse
where
    A: AccountRepository + 'static,
    S: SessionManager + 'static,
{
    if let Err(errors) = body.validate() {
        return validation_failed(errors);
    }

    let device = device_context(req);

    match state
        .auth_service
        .login_with_password(entity_type, &body.email, &body.password, device)
        .await
    {
        Ok(pair) => {
            let mut response = HttpResponse::Created();
            state.cookies.attach_pair(&mut response, &pair);
            response.json(ApiResponse::message("logged in, tokens attached to cookies"))
        }
        Err(error) => handle_domain_error(error),
    }
}

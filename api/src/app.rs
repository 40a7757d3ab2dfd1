//! Application state and factory
//!
//! This module holds the shared application state and builds the
//! Actix-web application around it.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use ks_core::repositories::AccountRepository;
use ks_core::services::{AuthService, SessionManager};
use ks_shared::config::Environment;
use ks_shared::errors::{error_codes, ErrorResponse};

use crate::handlers::{json_error_handler, CookieSettings};
use crate::middleware::create_cors;
use crate::routes::{auth, health::health_check};

/// State shared by every handler
pub struct AppState<A, S>
where
    A: AccountRepository,
    S: SessionManager,
{
    /// Password login and session delegation
    pub auth_service: Arc<AuthService<A, S>>,
    /// Attributes of the token cookies
    pub cookies: CookieSettings,
}

impl<A, S> AppState<A, S>
where
    A: AccountRepository,
    S: SessionManager,
{
    pub fn new(auth_service: Arc<AuthService<A, S>>, cookies: CookieSettings) -> Self {
        Self {
            auth_service,
            cookies,
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<A, S>(
    app_state: web::Data<AppState<A, S>>,
    environment: Environment,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    A: AccountRepository + 'static,
    S: SessionManager + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(create_cors(environment))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .route("/users/login", web::post().to(auth::login_user::<A, S>))
                .route("/admins/login", web::post().to(auth::login_admin::<A, S>))
                .route("/tokens/renew", web::post().to(auth::renew::<A, S>))
                .service(
                    web::scope("/auth")
                        .route("/logout", web::post().to(auth::logout::<A, S>))
                        .route("/me", web::get().to(auth::me::<A, S>)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
